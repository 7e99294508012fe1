//! Input classification.
//!
//! Routing looks at the file extension first, then the guessed MIME type,
//! and finally sniffs the `%PDF-` header for files without a usable name.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Kind of input, deciding which engine handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// HTML rendered by the DOM engine
    Html,
    /// PDF, digital or scanned
    Pdf,
    /// Raster image handled by the vision engine
    Image,
    /// Anything else; recorded, never an error
    Unsupported,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InputKind::Html => "html",
            InputKind::Pdf => "pdf",
            InputKind::Image => "image",
            InputKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Classify a file by name, falling back to its header bytes.
pub fn detect_input_kind<P: AsRef<Path>>(path: P) -> InputKind {
    let path = path.as_ref();
    match kind_from_name(path) {
        InputKind::Unsupported if is_pdf(path) => InputKind::Pdf,
        kind => kind,
    }
}

/// Classify a file by extension and MIME type alone.
pub fn kind_from_name(path: &Path) -> InputKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html" | "htm") => return InputKind::Html,
        Some("pdf") => return InputKind::Pdf,
        Some("jpg" | "jpeg" | "png" | "bmp" | "tiff" | "tif" | "webp") => return InputKind::Image,
        _ => {}
    }

    let Some(mime) = mime_guess::from_path(path).first() else {
        return InputKind::Unsupported;
    };
    match (mime.type_().as_str(), mime.subtype().as_str()) {
        ("text", "html") => InputKind::Html,
        ("application", "pdf") => InputKind::Pdf,
        ("image", "jpeg" | "png" | "bmp" | "tiff" | "webp") => InputKind::Image,
        _ => InputKind::Unsupported,
    }
}

/// Check if a file starts with the PDF header.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    let mut header = Vec::with_capacity(PDF_MAGIC.len());
    File::open(path)
        .and_then(|f| f.take(PDF_MAGIC.len() as u64).read_to_end(&mut header))
        .map(|_| is_pdf_bytes(&header))
        .unwrap_or(false)
}

/// Check if bytes start with the PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(kind_from_name(Path::new("page.HTML")), InputKind::Html);
        assert_eq!(kind_from_name(Path::new("a/b/report.pdf")), InputKind::Pdf);
        assert_eq!(kind_from_name(Path::new("scan.TIF")), InputKind::Image);
        assert_eq!(kind_from_name(Path::new("photo.webp")), InputKind::Image);
        assert_eq!(kind_from_name(Path::new("archive.zip")), InputKind::Unsupported);
        assert_eq!(kind_from_name(Path::new("README")), InputKind::Unsupported);
    }

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(kind_from_name(Path::new("page.shtml")), InputKind::Html);
        // only text/html goes to the browser
        assert_eq!(kind_from_name(Path::new("page.xhtml")), InputKind::Unsupported);
    }

    #[test]
    fn test_pdf_magic_fallback() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(detect_input_kind(file.path()), InputKind::Pdf);

        let mut other = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        other.write_all(b"<!DOCTYPE html>").unwrap();
        assert_eq!(detect_input_kind(other.path()), InputKind::Unsupported);
    }

    #[test]
    fn test_pdf_magic_short_file() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(b"%PDF-1.").unwrap();
        assert!(is_pdf(file.path()));

        let mut tiny = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        tiny.write_all(b"%PD").unwrap();
        assert!(!is_pdf(tiny.path()));
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-2.0\n"));
        assert!(!is_pdf_bytes(b"%PDF"));
        assert!(!is_pdf_bytes(b"<html>"));
    }
}

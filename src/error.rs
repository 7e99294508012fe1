//! Error types for doclayout library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for doclayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during layout extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// An engine's external capability (browser, OCR backend) is unavailable.
    #[error("{engine} engine unavailable: {reason}")]
    MissingCapability {
        /// Engine that could not be constructed
        engine: &'static str,
        /// Human-readable cause
        reason: String,
    },

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error decoding or encoding a raster image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Error driving the headless browser.
    #[error("Browser error: {0}")]
    Browser(String),

    /// Error from the text-line detector.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// Error from a style-inference client.
    #[error("Style inference error: {0}")]
    StyleInference(String),

    /// JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A bounding box violating `x_min < x_max` and `y_min < y_max`.
    #[error("Invalid bounding box: {0}")]
    InvalidBBox(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error must abort processing of the whole document.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound(_) | Error::MissingCapability { .. }
        )
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

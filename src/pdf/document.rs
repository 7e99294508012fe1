//! lopdf document wrapper with page-tree inheritance.

use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::{Error, Result};

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Maximum depth when walking the `Parent` chain.
const MAX_TREE_DEPTH: usize = 32;

/// Page box in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Left edge (MediaBox x0)
    pub x0: f32,
    /// Bottom edge (MediaBox y0)
    pub y0: f32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
}

impl PageGeometry {
    /// Convert a user-space point to page-local coordinates with a top-left origin.
    pub fn to_top_left(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.x0, self.y0 + self.height - y)
    }
}

/// An opened PDF document.
pub struct PdfDocument {
    doc: LopdfDocument,
    pages: Vec<ObjectId>,
}

impl PdfDocument {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path.as_ref())?;
        Ok(Self::from_lopdf(doc))
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self::from_lopdf(doc))
    }

    fn from_lopdf(doc: LopdfDocument) -> Self {
        if doc.is_encrypted() {
            log::warn!("PDF is encrypted; text extraction may fail");
        }
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages }
    }

    /// The underlying lopdf document.
    pub(crate) fn inner(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Object id of a page (0-indexed).
    pub(crate) fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages
            .get(index)
            .copied()
            .ok_or(Error::PageOutOfRange(index as u32 + 1, self.page_count()))
    }

    /// Follow a reference to its target; other objects are returned as is.
    pub(crate) fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        let mut current = obj;
        for _ in 0..MAX_TREE_DEPTH {
            match current {
                Object::Reference(id) => match self.doc.get_object(*id) {
                    Ok(target) => current = target,
                    Err(_) => return current,
                },
                _ => return current,
            }
        }
        current
    }

    /// Resolve an object to a dictionary (a stream yields its dictionary).
    pub(crate) fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj) {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    /// Look up a page attribute, walking up the page tree for inheritable keys.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Some(self.resolve(value));
            }
            let parent = dict.get(b"Parent").ok()?;
            dict = self.resolve_dict(parent)?;
        }
        None
    }

    /// Resources dictionary of a page, inherited from ancestors if needed.
    pub(crate) fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        match self.inherited(page_id, b"Resources")? {
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// MediaBox of a page (0-indexed), inherited from ancestors if needed.
    pub fn page_geometry(&self, index: usize) -> Result<PageGeometry> {
        let page_id = self.page_id(index)?;
        let media_box = self
            .inherited(page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| {
                let values: Vec<f32> = arr
                    .iter()
                    .filter_map(|o| get_number(self.resolve(o)))
                    .collect();
                (values.len() >= 4).then(|| [values[0], values[1], values[2], values[3]])
            })
            .unwrap_or(DEFAULT_MEDIA_BOX);

        let x0 = media_box[0].min(media_box[2]);
        let x1 = media_box[0].max(media_box[2]);
        let y0 = media_box[1].min(media_box[3]);
        let y1 = media_box[1].max(media_box[3]);
        if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 {
            log::warn!("Page {} has an empty MediaBox, assuming Letter", index + 1);
            return Ok(PageGeometry {
                x0: 0.0,
                y0: 0.0,
                width: DEFAULT_MEDIA_BOX[2],
                height: DEFAULT_MEDIA_BOX[3],
            });
        }

        Ok(PageGeometry {
            x0,
            y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    /// Concatenated content streams of a page.
    pub(crate) fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => self.resolve(obj),
            // a page without contents is blank
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Stream(stream) => stream_bytes(stream),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Stream(stream) = self.resolve(obj) {
                        match stream_bytes(stream) {
                            Ok(data) => {
                                content.extend_from_slice(&data);
                                content.push(b'\n');
                            }
                            Err(e) => log::warn!("Skipping undecodable content stream: {}", e),
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Raw text of a page (0-indexed), as seen by the content interpreter.
    ///
    /// Pages whose content cannot be decoded yield an empty string.
    pub fn page_text(&self, index: usize) -> String {
        match super::content::interpret_page(self, index) {
            Ok(content) => content
                .spans
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            Err(e) => {
                log::warn!("Failed to read text from page {}: {}", index + 1, e);
                String::new()
            }
        }
    }
}

/// Decoded bytes of a stream; unfiltered streams are returned as stored.
pub(crate) fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    Ok(stream.decompressed_content()?)
}

/// Numeric value of an integer or real object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

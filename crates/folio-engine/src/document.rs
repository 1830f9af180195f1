//! Documents held by a session and the collaborator traits that operate on them

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Identifier stamped invisibly into every document the session loads
pub const BRAND_MARK: &str = "Processed with Folio";

/// A PDF held in memory. Replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Password that currently opens the document, if it is protected
    pub password: Option<String>,
}

impl Document {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// File name without its `.pdf` extension
    pub fn stem(&self) -> &str {
        let name = self.name.as_str();
        match name.len().checked_sub(4) {
            Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".pdf") => {
                &name[..cut]
            }
            _ => name,
        }
    }
}

/// The session's documents in load order. The first is the primary target.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    documents: Vec<Document>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn primary(&self) -> Option<&Document> {
        self.documents.first()
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    pub fn names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.name.clone()).collect()
    }

    /// Swap in new bytes for the primary document. Returns false if the set is empty.
    pub fn replace_primary(&mut self, bytes: Vec<u8>) -> bool {
        match self.documents.first_mut() {
            Some(primary) => {
                primary.bytes = bytes;
                true
            }
            None => false,
        }
    }

    /// Swap in new bytes and the password that now opens them
    pub fn replace_primary_protected(&mut self, bytes: Vec<u8>, password: Option<String>) -> bool {
        match self.documents.first_mut() {
            Some(primary) => {
                primary.bytes = bytes;
                primary.password = password;
                true
            }
            None => false,
        }
    }

    /// Replace every document with a single one
    pub fn replace_all(&mut self, document: Document) {
        self.documents = vec![document];
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
    pub const GRAY: Color = Color { r: 0.5, g: 0.5, b: 0.5 };
}

/// How text is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    pub opacity: f32,
    /// Counter-clockwise rotation in degrees around the text origin
    pub rotation: f32,
}

impl TextStyle {
    /// Opaque, unrotated black text
    pub fn plain(size: f32) -> Self {
        Self {
            size,
            color: Color::BLACK,
            opacity: 1.0,
            rotation: 0.0,
        }
    }
}

/// An image embedded in a document
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    pub data: Vec<u8>,
    /// File extension matching the encoded data, e.g. `jpg`
    pub extension: String,
    /// Zero-based page the image was found on
    pub page: usize,
}

/// Options applied when serializing a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveOptions {
    /// Encrypt with this password
    pub password: Option<String>,
    /// Recompress streams and drop unused objects
    pub compress: bool,
}

/// A rendered page
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub width: u32,
    pub height: u32,
    /// PNG-encoded pixels
    pub png: Vec<u8>,
}

/// An opened document. Page indices are zero-based.
pub trait PdfDocument: Send {
    fn page_count(&self) -> usize;

    fn page_size(&self, page: usize) -> Result<PageSize>;

    /// Current page rotation in degrees, a multiple of 90
    fn rotation(&self, page: usize) -> Result<u16>;

    fn set_rotation(&mut self, page: usize, degrees: u16) -> Result<()>;

    /// Append the given pages of `source` to this document, in order
    fn copy_pages_from(&mut self, source: &dyn PdfDocument, pages: &[usize]) -> Result<()>;

    /// Draw text with its baseline origin at (x, y)
    fn draw_text(&mut self, page: usize, text: &str, x: f32, y: f32, style: &TextStyle)
    -> Result<()>;

    fn draw_rectangle(
        &mut self,
        page: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    ) -> Result<()>;

    /// Place a PNG image with its lower-left corner at (x, y)
    fn draw_image(
        &mut self,
        page: usize,
        png: &[u8],
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()>;

    /// Width of `text` in points at `size` in the standard font
    fn text_width(&self, text: &str, size: f32) -> f32;

    fn page_text(&self, page: usize) -> Result<String>;

    fn images(&self) -> Result<Vec<ExtractedImage>>;

    /// Stamp an invisible identifier into the document
    fn add_brand_mark(&mut self, mark: &str) -> Result<()>;

    fn save(&self, options: &SaveOptions) -> Result<Vec<u8>>;
}

/// Opens and creates documents
pub trait DocumentLibrary: Send + Sync {
    fn load(&self, bytes: &[u8], password: Option<&str>) -> Result<Box<dyn PdfDocument>>;

    fn create(&self) -> Result<Box<dyn PdfDocument>>;
}

/// Renders document pages to images
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn render(&self, bytes: &[u8], page: usize, scale: f32) -> Result<RenderedPage>;
}

/// Open `document` with its current password
pub fn open(library: &dyn DocumentLibrary, document: &Document) -> Result<Box<dyn PdfDocument>> {
    library.load(&document.bytes, document.password.as_deref())
}

/// Stamp the brand mark into raw bytes, keeping any password protection
pub fn brand(library: &dyn DocumentLibrary, document: Document) -> Result<Document> {
    let mut pdf = open(library, &document)?;
    pdf.add_brand_mark(BRAND_MARK)?;
    let bytes = pdf.save(&SaveOptions {
        password: document.password.clone(),
        compress: false,
    })?;
    Ok(Document { bytes, ..document })
}

/// Concatenated page text, cut at `limit` characters
pub fn document_text(pdf: &dyn PdfDocument, limit: usize) -> Result<String> {
    let mut text = String::new();
    for page in 0..pdf.page_count() {
        let page_text = pdf.page_text(page)?;
        if page_text.trim().is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str(page_text.trim());
        if text.chars().count() >= limit {
            break;
        }
    }
    if text.chars().count() > limit {
        text = text.chars().take(limit).collect();
    }
    Ok(text)
}

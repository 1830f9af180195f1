//! In-memory collaborators for tests.
//!
//! `FakeLibrary` documents are JSON: page sizes, rotations, text and a log of
//! drawing operations. That keeps every edit visible and byte-for-byte
//! deterministic.

use std::collections::VecDeque;

use async_trait::async_trait;
use folio_ai::{CompletionService, Context, Message, TextStream};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::document::{
    Color, DocumentLibrary, ExtractedImage, PageSize, PdfDocument, Rasterizer, RenderedPage,
    SaveOptions, TextStyle,
};
use crate::error::{Error, Result};
use crate::events::SessionEvent;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FakePdf {
    pub pages: Vec<FakePage>,
    pub password: Option<String>,
    pub brand: Option<String>,
    pub compressed: bool,
    pub images: Vec<FakeImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakePage {
    pub width: f32,
    pub height: f32,
    pub rotation: u16,
    pub text: String,
    pub ops: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeImage {
    pub page: usize,
    pub data: Vec<u8>,
}

/// Letter-sized pages with text "Page N text"
pub fn fake_pdf(pages: usize) -> Vec<u8> {
    fake_pdf_with_images(pages, 0)
}

/// Like [`fake_pdf`], with `images` embedded images spread over the pages
pub fn fake_pdf_with_images(pages: usize, images: usize) -> Vec<u8> {
    let pdf = FakePdf {
        pages: (1..=pages)
            .map(|n| FakePage {
                width: 612.0,
                height: 792.0,
                rotation: 0,
                text: format!("Page {} text", n),
                ops: vec![],
            })
            .collect(),
        images: (0..images)
            .map(|i| FakeImage {
                page: i % pages.max(1),
                data: vec![i as u8; 4],
            })
            .collect(),
        ..FakePdf::default()
    };
    encode(&pdf)
}

pub fn decode(bytes: &[u8]) -> FakePdf {
    serde_json::from_slice(bytes).expect("fake pdf bytes")
}

fn encode(pdf: &FakePdf) -> Vec<u8> {
    serde_json::to_vec(pdf).expect("fake pdf encodes")
}

/// Collect every event currently buffered on `rx`
pub fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub struct FakeLibrary;

impl DocumentLibrary for FakeLibrary {
    fn load(&self, bytes: &[u8], password: Option<&str>) -> Result<Box<dyn PdfDocument>> {
        let pdf: FakePdf = serde_json::from_slice(bytes)
            .map_err(|e| Error::library(format!("not a PDF: {}", e)))?;
        if let Some(expected) = &pdf.password {
            if password != Some(expected.as_str()) {
                return Err(Error::library("incorrect password"));
            }
        }
        Ok(Box::new(FakeDoc { pdf }))
    }

    fn create(&self) -> Result<Box<dyn PdfDocument>> {
        Ok(Box::new(FakeDoc {
            pdf: FakePdf::default(),
        }))
    }
}

struct FakeDoc {
    pdf: FakePdf,
}

impl FakeDoc {
    fn page(&self, page: usize) -> Result<&FakePage> {
        self.pdf
            .pages
            .get(page)
            .ok_or_else(|| Error::library(format!("no page {}", page)))
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut FakePage> {
        self.pdf
            .pages
            .get_mut(page)
            .ok_or_else(|| Error::library(format!("no page {}", page)))
    }
}

impl PdfDocument for FakeDoc {
    fn page_count(&self) -> usize {
        self.pdf.pages.len()
    }

    fn page_size(&self, page: usize) -> Result<PageSize> {
        let p = self.page(page)?;
        Ok(PageSize {
            width: p.width,
            height: p.height,
        })
    }

    fn rotation(&self, page: usize) -> Result<u16> {
        Ok(self.page(page)?.rotation)
    }

    fn set_rotation(&mut self, page: usize, degrees: u16) -> Result<()> {
        self.page_mut(page)?.rotation = degrees;
        Ok(())
    }

    fn copy_pages_from(&mut self, source: &dyn PdfDocument, pages: &[usize]) -> Result<()> {
        let source = decode(&source.save(&SaveOptions::default())?);
        for &page in pages {
            let copied = source
                .pages
                .get(page)
                .cloned()
                .ok_or_else(|| Error::library(format!("no page {}", page)))?;
            self.pdf.pages.push(copied);
        }
        Ok(())
    }

    fn draw_text(&mut self, page: usize, text: &str, x: f32, y: f32, style: &TextStyle) -> Result<()> {
        let op = format!(
            "text '{}' at {:.1},{:.1} size {} opacity {} rotation {}",
            text, x, y, style.size, style.opacity, style.rotation
        );
        self.page_mut(page)?.ops.push(op);
        Ok(())
    }

    fn draw_rectangle(
        &mut self,
        page: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    ) -> Result<()> {
        let color = if color == Color::WHITE { "white".to_string() } else { format!("{:?}", color) };
        let op = format!("rect {:.1},{:.1} {:.1}x{:.1} {}", x, y, width, height, color);
        self.page_mut(page)?.ops.push(op);
        Ok(())
    }

    fn draw_image(
        &mut self,
        page: usize,
        png: &[u8],
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        let op = format!("image {}b at {:.1},{:.1} {:.1}x{:.1}", png.len(), x, y, width, height);
        self.page_mut(page)?.ops.push(op);
        Ok(())
    }

    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.5
    }

    fn page_text(&self, page: usize) -> Result<String> {
        Ok(self.page(page)?.text.clone())
    }

    fn images(&self) -> Result<Vec<ExtractedImage>> {
        Ok(self
            .pdf
            .images
            .iter()
            .map(|image| ExtractedImage {
                data: image.data.clone(),
                extension: "png".to_string(),
                page: image.page,
            })
            .collect())
    }

    fn add_brand_mark(&mut self, mark: &str) -> Result<()> {
        self.pdf.brand = Some(mark.to_string());
        Ok(())
    }

    fn save(&self, options: &SaveOptions) -> Result<Vec<u8>> {
        let mut pdf = self.pdf.clone();
        pdf.password = options.password.clone();
        pdf.compressed = options.compress;
        Ok(encode(&pdf))
    }
}

pub struct FakeRasterizer;

#[async_trait]
impl Rasterizer for FakeRasterizer {
    async fn render(&self, bytes: &[u8], page: usize, scale: f32) -> Result<RenderedPage> {
        let pdf: FakePdf =
            serde_json::from_slice(bytes).map_err(|e| Error::Render(e.to_string()))?;
        let p = pdf
            .pages
            .get(page)
            .ok_or_else(|| Error::Render(format!("no page {}", page)))?;
        Ok(RenderedPage {
            width: (p.width * scale) as u32,
            height: (p.height * scale) as u32,
            png: format!("png:{}:{}", page, scale).into_bytes(),
        })
    }
}

/// A completion service that replays scripted replies and records requests
#[derive(Default)]
pub struct MockService {
    replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    requests: Mutex<Vec<(Context, Message)>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.replies.lock().push_back(Ok(reply.into()));
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.replies.lock().push_back(Err(message.into()));
        self
    }

    /// Every (context, message) pair sent so far
    pub fn requests(&self) -> Vec<(Context, Message)> {
        self.requests.lock().clone()
    }

    fn next_reply(&self, context: &Context, message: Message) -> folio_ai::Result<String> {
        self.requests.lock().push((context.clone(), message));
        match self.replies.lock().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(folio_ai::Error::api("server_error", message)),
            None => Err(folio_ai::Error::EmptyResponse),
        }
    }
}

#[async_trait]
impl CompletionService for MockService {
    async fn send(&self, context: &Context, message: Message) -> folio_ai::Result<String> {
        self.next_reply(context, message)
    }

    /// Streams the reply one word at a time
    async fn send_streaming(
        &self,
        context: &Context,
        message: Message,
        _cancel: CancellationToken,
    ) -> folio_ai::Result<TextStream> {
        let reply = self.next_reply(context, message)?;
        let fragments: Vec<folio_ai::Result<String>> = reply
            .split_inclusive(' ')
            .map(|word| Ok(word.to_string()))
            .collect();
        Ok(Box::pin(futures::stream::iter(fragments)))
    }
}

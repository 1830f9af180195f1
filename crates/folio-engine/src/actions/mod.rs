//! Action handlers, one per [`ActionKind`]

mod annotate;
mod extract;
mod pages;
mod request;
mod security;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use folio_ai::CompletionService;

use crate::archive::Archive;
use crate::catalog::ActionKind;
use crate::config::EngineConfig;
use crate::document::{self, Document, DocumentLibrary, DocumentSet, PdfDocument, Rasterizer, SaveOptions};
use crate::error::{Error, Result};
use crate::params::InputKind;

pub use extract::{Table, parse_tables};

/// Collaborators and state a handler may read
pub struct ActionContext<'a> {
    pub library: &'a dyn DocumentLibrary,
    pub rasterizer: &'a dyn Rasterizer,
    pub service: &'a dyn CompletionService,
    pub config: &'a EngineConfig,
    pub documents: &'a DocumentSet,
}

impl ActionContext<'_> {
    /// The primary document, or a validation failure for `kind` if none is loaded
    fn primary(&self, kind: ActionKind) -> Result<&Document> {
        self.documents
            .primary()
            .ok_or_else(|| Error::validation(kind.as_str(), "no document is loaded"))
    }

    fn open_primary(&self, kind: ActionKind) -> Result<(&Document, Box<dyn PdfDocument>)> {
        let primary = self.primary(kind)?;
        let pdf = document::open(self.library, primary)?;
        Ok((primary, pdf))
    }
}

/// What the operator is asked to supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    RequestFiles,
    RequestInput(InputKind),
}

impl RequestKind {
    pub fn describe(&self) -> &'static str {
        match self {
            RequestKind::RequestFiles => "additional PDF files",
            RequestKind::RequestInput(InputKind::Password) => "a password",
            RequestKind::RequestInput(InputKind::Text) => "a text value",
        }
    }
}

/// A pause in plan execution waiting for the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspensionRequest {
    pub kind: RequestKind,
    pub reason: String,
}

/// Something to show the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayPayload {
    Summary { text: String },
    Tables { tables: Vec<Table> },
    Text { text: String },
    Notice { text: String },
}

/// How a successful handler changes session state
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// New primary bytes, password unchanged
    Replace(Vec<u8>),
    /// New primary bytes and the password that now opens them
    Reprotect {
        bytes: Vec<u8>,
        password: Option<String>,
    },
    /// Replace the whole document set with one document
    Consolidate(Document),
    /// A side artifact; the documents are untouched
    Archive(Archive),
}

/// Result of running one task
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Continue(Effect),
    Suspend(SuspensionRequest),
    Terminal(DisplayPayload),
    Failed(String),
}

/// Run the handler for `kind`. Errors become [`ActionOutcome::Failed`].
pub async fn run(kind: ActionKind, parameters: &Map<String, Value>, cx: &ActionContext<'_>) -> ActionOutcome {
    match dispatch(kind, parameters, cx).await {
        Ok(outcome) => outcome,
        Err(e) => ActionOutcome::Failed(e.to_string()),
    }
}

async fn dispatch(
    kind: ActionKind,
    parameters: &Map<String, Value>,
    cx: &ActionContext<'_>,
) -> Result<ActionOutcome> {
    match kind {
        ActionKind::RequestFiles => request::request_files(parameters),
        ActionKind::RequestInput => request::request_input(parameters),
        ActionKind::Merge => pages::merge(cx),
        ActionKind::Split => pages::split(cx),
        ActionKind::Compress => pages::compress(parameters, cx),
        ActionKind::Rotate => pages::rotate(parameters, cx),
        ActionKind::AddPageNumbers => annotate::add_page_numbers(parameters, cx),
        ActionKind::Watermark => annotate::watermark(parameters, cx),
        ActionKind::AddText => annotate::add_text(parameters, cx),
        ActionKind::Whiteout => annotate::whiteout(parameters, cx),
        ActionKind::Protect => security::protect(parameters, cx),
        ActionKind::Unlock => security::unlock(parameters, cx),
        ActionKind::Summarize => extract::summarize(cx).await,
        ActionKind::ExtractTables => extract::extract_tables(cx).await,
        ActionKind::ExtractText => extract::extract_text(cx),
        ActionKind::ExtractImages => extract::extract_images(cx),
        ActionKind::Unsupported => extract::unsupported(parameters),
    }
}

/// Save an edited primary document, keeping its protection
fn save_edited(pdf: &dyn PdfDocument, primary: &Document) -> Result<ActionOutcome> {
    let bytes = pdf.save(&SaveOptions {
        password: primary.password.clone(),
        compress: false,
    })?;
    Ok(ActionOutcome::Continue(Effect::Replace(bytes)))
}

/// Convert a 1-based page parameter to an index, checking it exists
fn page_index(kind: ActionKind, page: u32, pdf: &dyn PdfDocument) -> Result<usize> {
    let count = pdf.page_count();
    if page == 0 || page as usize > count {
        return Err(Error::validation(
            kind.as_str(),
            format!("page {} does not exist (document has {} pages)", page, count),
        ));
    }
    Ok(page as usize - 1)
}

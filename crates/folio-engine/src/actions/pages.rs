//! Page-structure actions: merge, split, compress, rotate

use serde_json::{Map, Value};

use super::{ActionContext, ActionOutcome, Effect, RequestKind, SuspensionRequest, save_edited};
use crate::archive::ArchiveBuilder;
use crate::catalog::ActionKind;
use crate::document::{self, BRAND_MARK, Document, SaveOptions};
use crate::error::Result;
use crate::params::{self, CompressParams, RotateParams};

pub(super) const MERGED_NAME: &str = "merged.pdf";

/// Merge every loaded document in load order. With fewer than two loaded,
/// ask the operator for more files instead.
pub(super) fn merge(cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    if cx.documents.len() < 2 {
        return Ok(ActionOutcome::Suspend(SuspensionRequest {
            kind: RequestKind::RequestFiles,
            reason: "Merging needs at least two PDFs. Please add the files you want to combine."
                .to_string(),
        }));
    }

    let mut merged = cx.library.create()?;
    for source in cx.documents.iter() {
        let pdf = document::open(cx.library, source)?;
        let pages: Vec<usize> = (0..pdf.page_count()).collect();
        merged.copy_pages_from(pdf.as_ref(), &pages)?;
        tracing::debug!("Merged {} pages from {}", pages.len(), source.name);
    }
    merged.add_brand_mark(BRAND_MARK)?;

    let bytes = merged.save(&SaveOptions::default())?;
    Ok(ActionOutcome::Continue(Effect::Consolidate(Document::new(
        MERGED_NAME,
        bytes,
    ))))
}

/// One PDF per page, packed into a zip. The primary document is left as is.
pub(super) fn split(cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let (primary, pdf) = cx.open_primary(ActionKind::Split)?;
    let mut archive = ArchiveBuilder::new(format!("{}_pages.zip", primary.stem()));

    for page in 0..pdf.page_count() {
        let mut single = cx.library.create()?;
        single.copy_pages_from(pdf.as_ref(), &[page])?;
        single.add_brand_mark(BRAND_MARK)?;
        let bytes = single.save(&SaveOptions::default())?;
        archive.add(format!("{}_page_{}.pdf", primary.stem(), page + 1), &bytes)?;
    }

    Ok(ActionOutcome::Continue(Effect::Archive(archive.finish()?)))
}

pub(super) fn compress(parameters: &Map<String, Value>, cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let p: CompressParams = params::extract(ActionKind::Compress, parameters)?;
    let (primary, pdf) = cx.open_primary(ActionKind::Compress)?;
    let bytes = pdf.save(&SaveOptions {
        password: primary.password.clone(),
        compress: true,
    })?;
    tracing::debug!(
        "Compressed ({}) {} -> {} bytes",
        p.level,
        primary.bytes.len(),
        bytes.len()
    );
    Ok(ActionOutcome::Continue(Effect::Replace(bytes)))
}

/// Rotate every page clockwise by `angle`, on top of its current rotation
pub(super) fn rotate(parameters: &Map<String, Value>, cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let p: RotateParams = params::extract(ActionKind::Rotate, parameters)?;
    let degrees = p.degrees()?;
    if !p.pages.eq_ignore_ascii_case("all") {
        tracing::warn!("rotate: page selection {:?} is not supported, rotating all pages", p.pages);
    }

    let (primary, mut pdf) = cx.open_primary(ActionKind::Rotate)?;
    for page in 0..pdf.page_count() {
        let current = pdf.rotation(page)?;
        pdf.set_rotation(page, (current + degrees) % 360)?;
    }
    save_edited(pdf.as_ref(), primary)
}

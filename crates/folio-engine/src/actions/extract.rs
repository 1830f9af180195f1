//! Read-only actions whose results are shown to the operator

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use folio_ai::{Content, Context, Message};

use super::{ActionContext, ActionOutcome, DisplayPayload, Effect};
use crate::archive::ArchiveBuilder;
use crate::catalog::ActionKind;
use crate::document;
use crate::error::{Error, Result};
use crate::params::{self, UnsupportedParams};
use crate::parser::parse_json;
use crate::prompt;

/// A table recovered from page images
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Read tables out of a model reply: either `{"tables": [...]}` or a bare array
pub fn parse_tables(raw: &str) -> Option<Vec<Table>> {
    let value = parse_json(raw)?;
    let tables = match value {
        Value::Object(mut map) => map.remove("tables")?,
        array @ Value::Array(_) => array,
        _ => return None,
    };
    match serde_json::from_value::<Vec<Table>>(tables) {
        Ok(tables) => Some(tables),
        Err(e) => {
            tracing::warn!("Table response has an unexpected shape: {}", e);
            None
        }
    }
}

pub(super) async fn summarize(cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let text = {
        let (_, pdf) = cx.open_primary(ActionKind::Summarize)?;
        document::document_text(pdf.as_ref(), cx.config.document_text_limit)?
    };
    if text.trim().is_empty() {
        return Ok(notice("This document has no extractable text to summarize."));
    }

    let context = Context::with_system(prompt::SUMMARY_INSTRUCTION);
    let summary = cx
        .service
        .send(&context, Message::user(format!("Document text:\n\n{}", text)))
        .await?;
    Ok(ActionOutcome::Terminal(DisplayPayload::Summary {
        text: summary.trim().to_string(),
    }))
}

/// Render the first pages and ask the completion service to transcribe tables
pub(super) async fn extract_tables(cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let (primary, pdf) = cx.open_primary(ActionKind::ExtractTables)?;
    let pages = pdf.page_count().min(cx.config.table_page_limit);
    drop(pdf);

    let mut content = vec![Content::text(prompt::TABLE_REQUEST)];
    for page in 0..pages {
        let rendered = cx
            .rasterizer
            .render(&primary.bytes, page, cx.config.table_render_scale)
            .await?;
        content.push(Content::text(format!("Page {}:", page + 1)));
        content.push(Content::png(&rendered.png));
    }

    let context = Context::with_system(prompt::TABLE_INSTRUCTION);
    let reply = cx
        .service
        .send(&context, Message::user_with_content(content))
        .await?;
    let tables = parse_tables(&reply)
        .ok_or_else(|| Error::Parse("the table extraction reply was not valid JSON".to_string()))?;

    if tables.is_empty() {
        return Ok(notice("No tables were found in this document."));
    }
    Ok(ActionOutcome::Terminal(DisplayPayload::Tables { tables }))
}

pub(super) fn extract_text(cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let (_, pdf) = cx.open_primary(ActionKind::ExtractText)?;
    let text = document::document_text(pdf.as_ref(), usize::MAX)?;
    if text.trim().is_empty() {
        return Ok(notice("This document has no extractable text."));
    }
    Ok(ActionOutcome::Terminal(DisplayPayload::Text { text }))
}

/// Pack embedded images into a zip
pub(super) fn extract_images(cx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let (primary, pdf) = cx.open_primary(ActionKind::ExtractImages)?;
    let images = pdf.images()?;
    if images.is_empty() {
        return Ok(notice("This document has no embedded images."));
    }

    let mut archive = ArchiveBuilder::new(format!("{}_images.zip", primary.stem()));
    for (i, image) in images.iter().enumerate() {
        let name = format!("page{}_image{}.{}", image.page + 1, i + 1, image.extension);
        archive.add(name, &image.data)?;
    }
    Ok(ActionOutcome::Continue(Effect::Archive(archive.finish()?)))
}

pub(super) fn unsupported(parameters: &Map<String, Value>) -> Result<ActionOutcome> {
    let p: UnsupportedParams = params::extract(ActionKind::Unsupported, parameters)?;
    let text = if p.reason.trim().is_empty() {
        "That request isn't something I can do with the available tools.".to_string()
    } else {
        p.reason
    };
    Ok(notice(text))
}

fn notice(text: impl Into<String>) -> ActionOutcome {
    ActionOutcome::Terminal(DisplayPayload::Notice { text: text.into() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tables_object_form() {
        let raw = r#"```json
{"tables": [{"title": "Q1", "page": 1, "headers": ["a", "b"], "rows": [["1", "2"]]}]}
```"#;
        let tables = parse_tables(raw).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].title.as_deref(), Some("Q1"));
        assert_eq!(tables[0].rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn test_parse_tables_array_form() {
        let tables = parse_tables(r#"[{"headers": ["x"], "rows": []}]"#).unwrap();
        assert_eq!(tables[0].headers, vec!["x".to_string()]);
        assert_eq!(tables[0].title, None);
    }

    #[test]
    fn test_parse_tables_rejects_other_shapes() {
        assert_eq!(parse_tables(r#"{"data": []}"#), None);
        assert_eq!(parse_tables("no tables here"), None);
    }
}

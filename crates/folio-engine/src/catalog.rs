//! The closed action vocabulary and per-action parameter validation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};

/// How an action relates to the primary document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectClass {
    /// Pauses the plan until the operator supplies something
    Suspend,
    /// Transforms the document; output feeds the next task
    Mutating,
    /// Produces something to show; document bytes are left alone
    Terminal,
}

/// Every action a plan may name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    RequestFiles,
    RequestInput,
    Merge,
    Split,
    Compress,
    Rotate,
    AddPageNumbers,
    Watermark,
    Protect,
    Unlock,
    AddText,
    Whiteout,
    Summarize,
    ExtractTables,
    ExtractText,
    ExtractImages,
    Unsupported,
}

impl ActionKind {
    pub const ALL: [ActionKind; 17] = [
        ActionKind::RequestFiles,
        ActionKind::RequestInput,
        ActionKind::Merge,
        ActionKind::Split,
        ActionKind::Compress,
        ActionKind::Rotate,
        ActionKind::AddPageNumbers,
        ActionKind::Watermark,
        ActionKind::Protect,
        ActionKind::Unlock,
        ActionKind::AddText,
        ActionKind::Whiteout,
        ActionKind::Summarize,
        ActionKind::ExtractTables,
        ActionKind::ExtractText,
        ActionKind::ExtractImages,
        ActionKind::Unsupported,
    ];

    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::RequestFiles => "request_files",
            ActionKind::RequestInput => "request_input",
            ActionKind::Merge => "merge",
            ActionKind::Split => "split",
            ActionKind::Compress => "compress",
            ActionKind::Rotate => "rotate",
            ActionKind::AddPageNumbers => "add_page_numbers",
            ActionKind::Watermark => "watermark",
            ActionKind::Protect => "protect",
            ActionKind::Unlock => "unlock",
            ActionKind::AddText => "add_text",
            ActionKind::Whiteout => "whiteout",
            ActionKind::Summarize => "summarize",
            ActionKind::ExtractTables => "extract_tables",
            ActionKind::ExtractText => "extract_text",
            ActionKind::ExtractImages => "extract_images",
            ActionKind::Unsupported => "unsupported",
        }
    }

    /// Look up an action by its wire name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn effect(&self) -> EffectClass {
        match self {
            ActionKind::RequestFiles | ActionKind::RequestInput => EffectClass::Suspend,
            ActionKind::Merge
            | ActionKind::Split
            | ActionKind::Compress
            | ActionKind::Rotate
            | ActionKind::AddPageNumbers
            | ActionKind::Watermark
            | ActionKind::Protect
            | ActionKind::Unlock
            | ActionKind::AddText
            | ActionKind::Whiteout => EffectClass::Mutating,
            ActionKind::Summarize
            | ActionKind::ExtractTables
            | ActionKind::ExtractText
            | ActionKind::ExtractImages
            | ActionKind::Unsupported => EffectClass::Terminal,
        }
    }

    /// One-line description shown to the completion service
    pub fn description(&self) -> &'static str {
        match self {
            ActionKind::RequestFiles => {
                "Ask the user to upload more PDF files, then stop until they arrive."
            }
            ActionKind::RequestInput => {
                "Ask the user for a value such as a password, then stop until it arrives."
            }
            ActionKind::Merge => "Combine every loaded PDF, in upload order, into one document.",
            ActionKind::Split => "Split the document into one PDF per page, delivered as a zip.",
            ActionKind::Compress => "Reduce file size.",
            ActionKind::Rotate => "Rotate every page clockwise by the given angle.",
            ActionKind::AddPageNumbers => "Stamp a page number on every page.",
            ActionKind::Watermark => "Draw semi-transparent text across the middle of every page.",
            ActionKind::Protect => "Encrypt the document with a password.",
            ActionKind::Unlock => "Remove password protection using the current password.",
            ActionKind::AddText => "Write text on one page.",
            ActionKind::Whiteout => "Cover a rectangular area of one page with white.",
            ActionKind::Summarize => "Summarize the document's text.",
            ActionKind::ExtractTables => "Find tables on the first pages and return them as rows.",
            ActionKind::ExtractText => "Return the document's plain text.",
            ActionKind::ExtractImages => "Collect embedded images into a zip.",
            ActionKind::Unsupported => "Explain that the request cannot be done with these tools.",
        }
    }

    /// JSON Schema for the action's `parameters` object
    pub fn parameters_schema(&self) -> Value {
        match self {
            ActionKind::RequestFiles => object(
                json!({ "reason": { "type": "string", "minLength": 1 } }),
                &["reason"],
            ),
            ActionKind::RequestInput => object(
                json!({
                    "reason": { "type": "string", "minLength": 1 },
                    "type": { "type": "string", "enum": ["password", "text"] }
                }),
                &["reason"],
            ),
            ActionKind::Merge
            | ActionKind::Split
            | ActionKind::Summarize
            | ActionKind::ExtractTables
            | ActionKind::ExtractText
            | ActionKind::ExtractImages => object(json!({}), &[]),
            ActionKind::Compress => object(
                json!({ "level": { "type": "string", "enum": ["strong"] } }),
                &[],
            ),
            ActionKind::Rotate => object(
                json!({
                    "pages": { "type": "string" },
                    "angle": { "type": "integer", "enum": [90, 180, 270] }
                }),
                &["angle"],
            ),
            ActionKind::AddPageNumbers => object(
                json!({
                    "position": { "type": "string" },
                    "format": { "type": "string", "enum": ["n", "n_of_N"] }
                }),
                &[],
            ),
            ActionKind::Watermark => object(
                json!({
                    "text": { "type": "string", "minLength": 1 },
                    "font_size": { "type": "number", "exclusiveMinimum": 0 },
                    "opacity": { "type": "number", "minimum": 0, "maximum": 1 },
                    "rotation": { "type": "number" }
                }),
                &["text"],
            ),
            ActionKind::Protect | ActionKind::Unlock => object(
                json!({ "password": { "type": "string", "minLength": 1 } }),
                &["password"],
            ),
            ActionKind::AddText => object(
                json!({
                    "text": { "type": "string", "minLength": 1 },
                    "page": { "type": "integer", "minimum": 1 },
                    "font_size": { "type": "number", "exclusiveMinimum": 0 },
                    "position": { "type": "string" }
                }),
                &["text", "page"],
            ),
            ActionKind::Whiteout => object(
                json!({
                    "page": { "type": "integer", "minimum": 1 },
                    "position": { "type": "string" },
                    "width": { "type": "number", "exclusiveMinimum": 0 },
                    "height": { "type": "number", "exclusiveMinimum": 0 }
                }),
                &["page", "width", "height"],
            ),
            ActionKind::Unsupported => object(json!({ "reason": { "type": "string" } }), &[]),
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Compiled parameter validators for every action
pub struct Catalog {
    validators: HashMap<ActionKind, Arc<jsonschema::Validator>>,
}

impl Catalog {
    /// Compile every action's parameter schema
    pub fn new() -> Self {
        let mut validators = HashMap::new();
        for kind in ActionKind::ALL {
            match jsonschema::validator_for(&kind.parameters_schema()) {
                Ok(validator) => {
                    validators.insert(kind, Arc::new(validator));
                }
                Err(e) => {
                    tracing::warn!(
                        "Invalid parameter schema for '{}', skipping validation: {}",
                        kind,
                        e
                    );
                }
            }
        }
        Self { validators }
    }

    /// Check a task's parameters against its action's schema
    pub fn validate(&self, kind: ActionKind, parameters: &Map<String, Value>) -> Result<()> {
        let Some(validator) = self.validators.get(&kind) else {
            return Ok(());
        };
        match validate_with_validator(&Value::Object(parameters.clone()), validator) {
            Some(reason) => Err(Error::validation(kind.as_str(), reason)),
            None => Ok(()),
        }
    }

    /// Render the vocabulary, one action per block, for the system instruction
    pub fn describe(&self) -> String {
        ActionKind::ALL
            .iter()
            .map(|kind| {
                let schema = kind.parameters_schema();
                format!(
                    "- {} ({}): {}\n  parameters: {}",
                    kind,
                    effect_label(kind.effect()),
                    kind.description(),
                    schema["properties"]
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

fn effect_label(effect: EffectClass) -> &'static str {
    match effect {
        EffectClass::Suspend => "waits for the user",
        EffectClass::Mutating => "changes the document",
        EffectClass::Terminal => "shows a result",
    }
}

/// Validate arguments using a pre-compiled validator.
/// Returns `Some(error_message)` if validation fails, `None` if valid.
fn validate_with_validator(args: &Value, validator: &jsonschema::Validator) -> Option<String> {
    let errors: Vec<String> = validator
        .iter_errors(args)
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{}: {}", path, e)
            }
        })
        .collect();

    if errors.is_empty() {
        None
    } else {
        Some(format!("invalid parameters: {}", errors.join("; ")))
    }
}

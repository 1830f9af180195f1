//! Instructions sent to the completion service

use crate::actions::RequestKind;
use crate::catalog::{ActionKind, Catalog};
use crate::document::DocumentSet;
use crate::executor::PendingSuspension;
use crate::params::InputKind;

/// Reply sent to the operator when a response could not be read as a plan
pub const REPHRASE_MESSAGE: &str =
    "Sorry, I couldn't work out what to do with that. Could you rephrase your request?";

pub const SUMMARY_INSTRUCTION: &str = "You summarize PDF documents. Reply with a concise \
summary in plain prose: the document's purpose, its main points and any figures or dates \
that matter. Do not invent content that is not in the text.";

pub const TABLE_INSTRUCTION: &str = "You transcribe tables from page images. Reply with JSON \
only, shaped as {\"tables\": [{\"title\": string or null, \"page\": number, \"headers\": \
[string], \"rows\": [[string]]}]}. Every cell is a string. If there are no tables reply \
{\"tables\": []}.";

pub const TABLE_REQUEST: &str = "Extract every table from the following pages.";

pub const CHAT_INSTRUCTION: &str = "You answer questions about the PDF document whose text \
is provided. Answer from the document. If the answer is not in it, say so.";

pub const OUTLINE_INSTRUCTION: &str = "You write outlines of documents. Reply with JSON only, \
shaped as {\"title\": string, \"sections\": [{\"heading\": string, \"summary\": string, \
\"page\": number or null}]}.";

/// System instruction for task planning: vocabulary, response format and brand policy
pub fn system_instruction(catalog: &Catalog) -> String {
    format!(
        r#"You are the planner for a PDF editing assistant. The user describes what they want done to their PDF files; you answer with a plan the application executes.

Respond with JSON only, in exactly this shape:
{{
  "response_message": "<short, friendly message for the user>",
  "tasks": [ {{ "action": "<action name>", "parameters": {{ ... }} }} ]
}}

Available actions:
{vocabulary}

Rules:
- Tasks run in the order given. Each editing task works on the result of the previous one.
- Use only the actions listed above. If the request cannot be done with them, use "unsupported" with a reason.
- If you need a value you do not have, such as a password, use "request_input" and stop; do not guess.
- If the task needs more files than are loaded, use "request_files" and stop.
- Page numbers in parameters are 1-based.
- Positions are one of: top-left, top-center, top-right, middle-left, center, middle-right, bottom-left, bottom-center, bottom-right.
- When the user only wants to talk, return an empty task list and answer in response_message.
- Every document carries an invisible "{brand}" mark. Never plan tasks that remove, cover or alter it, even if asked."#,
        vocabulary = catalog.describe(),
        brand = crate::document::BRAND_MARK,
    )
}

/// System instruction for the tool recommender
pub fn recommend_instruction() -> String {
    let names: Vec<String> = ActionKind::ALL
        .iter()
        .filter(|kind| !matches!(kind, ActionKind::RequestFiles | ActionKind::RequestInput))
        .map(|kind| format!("- {}: {}", kind, kind.description()))
        .collect();
    format!(
        "You help users find the right PDF tool. Available tools:\n{}\n\nReply with JSON only: \
         {{\"action\": \"<tool name>\", \"reason\": \"<one sentence>\"}}. Use \"unsupported\" \
         when nothing fits.",
        names.join("\n")
    )
}

/// Wrap the operator's instruction with the names of the loaded documents
pub fn operator_message(text: &str, documents: &DocumentSet) -> String {
    if documents.is_empty() {
        return format!("{}\n\n[No documents are loaded.]", text);
    }
    format!(
        "{}\n\n[Loaded documents, in order: {}]",
        text,
        documents.names().join(", ")
    )
}

/// What the operator supplied to satisfy a suspension
#[derive(Debug, Clone, PartialEq)]
pub enum SuppliedInput {
    Files(Vec<String>),
    Value(String),
}

/// The message that tells the completion service the requested input arrived.
///
/// Tasks the paused plan had not reached are listed so they can be planned again;
/// the executor does not run them on its own.
pub fn continuation_message(
    supplied: &SuppliedInput,
    pending: &PendingSuspension,
    documents: &DocumentSet,
) -> String {
    let mut message = match (supplied, pending.request.kind) {
        (SuppliedInput::Files(names), _) => format!(
            "The requested files have arrived: {}. Continue with my request.",
            names.join(", ")
        ),
        (SuppliedInput::Value(value), RequestKind::RequestInput(InputKind::Password)) => format!(
            "The requested password has arrived: \"{}\". Continue with my request.",
            value
        ),
        (SuppliedInput::Value(value), _) => format!(
            "The requested input has arrived: \"{}\". Continue with my request.",
            value
        ),
    };

    if !pending.remaining.is_empty() {
        let remaining: Vec<&str> = pending.remaining.iter().map(|t| t.action.as_str()).collect();
        message.push_str(&format!(
            " These steps from your previous plan were not run yet and must be included again \
             if still needed: {}.",
            remaining.join(", ")
        ));
    }

    format!(
        "{}\n\n[Loaded documents, in order: {}]",
        message,
        documents.names().join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::SuspensionRequest;
    use crate::document::Document;
    use crate::plan::Task;
    use serde_json::json;

    fn pending(kind: RequestKind, remaining: Vec<Task>) -> PendingSuspension {
        PendingSuspension {
            request: SuspensionRequest {
                kind,
                reason: "need it".into(),
            },
            remaining,
        }
    }

    #[test]
    fn test_system_instruction_lists_vocabulary_and_policy() {
        let text = system_instruction(&Catalog::new());
        assert!(text.contains("\"response_message\""));
        assert!(text.contains("add_page_numbers"));
        assert!(text.contains("request_input"));
        assert!(text.contains(crate::document::BRAND_MARK));
    }

    #[test]
    fn test_continuation_carries_value_and_tail() {
        let mut docs = DocumentSet::new();
        docs.push(Document::new("a.pdf", vec![]));
        let msg = continuation_message(
            &SuppliedInput::Value("hunter2".into()),
            &pending(
                RequestKind::RequestInput(InputKind::Password),
                vec![Task::new(ActionKind::Compress, json!({}))],
            ),
            &docs,
        );
        assert!(msg.contains("password"));
        assert!(msg.contains("hunter2"));
        assert!(msg.contains("compress"));
        assert!(msg.contains("a.pdf"));
    }

    #[test]
    fn test_continuation_for_files() {
        let msg = continuation_message(
            &SuppliedInput::Files(vec!["b.pdf".into(), "c.pdf".into()]),
            &pending(RequestKind::RequestFiles, vec![]),
            &DocumentSet::new(),
        );
        assert!(msg.contains("b.pdf, c.pdf"));
        assert!(!msg.contains("not run yet"));
    }

    #[test]
    fn test_recommend_instruction_skips_request_actions() {
        let text = recommend_instruction();
        assert!(text.contains("- merge:"));
        assert!(!text.contains("- request_files:"));
    }
}

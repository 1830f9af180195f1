//! Lenient JSON extraction from model output.
//!
//! Completion services wrap JSON in markdown fences, prefix it with prose and
//! sometimes stop mid-object. [`parse_json`] recovers the first well-formed
//! JSON value it can find, or `None`.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Opening fence with an optional language tag. The body runs to the closing
/// fence, or to the end of input when the fence was never closed.
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)(?:```|\z)").expect("fence pattern")
});

/// Extract the first JSON object or array from raw model output
pub fn parse_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    let body = fenced_body(trimmed).unwrap_or(trimmed);

    let Some(start) = body.find(['{', '[']) else {
        tracing::debug!("No JSON start in response of {} chars", raw.len());
        return None;
    };
    let candidate = &body[start..];

    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Some(value);
    }

    if let Some(value) = first_balanced_prefix(candidate) {
        return Some(value);
    }

    tracing::warn!(
        "Failed to parse JSON from response. Original: {:?}, attempted: {:?}",
        raw,
        candidate
    );
    None
}

fn fenced_body(text: &str) -> Option<&str> {
    FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Walk `text`, which starts with `{` or `[`, and return the first prefix that
/// closes back to depth zero and parses.
fn first_balanced_prefix(text: &str) -> Option<Value> {
    let mut chars = text.char_indices();
    let (_, open) = chars.next()?;
    let close = match open {
        '{' => '}',
        '[' => ']',
        _ => return None,
    };

    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in chars {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                let end = i + c.len_utf8();
                match serde_json::from_str::<Value>(&text[..end]) {
                    Ok(value) => return Some(value),
                    // Keep walking; a later closer can still balance.
                    Err(_) => depth = 1,
                }
            }
        }
    }

    None
}

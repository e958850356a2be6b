//! Wrapper-stripping for model output.
//!
//! Models wrap JSON in ```json fences and some emit a `<think>…</think>`
//! preamble before the answer. Both must be removed before parsing.

/// Strip markdown code fences and thinking preambles from model output.
pub fn strip_wrappers(text: &str) -> String {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    // A <think> section precedes the real answer; keep what follows the
    // closing tag. An unterminated <think> leaves nothing usable.
    let mut text = text.trim().to_string();
    if text.contains("<think>") {
        if let Some(end) = text.find("</think>") {
            text = text[end + "</think>".len()..].to_string();
        }
    }

    text.trim().to_string()
}

//! Response extraction
//!
//! Pulls the assistant message out of a chat-completion envelope and turns it
//! into a JSON value. Models often wrap JSON in Markdown code fences even when
//! told not to, so fences are stripped before parsing.

use crate::error::{AppError, AppResult};
use serde::Deserialize;
use serde_json::Value;

/// Maximum characters of model output kept in a parse error
pub const MAX_PREVIEW_CHARS: usize = 200;

const FENCE: &str = "```";

#[derive(Debug, Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<Value>,
}

/// Locate `choices[0].message.content` in a raw 2xx response body
///
/// # Errors
///
/// Returns `AppError::NoContent` if the body is not a JSON envelope, there are
/// no choices, or the content is missing, not a string, or blank.
pub fn extract_content(raw_body: &str) -> AppResult<String> {
    let envelope: CompletionEnvelope = serde_json::from_str(raw_body).map_err(|e| {
        AppError::NoContent(format!("response body is not a completion envelope: {}", e))
    })?;

    let message = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NoContent("response contains no choices".to_string()))?
        .message
        .ok_or_else(|| AppError::NoContent("first choice has no message".to_string()))?;

    match message.content {
        Some(Value::String(content)) if !content.trim().is_empty() => Ok(content),
        Some(Value::String(_)) => Err(AppError::NoContent("message content is empty".to_string())),
        Some(Value::Null) | None => Err(AppError::NoContent(
            "message content is missing".to_string(),
        )),
        Some(_) => Err(AppError::NoContent(
            "message content is not a string".to_string(),
        )),
    }
}

/// Remove a surrounding Markdown code fence
///
/// Handles an optional language tag after the opening fence (```` ```json ````).
/// Input without fences is returned trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let mut inner = text.trim();

    if let Some(rest) = inner.strip_prefix(FENCE) {
        // Drop the language tag, if any, up to the end of the fence line
        inner = match rest.find('\n') {
            Some(newline) if is_language_tag(&rest[..newline]) => &rest[newline + 1..],
            None if is_language_tag(rest) => "",
            _ => strip_inline_tag(rest),
        };
    }
    if let Some(rest) = inner.trim_end().strip_suffix(FENCE) {
        inner = rest;
    }

    inner.trim()
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn is_language_tag(candidate: &str) -> bool {
    candidate.trim().chars().all(is_tag_char)
}

/// Drop a tag glued to the JSON on the fence line (```` ```json{...} ````)
fn strip_inline_tag(rest: &str) -> &str {
    let body = rest.trim_start_matches(is_tag_char);
    if body.len() < rest.len() && (body.starts_with('{') || body.starts_with('[')) {
        body
    } else {
        rest
    }
}

/// Strip fences and parse the model output as JSON
///
/// # Errors
///
/// Returns `AppError::JsonParse` with the parser message and a bounded preview
/// of the content.
pub fn parse_route_json(content: &str) -> AppResult<Value> {
    serde_json::from_str(strip_code_fences(content)).map_err(|e| AppError::JsonParse {
        reason: e.to_string(),
        preview: preview(content),
    })
}

/// First [`MAX_PREVIEW_CHARS`] characters of `text`, cut on a char boundary
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(MAX_PREVIEW_CHARS) {
        Some((byte_index, _)) => format!("{}... [truncated]", &text[..byte_index]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(content: Value) -> String {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]}).to_string()
    }

    #[test]
    fn test_extract_content_returns_first_choice() {
        let body = json!({
            "choices": [
                {"message": {"content": "first"}},
                {"message": {"content": "second"}}
            ]
        })
        .to_string();
        assert_eq!(extract_content(&body).unwrap(), "first");
    }

    #[test]
    fn test_extract_content_rejects_missing_or_blank_content() {
        let cases = [
            json!({"choices": []}).to_string(),
            json!({"id": "x"}).to_string(),
            json!({"choices": [{"finish_reason": "length"}]}).to_string(),
            envelope(Value::Null),
            envelope(json!("   \n")),
            envelope(json!(42)),
            "<html>proxy error</html>".to_string(),
        ];
        for body in cases {
            let err = extract_content(&body).unwrap_err();
            assert!(matches!(err, AppError::NoContent(_)), "body {} gave {:?}", body, err);
        }
    }

    #[test]
    fn test_strip_fences_with_language_tag() {
        let fenced = "```json\n{\"title\": \"x\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"title\": \"x\"}");
    }

    #[test]
    fn test_strip_fences_without_language_tag() {
        assert_eq!(strip_code_fences("```\n[1, 2]\n```\n"), "[1, 2]");
        assert_eq!(strip_code_fences("```{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(
            strip_code_fences("```json{\"title\": \"x\"}```"),
            "{\"title\": \"x\"}"
        );
        assert_eq!(strip_code_fences("```json[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn test_parse_accepts_single_line_fence_with_tag() {
        let value = parse_route_json("```json{\"title\": \"x\"}```").unwrap();
        assert_eq!(value["title"], "x");

        // A leading word that is not followed by JSON stays in place
        assert!(parse_route_json("```json not really```").is_err());
    }

    #[test]
    fn test_strip_fences_leaves_plain_text_trimmed() {
        assert_eq!(strip_code_fences("  {\"a\": 1}\n"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("not json"), "not json");
    }

    #[test]
    fn test_parse_accepts_fenced_json() {
        let value = parse_route_json("```json\n{\"title\": \"Loop\"}\n```").unwrap();
        assert_eq!(value["title"], "Loop");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        match parse_route_json("not json") {
            Err(AppError::JsonParse { reason, preview }) => {
                assert!(!reason.is_empty());
                assert_eq!(preview, "not json");
            }
            other => panic!("expected JsonParse, got {:?}", other),
        }
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let text = "ż".repeat(MAX_PREVIEW_CHARS + 50);
        let p = preview(&text);
        assert!(p.ends_with("... [truncated]"));
        assert_eq!(
            p.trim_end_matches("... [truncated]").chars().count(),
            MAX_PREVIEW_CHARS
        );

        let short = "Kraków → Zakopane";
        assert_eq!(preview(short), short);
    }
}

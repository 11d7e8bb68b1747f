//! Pulling JSON out of model output
//!
//! JSON mode normally yields a bare object, which is used as-is. Models still
//! occasionally wrap it in prose or a code fence; those are unwrapped only
//! when the whole reply is not already valid JSON.

use serde::de::{DeserializeOwned, IgnoredAny};

use crate::error::ParseError;

const FENCE: &str = "```";

/// Locate the JSON object in a model reply.
///
/// Tried in order: the trimmed reply itself, the body of the first code
/// fence, then the first balanced `{...}` span.
pub fn extract_json_from_response(response: &str) -> Result<&str, ParseError> {
    let trimmed = response.trim();
    if is_json_object(trimmed) {
        return Ok(trimmed);
    }

    if let Some(body) = fenced_body(response).filter(|body| is_json_object(body)) {
        return Ok(body);
    }

    let start = response.find('{').ok_or(ParseError::NoJsonFound)?;
    let len = object_len(&response[start..]).ok_or(ParseError::MalformedJson)?;
    Ok(&response[start..start + len])
}

/// Extract and deserialize the JSON object in `response`.
pub fn parse_model_json<T: DeserializeOwned>(response: &str) -> Result<T, ParseError> {
    let slice = extract_json_from_response(response)?;
    serde_json::from_str(slice).map_err(|e| ParseError::Schema {
        message: e.to_string(),
    })
}

fn is_json_object(text: &str) -> bool {
    text.starts_with('{') && serde_json::from_str::<IgnoredAny>(text).is_ok()
}

/// Body of the first fenced block, minus an info string such as `json`.
fn fenced_body(response: &str) -> Option<&str> {
    let (_, after_open) = response.split_once(FENCE)?;
    let (block, _) = after_open.split_once(FENCE)?;

    let body = match block.split_once('\n') {
        Some((info, rest)) if !info.contains('{') => rest,
        _ => block.trim_start_matches("json"),
    };
    Some(body.trim())
}

/// Byte length of the object opening at the start of `text`, if it closes.
fn object_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        match (in_string, ch) {
            (true, _) if escaped => escaped = false,
            (true, '\\') => escaped = true,
            (true, '"') => in_string = false,
            (true, _) => {}
            (false, '"') => in_string = true,
            (false, '{') => depth += 1,
            (false, '}') => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            (false, _) => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::{ParsedCommand, SuggestionsResponse};

    #[test]
    fn test_extract_plain_json() {
        let json = r#"{ "a": 1 }"#;
        assert_eq!(extract_json_from_response(json).unwrap(), json);
    }

    #[test]
    fn test_extract_trims_surrounding_whitespace() {
        assert_eq!(
            extract_json_from_response("\n  {\"a\": 1}\n").unwrap(),
            "{\"a\": 1}"
        );
    }

    #[test]
    fn test_extract_wrapped_text() {
        let response = "prefix text\n{ \"key\": \"value\" }\nsuffix";
        assert_eq!(
            extract_json_from_response(response).unwrap(),
            "{ \"key\": \"value\" }"
        );
    }

    #[test]
    fn test_extract_code_fence() {
        let response = "Sure:\n```json\n{ \"ok\": true }\n```";
        assert_eq!(extract_json_from_response(response).unwrap(), "{ \"ok\": true }");
    }

    #[test]
    fn test_extract_untagged_code_fence() {
        let response = "```\n{\"ok\": true}\n```";
        assert_eq!(extract_json_from_response(response).unwrap(), "{\"ok\": true}");
    }

    #[test]
    fn test_bare_json_containing_fence_marker_is_kept_whole() {
        let response = r#"{"suggestions": [{"text": "Wrap it in ``` fences ``` please"}]}"#;
        assert_eq!(extract_json_from_response(response).unwrap(), response);

        let parsed: SuggestionsResponse = parse_model_json(response).unwrap();
        assert_eq!(parsed.suggestions[0].text, "Wrap it in ``` fences ``` please");
    }

    #[test]
    fn test_extract_braces_in_strings() {
        let response = "text {\"msg\": \"value with } brace\"} trailing";
        assert_eq!(
            extract_json_from_response(response).unwrap(),
            "{\"msg\": \"value with } brace\"}"
        );
    }

    #[test]
    fn test_extract_escaped_quote_in_string() {
        let response = r#"note {"msg": "say \"hi\" }"} end"#;
        assert_eq!(
            extract_json_from_response(response).unwrap(),
            r#"{"msg": "say \"hi\" }"}"#
        );
    }

    #[test]
    fn test_extract_errors_without_json() {
        assert_eq!(
            extract_json_from_response("no braces here").unwrap_err(),
            ParseError::NoJsonFound
        );
    }

    #[test]
    fn test_extract_errors_on_unbalanced() {
        assert_eq!(
            extract_json_from_response("start { \"a\": 1 ").unwrap_err(),
            ParseError::MalformedJson
        );
    }

    #[test]
    fn test_parse_model_json_reports_shape_mismatch() {
        let err = parse_model_json::<ParsedCommand>(r#"{"query": "x"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Schema { .. }));
    }

    #[test]
    fn test_parse_model_json_reads_command() {
        let parsed: ParsedCommand =
            parse_model_json(r#"{"action": "delete", "query": "category:promotions older_than:6m"}"#)
                .unwrap();
        assert_eq!(parsed.action, "delete");
        assert_eq!(parsed.query, "category:promotions older_than:6m");
        assert!(parsed.label.is_none());
    }
}

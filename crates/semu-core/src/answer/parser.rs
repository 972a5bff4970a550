//! Model output parser
//!
//! One canonical extraction rule shared by the question and
//! classification flows: a string-aware brace scan finds the first
//! balanced `{...}` region (arbitrary nesting, braces inside quoted
//! strings ignored) and that region must parse as a JSON object.
//! Anything else degrades to raw-text passthrough; parsing never fails.

use super::{CategoryCode, ParsedAnswer};
use serde_json::Value;

/// Parse model output, falling back to raw passthrough
pub fn parse_answer(raw: &str) -> ParsedAnswer {
    try_parse_answer(raw).unwrap_or_else(|| ParsedAnswer::raw(raw))
}

/// Parse model output; `None` when no JSON object could be recovered
pub fn try_parse_answer(raw: &str) -> Option<ParsedAnswer> {
    let region = extract_json_object(raw)?;
    let value: Value = match serde_json::from_str(region) {
        Ok(value @ Value::Object(_)) => value,
        _ => {
            tracing::debug!("balanced region is not a JSON object; passing raw text through");
            return None;
        }
    };

    let answer = value
        .get("answer")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string());

    let is_deductible = value.get("is_deductible").and_then(Value::as_bool);

    let category_code = value
        .get("category_code")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(|code| {
            CategoryCode::from_code(code).unwrap_or_else(|| {
                tracing::debug!("unknown category code {:?}; normalizing to OTH", code);
                CategoryCode::Other
            })
        });

    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 1.0) as f32);

    let legal_basis = value
        .get("legal_basis")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);

    Some(ParsedAnswer {
        answer,
        is_deductible,
        category_code,
        confidence,
        legal_basis,
    })
}

/// First balanced `{...}` region of `text`, if any
///
/// Tracks brace depth while skipping string literals (including escaped
/// quotes), so prose around or inside the object cannot derail the scan.
fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

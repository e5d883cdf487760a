//! Structured response repair.
//!
//! Collaborators answer in JSON, but model output routinely wraps the
//! payload in prose or markdown fences. This module recovers the first
//! complete JSON value from raw text, or fails with a tagged
//! `ParseError` — never a best-effort silent default. Callers treat a
//! `ParseError` as retryable.

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("no JSON value found in response")]
    NoJsonFound,

    #[error("unbalanced JSON at byte {offset}: {detail}")]
    Unbalanced { offset: usize, detail: String },

    #[error("JSON decode failed: {0}")]
    Decode(String),
}

/// Decode a typed value out of raw collaborator text.
///
/// Strategy, in order: direct parse, markdown-fence stripping, then a
/// balanced-delimiter scan for the first complete object or array.
pub fn extract_structured<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    if let Ok(value) = serde_json::from_str::<T>(raw) {
        return Ok(value);
    }

    let stripped = strip_fences(raw);
    if let Ok(value) = serde_json::from_str::<T>(stripped) {
        return Ok(value);
    }

    let candidate = first_balanced_json(stripped)?;
    serde_json::from_str::<T>(candidate).map_err(|e| ParseError::Decode(e.to_string()))
}

/// Strip a single surrounding markdown code fence, if present.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence line.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches(['\r', '\n'])
        .trim_end()
        .trim_end_matches("```")
        .trim()
}

/// Locate the first balanced `{...}` or `[...]` span, honoring string
/// literals and escapes.
fn first_balanced_json(text: &str) -> Result<&str, ParseError> {
    let bytes = text.as_bytes();
    let start = bytes
        .iter()
        .position(|&b| b == b'{' || b == b'[')
        .ok_or(ParseError::NoJsonFound)?;

    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escape = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escape {
                escape = false;
            } else if b == b'\\' {
                escape = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => stack.push(b),
            b'}' | b']' => {
                let open = stack.pop().ok_or_else(|| ParseError::Unbalanced {
                    offset: i,
                    detail: format!("unmatched closing '{}'", b as char),
                })?;
                let matches = (open == b'{' && b == b'}') || (open == b'[' && b == b']');
                if !matches {
                    return Err(ParseError::Unbalanced {
                        offset: i,
                        detail: format!("'{}' closed by '{}'", open as char, b as char),
                    });
                }
                if stack.is_empty() {
                    return Ok(&text[start..=i]);
                }
            }
            _ => {}
        }
    }

    Err(ParseError::Unbalanced {
        offset: bytes.len(),
        detail: format!("{} delimiter(s) left open", stack.len()),
    })
}

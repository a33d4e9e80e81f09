//! Tolerant extraction of JSON payloads from AI text output.
//!
//! Models routinely wrap the requested JSON in markdown fences or surround it
//! with prose, and the prose may itself contain brackets ("found [2] poses").
//! [`json_candidates`] yields a fenced block first, then every balanced
//! `[...]` or `{...}` region in order of its opening delimiter.
//! [`parse_ai_json`] returns the first candidate that deserializes.

use serde::de::DeserializeOwned;

use crate::error::CoreError;

/// Contents of the first ```` ```json ```` (or bare ```` ``` ````) fenced
/// block, trimmed. `None` when there is no closed fence.
pub fn extract_fenced_block(raw: &str) -> Option<&str> {
    let open = raw.find("```")?;
    let after_ticks = &raw[open + 3..];
    // The info string runs to the end of the opening line.
    let body_start = after_ticks.find('\n').map_or(after_ticks.len(), |i| i + 1);
    let info = after_ticks[..body_start].trim();
    if !info.is_empty() && !info.eq_ignore_ascii_case("json") {
        return None;
    }
    let body = &after_ticks[body_start..];
    let close = body.find("```")?;
    let block = body[..close].trim();
    (!block.is_empty()).then_some(block)
}

/// The balanced region opening at byte `start`, which must hold `[` or `{`.
///
/// Nested delimiters are tracked on a stack so a `]` can only close a `[`
/// and a `}` only a `{`. Characters inside string literals (including
/// escaped quotes) are ignored.
fn balanced_region_at(raw: &str, start: usize) -> Option<&str> {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in raw[start..].char_indices() {
        if in_string {
            if escape_next {
                escape_next = false;
            } else if ch == '\\' {
                escape_next = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '[' | '{' => stack.push(ch),
            ']' | '}' => {
                let expected = if ch == ']' { '[' } else { '{' };
                if stack.pop() != Some(expected) {
                    return None;
                }
                if stack.is_empty() {
                    let end = start + i + ch.len_utf8();
                    return Some(&raw[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Every region of `raw` that could hold the payload, most likely first.
pub fn json_candidates(raw: &str) -> impl Iterator<Item = &str> {
    let fenced = extract_fenced_block(raw);
    let regions = raw
        .char_indices()
        .filter(|&(_, ch)| ch == '[' || ch == '{')
        .filter_map(move |(start, _)| balanced_region_at(raw, start));
    fenced.into_iter().chain(regions)
}

/// The first candidate region of `raw`, if any.
pub fn extract_json_region(raw: &str) -> Option<&str> {
    json_candidates(raw).next()
}

/// Extract and deserialize the JSON payload embedded in `raw`.
///
/// Candidates are tried in order until one deserializes into `T`. Fails
/// with [`CoreError::Parse`] (carrying `raw`) when none does; the message
/// names the error of the longest candidate.
pub fn parse_ai_json<T: DeserializeOwned>(raw: &str) -> Result<T, CoreError> {
    let mut best_failure: Option<(usize, serde_json::Error)> = None;

    for region in json_candidates(raw) {
        match serde_json::from_str(region) {
            Ok(value) => return Ok(value),
            Err(e) => {
                let longer = best_failure
                    .as_ref()
                    .map_or(true, |(len, _)| region.len() > *len);
                if longer {
                    best_failure = Some((region.len(), e));
                }
            }
        }
    }

    let message = match best_failure {
        Some((_, e)) => format!("invalid JSON in AI response: {e}"),
        None => format!("no JSON found in AI response (length: {})", raw.len()),
    };
    Err(CoreError::Parse {
        message,
        raw: raw.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

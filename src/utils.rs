// src/utils.rs
use chrono::{DateTime, Utc};

/// Upper bound, in bytes, for one token of a generated file name. Two tokens
/// plus a stamp stay well under the usual 255-byte file name limit.
pub const MAX_TOKEN_BYTES: usize = 64;

/// Normalize a profile id for file system usage
pub fn normalize_profile_id(id: &str) -> String {
    let normalized: String = id
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = normalized.trim_matches('_');
    if trimmed.is_empty() {
        crate::types::response::DEFAULT_PROFILE_ID.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Turn free text (a name, a role) into a file-name token: whitespace becomes `_`,
/// anything else that is not alphanumeric is dropped. Capped at `MAX_TOKEN_BYTES`.
pub fn filename_token(input: &str) -> String {
    let token = input
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '-')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    let token = truncate_bytes(&token, MAX_TOKEN_BYTES).trim_end_matches('_');
    if token.is_empty() {
        "untitled".to_string()
    } else {
        token.to_string()
    }
}

/// Longest prefix of `text` that fits in `max_bytes`, cut on a char boundary.
fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Millisecond timestamp plus a short random suffix, so two artifacts created in
/// the same millisecond still get different names.
pub fn artifact_stamp(now: DateTime<Utc>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", now.timestamp_millis(), &suffix[..8])
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

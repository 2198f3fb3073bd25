//! Internal helpers for input validation and id conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! normalization and mapping logic so the engine enforces consistent
//! invariants.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Normalizes a required user-supplied name: NFC form, trimmed, inner
/// whitespace runs collapsed, bounded length.
pub(crate) fn normalize_name(value: &str, label: &str, max_len: usize) -> ResultEngine<String> {
    let normalized: String = value.nfc().collect::<String>();
    let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} name must not be empty"
        )));
    }
    if collapsed.chars().count() > max_len {
        return Err(EngineError::InvalidAmount(format!(
            "{label} name must be at most {max_len} characters"
        )));
    }
    Ok(collapsed)
}

/// Normalizes optional free text (notes, descriptions): trimmed, empty
/// collapsed to `None`, bounded length.
pub(crate) fn normalize_optional_text(
    value: Option<&str>,
    label: &str,
    max_len: usize,
) -> ResultEngine<Option<String>> {
    let Some(text) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if text.chars().count() > max_len {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must be at most {max_len} characters"
        )));
    }
    Ok(Some(text.to_string()))
}

/// Parse a UUID from a caller-supplied or stored id.
///
/// Malformed ids behave like absent records so the API surface never has to
/// distinguish "bad id" from "no such id".
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::NotFound(format!("{label} not exists")))
}

//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::KeyNotFound(format!("invalid {label} id")))
}

/// Trim a required free-text field, rejecting blanks.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional free-text field, mapping blanks to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_text_is_rejected() {
        assert_eq!(
            normalize_required_text("   ", "rejection reason"),
            Err(EngineError::Validation(
                "rejection reason must not be empty".to_string()
            ))
        );
        assert_eq!(
            normalize_required_text(" missing receipt ", "rejection reason").unwrap(),
            "missing receipt"
        );
    }

    #[test]
    fn blank_optional_text_is_none() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(normalize_optional_text(Some(" hi ")), Some("hi".to_string()));
    }
}

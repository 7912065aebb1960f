//! Validation helpers for DTOs.

use validator::{ValidationError, ValidationErrors};

/// Validates that a text field contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Largest agreement delta a single request may add.
pub const MAX_SORENA_DELTA: i64 = 1_000_000;

/// Validates that an agreement delta lies in `1..=MAX_SORENA_DELTA`.
pub fn validate_positive_count(count: i64) -> Result<(), ValidationError> {
    if !(1..=MAX_SORENA_DELTA).contains(&count) {
        let mut err = ValidationError::new("count_range");
        err.message = Some(
            format!("count must be between 1 and {MAX_SORENA_DELTA} (got {count})").into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Collect field errors into the shape `Validate::validate` returns.
pub(crate) fn collect(
    checks: impl IntoIterator<Item = (&'static str, Result<(), ValidationError>)>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for (field, check) in checks {
        if let Err(e) = check {
            errors.add(field, e);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

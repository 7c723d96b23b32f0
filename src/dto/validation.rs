//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::scoring::DICE_COUNT;

/// Validates that a die index addresses one of the five dice.
pub fn validate_die_index(index: usize) -> Result<(), ValidationError> {
    if index >= DICE_COUNT {
        let mut err = ValidationError::new("die_index_range");
        err.message = Some(
            format!(
                "Die index must be between 0 and {} (got {index})",
                DICE_COUNT - 1
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a username holds at least one visible character.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        let mut err = ValidationError::new("username_blank");
        err.message = Some("Username must not be blank".into());
        return Err(err);
    }

    Ok(())
}

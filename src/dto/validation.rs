//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that the warning fires strictly inside the cycle.
///
/// # Examples
///
/// ```ignore
/// validate_warning_window(120, 5)   // Ok
/// validate_warning_window(30, 30)   // Err - warning at cycle start
/// ```
pub fn validate_warning_window(cycle_length: u64, warning_time: u64) -> Result<(), ValidationError> {
    if warning_time >= cycle_length {
        let mut err = ValidationError::new("warning_window");
        err.message = Some(
            format!(
                "warning_time ({warning_time}s) must be shorter than cycle_length ({cycle_length}s)"
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a display name contains something other than whitespace.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("blank_name");
        err.message = Some("name must not be blank".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_warning_window_valid() {
        assert!(validate_warning_window(120, 5).is_ok());
        assert!(validate_warning_window(30, 0).is_ok());
        assert!(validate_warning_window(30, 29).is_ok());
    }

    #[test]
    fn test_validate_warning_window_invalid() {
        assert!(validate_warning_window(30, 30).is_err());
        assert!(validate_warning_window(30, 45).is_err());
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("team snake").is_ok());
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name(" \t ").is_err());
    }
}

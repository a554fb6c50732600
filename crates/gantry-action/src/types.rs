//! Action naming rules.

use crate::error::ActionError;

/// Check that `name` can name an action.
///
/// Names start with an ASCII letter and contain only ASCII letters, digits,
/// and underscores. They double as directory and file names, so anything
/// resembling a path is rejected.
pub fn validate_action_name(name: &str) -> Result<(), ActionError> {
    let mut chars = name.chars();
    match chars.next() {
        None => {
            return Err(ActionError::InvalidName(
                "action name cannot be empty".to_string(),
            ))
        }
        Some(first) if !first.is_ascii_alphabetic() => {
            return Err(ActionError::InvalidName(format!(
                "{}: must start with a letter",
                name
            )))
        }
        Some(_) => {}
    }
    if chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
        return Err(ActionError::InvalidName(format!(
            "{}: only letters, digits, and underscores are allowed",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["echo", "a", "send_mail", "Report2"] {
            assert!(validate_action_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "1st", "_hidden", "../etc", "a/b", "with space", "dash-ed", "é"] {
            let err = validate_action_name(name).unwrap_err();
            assert!(matches!(err, ActionError::InvalidName(_)), "{name}");
        }
    }
}

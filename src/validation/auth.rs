use std::collections::BTreeMap;

use crate::error::{AppError, Result};

/// Checks the login payload: both fields are required and must not be
/// blank.
///
/// # Arguments
///
/// * `username` - The submitted username.
/// * `password` - The submitted password.
///
/// # Returns
///
/// A `Result<()>`; on failure, a `Validation` error carrying one message
/// per offending field.
pub fn validate_login(username: &str, password: &str) -> Result<()> {
    let mut field_errors = BTreeMap::new();

    if username.trim().is_empty() {
        field_errors.insert("username".to_string(), "must not be blank".to_string());
    }
    if password.trim().is_empty() {
        field_errors.insert("password".to_string(), "must not be blank".to_string());
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(field_errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_payload_passes() {
        assert!(validate_login("alice", "hunter2hunter2").is_ok());
    }

    #[test]
    fn blank_fields_are_each_reported() {
        let err = validate_login("  ", "").expect_err("both fields are blank");
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields["username"], "must not be blank");
                assert_eq!(fields["password"], "must not be blank");
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn a_single_blank_field_is_reported_alone() {
        let err = validate_login("alice", "   ").expect_err("password is blank");
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert!(fields.contains_key("password"));
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }
}

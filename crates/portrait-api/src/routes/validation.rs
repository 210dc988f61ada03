//! Input validation

use crate::error::ApiError;

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed email length
const MAX_EMAIL_LENGTH: usize = 254;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 6;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

/// Extensions accepted for photo uploads
pub const ALLOWED_PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Accumulates field errors so a request reports all of them at once
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, result: Result<(), String>) {
        if let Err(e) = result {
            self.0.push(e);
        }
    }

    /// Require a field to be present, returning its value when it is
    pub fn require<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        match value.as_deref() {
            Some(v) if !v.trim().is_empty() => Some(v),
            _ => {
                self.0.push(format!("{} is required", field));
                None
            }
        }
    }

    pub fn push(&mut self, error: impl Into<String>) {
        self.0.push(error.into());
    }

    /// Turn collected errors into a 422 with `message`
    pub fn finish(self, message: &str) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(message, self.0))
        }
    }
}

/// Validate username format and length
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("username cannot be empty".to_string());
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        ));
    }
    // Only allow alphanumeric characters, underscores, and hyphens
    if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(
            "username can only contain alphanumeric characters, underscores, and hyphens"
                .to_string(),
        );
    }
    Ok(())
}

/// Validate that a string looks like an email address
///
/// Exactly one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(format!(
            "email exceeds maximum length of {} characters",
            MAX_EMAIL_LENGTH
        ));
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err("email is not a valid email address".to_string());
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(format!(
            "password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Extension of an uploaded file, lower-cased, if it is an accepted image type
pub fn photo_extension(file_name: &str) -> Result<String, String> {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
        .ok_or_else(|| format!("file '{}' has no extension", file_name))?;

    if !ALLOWED_PHOTO_EXTENSIONS.contains(&ext.as_str()) {
        return Err(format!(
            "file type '{}' is not allowed; expected one of {}",
            ext,
            ALLOWED_PHOTO_EXTENSIONS.join(", ")
        ));
    }
    Ok(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user+tag@example.com").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@example").is_err());
        assert!(validate_email("a@b@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(257)).is_err());
    }

    #[test]
    fn test_photo_extension() {
        assert_eq!(photo_extension("me.PNG").unwrap(), "png");
        assert_eq!(photo_extension("holiday.photo.jpeg").unwrap(), "jpeg");
        assert!(photo_extension("noext").is_err());
        assert!(photo_extension("script.sh").is_err());
        assert!(photo_extension("trailing.").is_err());
    }

    #[test]
    fn test_field_errors_collects_all() {
        let mut errors = FieldErrors::new();
        assert!(errors.require("username", &None).is_none());
        assert_eq!(errors.require("email", &Some("a@b.co".into())), Some("a@b.co"));
        errors.check(validate_password("x"));

        match errors.finish("failed") {
            Err(ApiError::Validation { errors, .. }) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use super::form::{merge_validation_errors, FieldErrors};

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller, decoded from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterUserRequest {
    #[validate(length(
        min = 1,
        max = 150,
        message = "Ensure this value has at most 150 characters."
    ))]
    pub username: String,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(length(
        min = 8,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    pub password: String,
}

impl RegisterUserRequest {
    /// Trims the text fields and checks every constraint, collecting all
    /// messages per field.
    pub fn clean(mut self) -> Result<Self, FieldErrors> {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();

        let mut errors = FieldErrors::new();
        if let Err(e) = self.validate() {
            merge_validation_errors(&mut errors, &e);
        }

        if self.username.is_empty() {
            errors.replace("username", "This field is required.");
        } else if !self
            .username
            .chars()
            .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginUserRequest {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterUserRequest {
        RegisterUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn clean_accepts_valid_signup() {
        let cleaned = request("  leo ", "leo@example.com", "long-enough")
            .clean()
            .unwrap();
        assert_eq!(cleaned.username, "leo");
    }

    #[test]
    fn clean_reports_every_bad_field() {
        let errors = request("bad name!", "not-an-email", "short")
            .clean()
            .unwrap_err();
        assert!(errors.get("username").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
    }

    #[test]
    fn blank_username_is_required_once() {
        let errors = request("   ", "leo@example.com", "long-enough")
            .clean()
            .unwrap_err();
        assert_eq!(
            errors.get("username").unwrap(),
            &vec!["This field is required.".to_string()]
        );
    }
}

use serde::{Deserialize, Serialize};

/// A staff member as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// Minimum length accepted for a new password
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The change-password form, checked before anything is sent.
#[derive(Debug, Clone, Default)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// A form field and what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl PasswordChange {
    /// All problems with the form; empty when it can be submitted.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.current_password.is_empty() {
            errors.push(FieldError {
                field: "currentPassword",
                message: "Current password is required",
            });
        }
        if self.new_password.is_empty() {
            errors.push(FieldError {
                field: "newPassword",
                message: "New password is required",
            });
        } else if self.new_password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(FieldError {
                field: "newPassword",
                message: "Password must be at least 8 characters",
            });
        }
        if self.new_password != self.confirm_password {
            errors.push(FieldError {
                field: "confirmPassword",
                message: "Passwords don't match",
            });
        }
        errors
    }
}

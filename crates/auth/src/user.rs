//! User identity model and registration/profile validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::UserId;

/// A registered user.
///
/// Users are never hard-deleted; deactivation flips `is_active` instead.
/// `email_verified` stays false until a verification flow runs and gates the
/// account-profile endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub contact_number: Option<String>,
    pub is_active: bool,
    pub email_verified: bool,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        if self.first_name.is_empty() && self.last_name.is_empty() {
            return self.username.clone();
        }
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A field-level validation failure, keyed the way the API reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Registration payload, validated before any user row is created.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
}

impl Registration {
    /// Validate shape rules; uniqueness is checked against the store by the
    /// caller. All failures are collected, not first-failure-only.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') || email.starts_with('@') {
            errors.push(FieldError::new("email", "invalid email format"));
        }

        if self.password.chars().count() < 8 {
            errors.push(FieldError::new(
                "password",
                "password must be at least 8 characters",
            ));
        } else if self.password.chars().all(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new(
                "password",
                "password cannot be entirely numeric",
            ));
        }

        if self.first_name.trim().is_empty() {
            errors.push(FieldError::new("first_name", "first name cannot be empty"));
        }
        if self.last_name.trim().is_empty() {
            errors.push(FieldError::new("last_name", "last name cannot be empty"));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Username is derived from the email local part.
    pub fn derived_username(&self) -> String {
        self.email
            .trim()
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// Partial profile update; `None` fields (and empty strings) are left
/// untouched so a sparse payload cannot blank out existing values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub contact_number: Option<String>,
}

impl UserUpdate {
    pub fn apply_to(&self, user: &mut User) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                if !v.is_empty() {
                    *target = v.clone();
                }
            }
        }
        fn set_opt(target: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value {
                if !v.is_empty() {
                    *target = Some(v.clone());
                }
            }
        }

        set(&mut user.email, &self.email);
        set(&mut user.username, &self.username);
        set(&mut user.first_name, &self.first_name);
        set(&mut user.last_name, &self.last_name);
        set_opt(&mut user.bio, &self.bio);
        set_opt(&mut user.contact_number, &self.contact_number);
    }
}

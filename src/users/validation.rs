use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::model::User;

pub const NAME_MAX_CHARS: usize = 30;
pub const PASSWORD_MIN_CHARS: usize = 6;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub code: &'static str,
    pub message: String,
}

/// Every violation found on a record, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, code: &'static str, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field,
            code,
            message: message.into(),
        });
    }

    pub(crate) fn duplicate_email() -> Self {
        let mut errors = Self::new();
        errors.add("email", "unique", "This email is already registered");
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn has(&self, field: &str, code: &str) -> bool {
        self.0.iter().any(|v| v.field == field && v.code == code)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.field, v.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trimmed, lower-cased form under which emails are stored and looked up.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Checks the record against the schema constraints.
///
/// The password is only inspected while it holds pending plaintext; a stored
/// hash has already passed this check. Email uniqueness is left to the store.
pub fn validate_user(user: &User) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if is_blank(&user.name) {
        errors.add("name", "required", "Please enter your name");
    } else if user.name.chars().count() > NAME_MAX_CHARS {
        errors.add(
            "name",
            "max_length",
            format!("Your name cannot exceed {NAME_MAX_CHARS} characters"),
        );
    }

    if is_blank(&user.email) {
        errors.add("email", "required", "Please enter your email");
    } else if !is_valid_email(&user.email) {
        errors.add("email", "email", "Please enter a valid email address");
    }

    match user.password.as_deref() {
        None if user.is_new() => errors.add("password", "required", "Please enter a password"),
        Some(plain) if user.is_password_modified() => {
            if plain.is_empty() {
                errors.add("password", "required", "Please enter a password");
            } else if plain.chars().count() < PASSWORD_MIN_CHARS {
                errors.add(
                    "password",
                    "min_length",
                    format!("Your password must be at least {PASSWORD_MIN_CHARS} characters"),
                );
            }
        }
        _ => {}
    }

    if is_blank(&user.avatar.public_id) {
        errors.add("avatar.public_id", "required", "Avatar public id is required");
    }
    if is_blank(&user.avatar.url) {
        errors.add("avatar.url", "required", "Avatar url is required");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

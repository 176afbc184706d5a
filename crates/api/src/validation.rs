//! Request-body field validation.
//!
//! Request DTOs derive [`validator::Validate`]; this module holds the custom
//! field checks they reference and turns `ValidationErrors` into the
//! `{ field, message }` list returned to clients.

use lodge_core::error::{CoreError, FieldError};
use validator::{ValidationError, ValidationErrors};

use crate::auth::password::has_required_character_classes;
use crate::error::AppError;

/// Phone numbers: optional leading `+`, then 10 to 15 digits, spaces,
/// hyphens, or parentheses.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let rest = value.trim();
    let rest = rest.strip_prefix('+').unwrap_or(rest);
    let len = rest.chars().count();
    let allowed = rest
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
    if allowed && (10..=15).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::new("phone"))
    }
}

/// Usernames: ASCII letters, digits, and underscores only.
pub fn validate_username_chars(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(ValidationError::new("username_chars"))
    }
}

/// Passwords must mix lowercase, uppercase, and a digit.
pub fn validate_password_classes(value: &str) -> Result<(), ValidationError> {
    if has_required_character_classes(value) {
        Ok(())
    } else {
        Err(ValidationError::new("password_classes"))
    }
}

/// Role names accepted on user create/update, any case.
pub fn validate_role_name(value: &str) -> Result<(), ValidationError> {
    if value.eq_ignore_ascii_case("admin") || value.eq_ignore_ascii_case("staff") {
        Ok(())
    } else {
        Err(ValidationError::new("role"))
    }
}

/// Flatten `ValidationErrors` into field errors, prefixing each field name
/// (`"guestInfo"` turns `email` into `guestInfo.email`). Output is sorted by
/// field for stable responses.
pub fn field_errors(errors: &ValidationErrors, prefix: Option<&str>) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, list)| {
            let name = match prefix {
                Some(p) => format!("{p}.{}", to_camel_case(&field.to_string())),
                None => to_camel_case(&field.to_string()),
            };
            list.iter()
                .map(move |e| FieldError::new(name.clone(), error_message(e)))
                .collect::<Vec<_>>()
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn error_message(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("Invalid value ({})", error.code),
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Core(CoreError::InvalidFields(field_errors(&errors, None)))
    }
}

//! Contact domain model.
//!
//! # Responsibility
//! - Define the persisted contact record shared by list/detail/edit views.
//! - Own the phone-number rule applied before every write.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused for another contact.
//! - `phone_number` is exactly ten ASCII digits at write time. Rows already
//!   on disk are not re-validated when read back.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static PHONE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid phone number regex"));

/// Storage-assigned contact identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ContactId = i64;

/// Persisted contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Auto-generated by storage on insert.
    pub id: ContactId,
    pub name: String,
    /// Serialized as `phoneNumber` to match external schema naming.
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
}

impl Contact {
    /// Builds a record for an already-persisted contact.
    pub fn new(id: ContactId, name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            phone_number: phone_number.into(),
        }
    }

    /// Returns a copy with replaced fields and the same stable `id`.
    pub fn with_fields(&self, name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self::new(self.id, name, phone_number)
    }

    /// Checks the write-time field rules.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        validate_contact_fields(&self.name, &self.phone_number)
    }
}

/// Validation failures for contact writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    BlankName,
    BlankPhoneNumber,
    /// Carries the rejected (trimmed) input so the UI can keep it for editing.
    InvalidPhoneNumber(String),
}

impl ContactValidationError {
    /// Short user-facing notice text.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BlankName => "Name must not be empty.",
            Self::BlankPhoneNumber => "Phone number must not be empty.",
            Self::InvalidPhoneNumber(_) => "Phone number must be exactly 10 digits!",
        }
    }
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "contact name must not be blank"),
            Self::BlankPhoneNumber => write!(f, "contact phone number must not be blank"),
            Self::InvalidPhoneNumber(value) => write!(
                f,
                "phone number must be exactly 10 digits, got {} chars",
                value.chars().count()
            ),
        }
    }
}

impl Error for ContactValidationError {}

/// Returns whether `value` is exactly ten ASCII digits.
pub fn is_valid_phone_number(value: &str) -> bool {
    PHONE_NUMBER_RE.is_match(value)
}

/// Validates name/phone as they would be written to storage.
///
/// Inputs are checked as given; callers trim before calling when the value
/// comes from a text field.
pub fn validate_contact_fields(
    name: &str,
    phone_number: &str,
) -> Result<(), ContactValidationError> {
    if name.trim().is_empty() {
        return Err(ContactValidationError::BlankName);
    }
    if phone_number.trim().is_empty() {
        return Err(ContactValidationError::BlankPhoneNumber);
    }
    if !is_valid_phone_number(phone_number) {
        return Err(ContactValidationError::InvalidPhoneNumber(
            phone_number.to_string(),
        ));
    }
    Ok(())
}

//! Phone number type used on customer profiles.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Digits, spaces, dashes and parentheses with an optional leading `+`.
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9\s\-()]{7,20}$").expect("phone number pattern is a valid regex")
});

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    #[error("phone number is required")]
    Empty,
    #[error("phone number is invalid")]
    Invalid,
}

/// A loosely validated phone number.
///
/// The shop only needs something a human can dial when arranging pickup, so
/// the check is shape-only: 7 to 20 characters of digits and punctuation.
///
/// ```
/// use sweets_core::PhoneNumber;
///
/// assert!(PhoneNumber::parse("+1 (555) 010-2030").is_ok());
/// assert!(PhoneNumber::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a phone number, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `PhoneNumberError::Empty` for blank input and
    /// `PhoneNumberError::Invalid` when the shape check fails.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }
        if !PHONE_PATTERN.is_match(s) {
            return Err(PhoneNumberError::Invalid);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

//! Customer profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sweets_core::{Email, PhoneNumber, UserId};

use super::ValidationErrors;

/// The stored record for an authenticated identity.
///
/// Contact fields are optional because a profile is created at registration
/// with only the email filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub full_name: Option<String>,
    pub email: Option<Email>,
    pub home_address: Option<String>,
    pub phone_number: Option<PhoneNumber>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile edit as submitted by the customer.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub home_address: String,
    #[serde(default)]
    pub phone_number: String,
}

/// Validated profile edit. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub email: Email,
    pub home_address: String,
    pub phone_number: PhoneNumber,
}

impl ProfileForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns every failed field rule.
    pub fn validate(self) -> Result<ProfileUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let full_name = self.full_name.trim().to_owned();
        if full_name.is_empty() {
            errors.add("full_name", "Name is required.");
        }

        let email = if self.email.trim().is_empty() {
            errors.add("email", "Email is required.");
            None
        } else {
            Email::parse(&self.email)
                .inspect_err(|_| errors.add("email", "Email is invalid."))
                .ok()
        };

        let home_address = self.home_address.trim().to_owned();
        if home_address.is_empty() {
            errors.add("home_address", "Home address is required.");
        }

        let phone_number = PhoneNumber::parse(&self.phone_number)
            .inspect_err(|e| {
                let message = match e {
                    sweets_core::PhoneNumberError::Empty => "Phone number is required.",
                    sweets_core::PhoneNumberError::Invalid => "Phone number is invalid.",
                };
                errors.add("phone_number", message);
            })
            .ok();

        match (email, phone_number) {
            (Some(email), Some(phone_number)) if errors.is_empty() => Ok(ProfileUpdate {
                full_name,
                email,
                home_address,
                phone_number,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(full_name: &str, email: &str, address: &str, phone: &str) -> ProfileForm {
        ProfileForm {
            full_name: full_name.to_owned(),
            email: email.to_owned(),
            home_address: address.to_owned(),
            phone_number: phone.to_owned(),
        }
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let update = form(" Dani ", "dani@sweets.com", " 12 Baker St ", "555-010-2030")
            .validate()
            .unwrap();
        assert_eq!(update.full_name, "Dani");
        assert_eq!(update.home_address, "12 Baker St");
        assert_eq!(update.phone_number.as_str(), "555-010-2030");
    }

    #[test]
    fn test_blank_form_reports_required_fields() {
        let errors = form("", "", "", "").validate().unwrap_err();
        let messages: Vec<_> = errors.fields().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Name is required.",
                "Email is required.",
                "Home address is required.",
                "Phone number is required.",
            ]
        );
    }

    #[test]
    fn test_invalid_email_and_phone() {
        let errors = form("Dani", "dani-at-sweets", "12 Baker St", "call me")
            .validate()
            .unwrap_err();
        assert!(errors.has("email"));
        assert!(errors.has("phone_number"));
        assert!(!errors.has("full_name"));
    }
}

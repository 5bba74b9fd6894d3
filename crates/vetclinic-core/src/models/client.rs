//! Client (pet owner) models.

use serde::{Deserialize, Serialize};

use super::validation::{check_email, max_len, optional_text, require_text, ValidationResult};

/// A pet owner. Deactivated rather than deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: i64,
    pub given_name: String,
    pub family_name: String,
    /// National identity document number, unique when present
    pub national_id: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub active: bool,
}

impl Client {
    /// "Given Family".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }

    /// "Family, Given" as used in sorted listings.
    pub fn sort_name(&self) -> String {
        format!("{}, {}", self.family_name, self.given_name)
    }
}

/// Fields for registering or updating a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewClient {
    pub given_name: String,
    pub family_name: String,
    pub national_id: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl NewClient {
    pub fn new(
        given_name: impl Into<String>,
        family_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
            phone: phone.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ValidationResult<Client> {
        let given_name = require_text("given_name", &self.given_name)?;
        max_len("given_name", &given_name, 100)?;
        let family_name = require_text("family_name", &self.family_name)?;
        max_len("family_name", &family_name, 100)?;
        let phone = require_text("phone", &self.phone)?;
        max_len("phone", &phone, 20)?;

        let national_id = optional_text(self.national_id.as_deref());
        if let Some(id) = &national_id {
            max_len("national_id", id, 20)?;
        }
        let email = optional_text(self.email.as_deref()).map(|e| e.to_lowercase());
        if let Some(email) = &email {
            max_len("email", email, 150)?;
            check_email("email", email)?;
        }

        Ok(Client {
            id: 0,
            given_name,
            family_name,
            national_id,
            phone,
            email,
            address: optional_text(self.address.as_deref()),
            active: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationError;

    #[test]
    fn test_full_name() {
        let client = NewClient::new("Ana", "Gomez", "555-0100").validate().unwrap();
        assert_eq!(client.full_name(), "Ana Gomez");
        assert_eq!(client.sort_name(), "Gomez, Ana");
        assert!(client.active);
    }

    #[test]
    fn test_phone_required() {
        let err = NewClient::new("Ana", "Gomez", "").validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingField("phone"));
    }

    #[test]
    fn test_blank_optionals_become_none() {
        let mut input = NewClient::new("Ana", "Gomez", "555-0100");
        input.national_id = Some("  ".into());
        input.email = Some("".into());
        let client = input.validate().unwrap();
        assert_eq!(client.national_id, None);
        assert_eq!(client.email, None);
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut input = NewClient::new("Ana", "Gomez", "555-0100");
        input.email = Some("not-an-email".into());
        assert!(matches!(
            input.validate(),
            Err(ValidationError::Invalid { field: "email", .. })
        ));
    }
}

//! Staff member models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    check_email, max_len, now_utc, optional_text, require_text, ValidationError, ValidationResult,
};

/// Role of a staff member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Admin,
    Veterinarian,
    #[default]
    Receptionist,
}

impl StaffRole {
    pub const ALL: [StaffRole; 3] = [
        StaffRole::Admin,
        StaffRole::Veterinarian,
        StaffRole::Receptionist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Veterinarian => "veterinarian",
            StaffRole::Receptionist => "receptionist",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StaffRole::Admin => "Administrator",
            StaffRole::Veterinarian => "Veterinarian",
            StaffRole::Receptionist => "Receptionist",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(StaffRole::Admin),
            "veterinarian" => Ok(StaffRole::Veterinarian),
            "receptionist" => Ok(StaffRole::Receptionist),
            other => Err(ValidationError::UnknownValue {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// A system user. Credentials live with the identity collaborator, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffMember {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: StaffRole,
    pub active: bool,
    pub joined_at: DateTime<Utc>,
}

impl StaffMember {
    pub fn full_name(&self) -> &str {
        &self.name
    }

    /// First word of the name.
    pub fn short_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    pub fn is_veterinarian(&self) -> bool {
        self.role == StaffRole::Veterinarian
    }

    /// The identity slice the access policy works with.
    pub fn context(&self) -> StaffContext {
        StaffContext {
            id: self.id,
            role: self.role,
            active: self.active,
        }
    }
}

/// Identity of the caller, supplied by the auth collaborator on every call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffContext {
    pub id: i64,
    pub role: StaffRole,
    pub active: bool,
}

/// Fields for registering or updating a staff member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewStaffMember {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: StaffRole,
}

impl NewStaffMember {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: StaffRole) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            role,
        }
    }

    /// Validate and normalize into a record ready for insertion.
    pub fn validate(&self) -> ValidationResult<StaffMember> {
        let name = require_text("name", &self.name)?;
        max_len("name", &name, 100)?;
        let email = require_text("email", &self.email)?.to_lowercase();
        max_len("email", &email, 150)?;
        check_email("email", &email)?;
        let phone = optional_text(self.phone.as_deref());
        if let Some(phone) = &phone {
            max_len("phone", phone, 20)?;
        }

        Ok(StaffMember {
            id: 0,
            name,
            email,
            phone,
            role: self.role,
            active: true,
            joined_at: now_utc(),
        })
    }
}

//! Pet (patient) models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    check_positive, check_stored_date, max_len, now_utc, optional_text, require_text, ValidationError,
    ValidationResult,
};

/// Species of a pet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Dog,
    Cat,
    Bird,
    Rodent,
    Reptile,
    Other,
}

impl Species {
    pub const ALL: [Species; 6] = [
        Species::Dog,
        Species::Cat,
        Species::Bird,
        Species::Rodent,
        Species::Reptile,
        Species::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Bird => "bird",
            Species::Rodent => "rodent",
            Species::Reptile => "reptile",
            Species::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Species::Dog => "Dog",
            Species::Cat => "Cat",
            Species::Bird => "Bird",
            Species::Rodent => "Rodent",
            Species::Reptile => "Reptile",
            Species::Other => "Other",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::ALL
            .into_iter()
            .find(|species| species.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "species",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

impl FromStr for Sex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(ValidationError::UnknownValue {
                field: "sex",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle status of a pet record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PetStatus {
    #[default]
    Active,
    Deceased,
    Transferred,
}

impl PetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetStatus::Active => "active",
            PetStatus::Deceased => "deceased",
            PetStatus::Transferred => "transferred",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PetStatus::Active => "Active",
            PetStatus::Deceased => "Deceased",
            PetStatus::Transferred => "Transferred",
        }
    }
}

impl FromStr for PetStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PetStatus::Active),
            "deceased" => Ok(PetStatus::Deceased),
            "transferred" => Ok(PetStatus::Transferred),
            other => Err(ValidationError::UnknownValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// An animal patient owned by exactly one client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    pub id: i64,
    pub client_id: i64,
    pub name: String,
    pub species: Species,
    pub breed: Option<String>,
    pub sex: Sex,
    pub birth_date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub color: Option<String>,
    pub photo_url: Option<String>,
    pub status: PetStatus,
    pub allergies: Option<String>,
    pub notes: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl Pet {
    /// Approximate age in whole years as of `today`.
    ///
    /// Only the month is compared, not the day, so a pet born later in the
    /// current month already counts the new year.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.birth_date.map(|born| approximate_age(born, today))
    }

    /// Age as of the current UTC date.
    pub fn age(&self) -> Option<u32> {
        self.age_on(Utc::now().date_naive())
    }

    pub fn is_active(&self) -> bool {
        self.status == PetStatus::Active
    }
}

/// Year difference minus one if the birth month has not been reached yet.
/// Birth dates after `today` clamp to zero.
pub fn approximate_age(born: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - born.year();
    if today.month() < born.month() {
        years -= 1;
    }
    years.max(0) as u32
}

/// Fields for registering or updating a pet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPet {
    pub client_id: i64,
    pub name: String,
    pub species: Species,
    pub breed: Option<String>,
    pub sex: Sex,
    pub birth_date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub color: Option<String>,
    pub photo_url: Option<String>,
    pub status: PetStatus,
    pub allergies: Option<String>,
    pub notes: Option<String>,
}

impl NewPet {
    pub fn new(client_id: i64, name: impl Into<String>, species: Species, sex: Sex) -> Self {
        Self {
            client_id,
            name: name.into(),
            species,
            breed: None,
            sex,
            birth_date: None,
            weight_kg: None,
            color: None,
            photo_url: None,
            status: PetStatus::Active,
            allergies: None,
            notes: None,
        }
    }

    /// Field-level checks only; the owner is checked against the store.
    pub fn validate(&self) -> ValidationResult<Pet> {
        let name = require_text("name", &self.name)?;
        max_len("name", &name, 100)?;
        check_positive("weight_kg", self.weight_kg)?;
        if let Some(born) = self.birth_date {
            check_stored_date("birth_date", born)?;
        }
        let breed = optional_text(self.breed.as_deref());
        if let Some(breed) = &breed {
            max_len("breed", breed, 100)?;
        }
        let color = optional_text(self.color.as_deref());
        if let Some(color) = &color {
            max_len("color", color, 50)?;
        }
        let photo_url = optional_text(self.photo_url.as_deref());
        if let Some(url) = &photo_url {
            max_len("photo_url", url, 255)?;
        }

        Ok(Pet {
            id: 0,
            client_id: self.client_id,
            name,
            species: self.species,
            breed,
            sex: self.sex,
            birth_date: self.birth_date,
            weight_kg: self.weight_kg,
            color,
            photo_url,
            status: self.status,
            allergies: optional_text(self.allergies.as_deref()),
            notes: optional_text(self.notes.as_deref()),
            registered_at: now_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pet_born(born: Option<NaiveDate>) -> Pet {
        let mut input = NewPet::new(1, "Rex", Species::Dog, Sex::Male);
        input.birth_date = born;
        input.validate().unwrap()
    }

    #[test]
    fn test_age_before_birth_month() {
        let pet = pet_born(Some(date(2020, 8, 15)));
        assert_eq!(pet.age_on(date(2024, 6, 1)), Some(3));
    }

    #[test]
    fn test_age_in_birth_month_ignores_day() {
        let pet = pet_born(Some(date(2020, 6, 30)));
        assert_eq!(pet.age_on(date(2024, 6, 1)), Some(4));
    }

    #[test]
    fn test_age_without_birth_date() {
        assert_eq!(pet_born(None).age_on(date(2024, 6, 1)), None);
    }

    #[test]
    fn test_future_birth_date_clamps_to_zero() {
        let pet = pet_born(Some(date(2025, 1, 1)));
        assert_eq!(pet.age_on(date(2024, 6, 1)), Some(0));
    }

    #[test]
    fn test_species_parse() {
        assert_eq!("cat".parse::<Species>().unwrap(), Species::Cat);
        assert!(matches!(
            "dragon".parse::<Species>(),
            Err(ValidationError::UnknownValue { field: "species", .. })
        ));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("transferred".parse::<PetStatus>().unwrap(), PetStatus::Transferred);
        assert!("lost".parse::<PetStatus>().is_err());
        assert!("neutral".parse::<Sex>().is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut input = NewPet::new(1, "Rex", Species::Dog, Sex::Male);
        input.weight_kg = Some(-2.0);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_birth_date_past_storage_rejected() {
        let mut input = NewPet::new(1, "Rex", Species::Dog, Sex::Male);
        input.birth_date = Some(date(10000, 1, 1));
        assert!(matches!(
            input.validate(),
            Err(ValidationError::Invalid { field: "birth_date", .. })
        ));
    }

    #[test]
    fn test_species_serializes_snake_case() {
        let json = serde_json::to_string(&Species::Reptile).unwrap();
        assert_eq!(json, "\"reptile\"");
    }
}

//! Vaccination models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    check_stored_date, max_len, now_utc, optional_text, require_text, ValidationError,
    ValidationResult,
};

/// An administered vaccine dose and when the next one is due.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vaccination {
    pub id: i64,
    pub pet_id: i64,
    pub vaccine_name: String,
    pub applied_on: NaiveDate,
    pub next_dose_on: Option<NaiveDate>,
    /// Nulled when the staff member is removed
    pub veterinarian_id: Option<i64>,
    pub notes: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl Vaccination {
    /// The next dose date has passed. False when no next dose is scheduled.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.next_dose_on.is_some_and(|next| next < today)
    }

    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Utc::now().date_naive())
    }

    /// Days from `today` to the next dose; negative once overdue.
    pub fn days_until_next_dose(&self, today: NaiveDate) -> Option<i64> {
        self.next_dose_on.map(|next| (next - today).num_days())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewVaccination {
    pub pet_id: i64,
    pub vaccine_name: String,
    pub applied_on: NaiveDate,
    pub next_dose_on: Option<NaiveDate>,
    pub veterinarian_id: Option<i64>,
    pub notes: Option<String>,
}

impl NewVaccination {
    pub fn new(pet_id: i64, vaccine_name: impl Into<String>, applied_on: NaiveDate) -> Self {
        Self {
            pet_id,
            vaccine_name: vaccine_name.into(),
            applied_on,
            next_dose_on: None,
            veterinarian_id: None,
            notes: None,
        }
    }

    pub fn with_next_dose(mut self, next: NaiveDate) -> Self {
        self.next_dose_on = Some(next);
        self
    }

    pub fn validate(&self) -> ValidationResult<Vaccination> {
        let vaccine_name = require_text("vaccine_name", &self.vaccine_name)?;
        max_len("vaccine_name", &vaccine_name, 100)?;
        check_stored_date("applied_on", self.applied_on)?;
        if let Some(next) = self.next_dose_on {
            check_stored_date("next_dose_on", next)?;
            if next < self.applied_on {
                return Err(ValidationError::Invalid {
                    field: "next_dose_on",
                    reason: format!("{} is before the application date {}", next, self.applied_on),
                });
            }
        }

        Ok(Vaccination {
            id: 0,
            pet_id: self.pet_id,
            vaccine_name,
            applied_on: self.applied_on,
            next_dose_on: self.next_dose_on,
            veterinarian_id: self.veterinarian_id,
            notes: optional_text(self.notes.as_deref()),
            registered_at: now_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overdue_when_next_dose_yesterday() {
        let today = Utc::now().date_naive();
        let yesterday = today - Duration::days(1);
        let vaccination = NewVaccination::new(1, "Rabies", today - Duration::days(365))
            .with_next_dose(yesterday)
            .validate()
            .unwrap();
        assert!(vaccination.is_overdue());
        assert_eq!(vaccination.days_until_next_dose(today), Some(-1));
    }

    #[test]
    fn test_not_overdue_without_next_dose() {
        let vaccination = NewVaccination::new(1, "Rabies", date(2024, 1, 1))
            .validate()
            .unwrap();
        assert!(!vaccination.is_overdue());
        assert_eq!(vaccination.days_until_next_dose(date(2024, 6, 1)), None);
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let vaccination = NewVaccination::new(1, "Parvovirus", date(2024, 1, 1))
            .with_next_dose(date(2024, 6, 1))
            .validate()
            .unwrap();
        assert!(!vaccination.is_overdue_on(date(2024, 6, 1)));
        assert!(vaccination.is_overdue_on(date(2024, 6, 2)));
    }

    #[test]
    fn test_next_dose_before_application_rejected() {
        let err = NewVaccination::new(1, "Rabies", date(2024, 6, 1))
            .with_next_dose(date(2024, 5, 1))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "next_dose_on", .. }));
    }

    #[test]
    fn test_dates_past_storage_rejected() {
        let err = NewVaccination::new(1, "Rabies", date(2024, 6, 1))
            .with_next_dose(date(10000, 6, 1))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "next_dose_on", .. }));

        let err = NewVaccination::new(1, "Rabies", date(-5, 6, 1))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "applied_on", .. }));
    }
}

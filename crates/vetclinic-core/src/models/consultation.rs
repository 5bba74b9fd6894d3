//! Consultation (medical record) models.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    check_positive, check_stored_date, check_stored_instant, now_utc, optional_text, require_text,
    ValidationError, ValidationResult,
};

/// The medical record produced during or after an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Consultation {
    pub id: i64,
    pub appointment_id: i64,
    pub pet_id: i64,
    pub veterinarian_id: i64,
    pub consulted_at: DateTime<Utc>,
    pub reason: String,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub weight_kg: Option<f64>,
    /// Body temperature in °C
    pub temperature_c: Option<f64>,
    /// Beats per minute
    pub heart_rate_bpm: Option<u32>,
    pub notes: Option<String>,
    pub next_visit: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Fields for recording a consultation. The veterinarian is the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewConsultation {
    pub appointment_id: i64,
    pub pet_id: i64,
    pub consulted_at: DateTime<Utc>,
    pub reason: String,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub weight_kg: Option<f64>,
    pub temperature_c: Option<f64>,
    pub heart_rate_bpm: Option<u32>,
    pub notes: Option<String>,
    pub next_visit: Option<NaiveDate>,
}

impl NewConsultation {
    pub fn new(
        appointment_id: i64,
        pet_id: i64,
        consulted_at: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            appointment_id,
            pet_id,
            consulted_at,
            reason: reason.into(),
            symptoms: None,
            diagnosis: None,
            treatment: None,
            weight_kg: None,
            temperature_c: None,
            heart_rate_bpm: None,
            notes: None,
            next_visit: None,
        }
    }

    pub fn validate(&self, veterinarian_id: i64) -> ValidationResult<Consultation> {
        let reason = require_text("reason", &self.reason)?;
        check_stored_instant("consulted_at", self.consulted_at)?;
        check_positive("weight_kg", self.weight_kg)?;
        check_positive("temperature_c", self.temperature_c)?;
        if self.heart_rate_bpm == Some(0) {
            return Err(ValidationError::Invalid {
                field: "heart_rate_bpm",
                reason: "must be greater than zero".into(),
            });
        }
        if let Some(next) = self.next_visit {
            check_stored_date("next_visit", next)?;
            if next < self.consulted_at.date_naive() {
                return Err(ValidationError::Invalid {
                    field: "next_visit",
                    reason: format!("{} is before the consultation date", next),
                });
            }
        }

        Ok(Consultation {
            id: 0,
            appointment_id: self.appointment_id,
            pet_id: self.pet_id,
            veterinarian_id,
            consulted_at: self.consulted_at.trunc_subsecs(0),
            reason,
            symptoms: optional_text(self.symptoms.as_deref()),
            diagnosis: optional_text(self.diagnosis.as_deref()),
            treatment: optional_text(self.treatment.as_deref()),
            weight_kg: self.weight_kg,
            temperature_c: self.temperature_c,
            heart_rate_bpm: self.heart_rate_bpm,
            notes: optional_text(self.notes.as_deref()),
            next_visit: self.next_visit,
            created_at: now_utc(),
        })
    }
}

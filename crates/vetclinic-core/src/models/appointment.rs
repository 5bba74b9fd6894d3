//! Appointment models and the status state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    check_stored_instant, max_len, now_utc, optional_text, require_text, ValidationError,
    ValidationResult,
};

/// Default appointment length when the caller gives none.
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// Appointment status.
///
/// ```text
/// pending ──► confirmed ──► in_progress ──► completed
///    │            │
///    └────────────┴──► cancelled
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::InProgress => "In Progress",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether `self -> next` is a legal edge.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, InProgress)
                | (Confirmed, Cancelled)
                | (InProgress, Completed)
        )
    }

    /// Completed and cancelled appointments never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }

    /// Pending or confirmed: still expected to happen.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "status",
                value: s.to_string(),
            })
    }
}

/// A scheduled visit for a pet with a veterinarian.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub pet_id: i64,
    pub veterinarian_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub reason: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub duration_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn ends_at(&self) -> DateTime<Utc> {
        minutes_after(self.scheduled_at, self.duration_minutes)
    }

    /// Whether `[start, start + minutes)` intersects this appointment.
    pub fn overlaps(&self, start: DateTime<Utc>, minutes: u32) -> bool {
        let end = minutes_after(start, minutes);
        self.scheduled_at < end && start < self.ends_at()
    }
}

/// `start + minutes`, saturating at the end of chrono's range.
pub(crate) fn minutes_after(start: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
    start
        .checked_add_signed(Duration::minutes(i64::from(minutes)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Request to schedule an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentRequest {
    pub pet_id: i64,
    pub veterinarian_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub reason: String,
    /// Falls back to the configured default when absent
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

impl AppointmentRequest {
    pub fn new(
        pet_id: i64,
        veterinarian_id: i64,
        scheduled_at: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            pet_id,
            veterinarian_id,
            scheduled_at,
            reason: reason.into(),
            duration_minutes: None,
            notes: None,
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    /// Field-level checks. The past-date rule needs a clock and lives in the scheduler.
    pub fn validate(&self, default_duration: u32) -> ValidationResult<Appointment> {
        let reason = require_text("reason", &self.reason)?;
        max_len("reason", &reason, 255)?;
        check_stored_instant("scheduled_at", self.scheduled_at)?;
        let duration_minutes = self.duration_minutes.unwrap_or(default_duration);
        if duration_minutes == 0 {
            return Err(ValidationError::Invalid {
                field: "duration_minutes",
                reason: "must be at least one minute".into(),
            });
        }

        Ok(Appointment {
            id: 0,
            pet_id: self.pet_id,
            veterinarian_id: self.veterinarian_id,
            scheduled_at: self.scheduled_at.trunc_subsecs(0),
            reason,
            status: AppointmentStatus::Pending,
            notes: optional_text(self.notes.as_deref()),
            duration_minutes,
            created_at: now_utc(),
            cancelled_at: None,
        })
    }
}

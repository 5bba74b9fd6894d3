//! Appointment scheduling rules.
//!
//! Creation and status changes of appointments, plus the look-ahead queries
//! the front desk works from (today, upcoming, due vaccinations).

use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::access::{appointment_scope, AppointmentScope};
use crate::config::ClinicConfig;
use crate::db::{AppointmentFilter, Database, DbError};
use crate::models::{
    latest_stored_date, latest_stored_instant, now_utc, Appointment, AppointmentRequest,
    AppointmentStatus, StaffContext, StaffRole, Vaccination, ValidationError,
    DEFAULT_DURATION_MINUTES,
};

/// Scheduling errors.
#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Appointment time {requested} is in the past (now {now})")]
    PastDate {
        requested: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;

pub struct Scheduler<'a> {
    db: &'a Database,
    default_duration: u32,
}

impl<'a> Scheduler<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            default_duration: DEFAULT_DURATION_MINUTES,
        }
    }

    pub fn with_config(db: &'a Database, config: &ClinicConfig) -> Self {
        Self {
            db,
            default_duration: config.appointment_minutes,
        }
    }

    /// Book an appointment in `pending`, as of the current time.
    pub fn schedule(&self, request: &AppointmentRequest) -> SchedulingResult<Appointment> {
        self.schedule_at(request, now_utc())
    }

    /// Book an appointment in `pending`, judging "the past" against `now`.
    ///
    /// The pet must be active and the veterinarian an active staff member with
    /// the veterinarian role. Overlapping bookings are not rejected; see
    /// [`Scheduler::conflicts`].
    pub fn schedule_at(
        &self,
        request: &AppointmentRequest,
        now: DateTime<Utc>,
    ) -> SchedulingResult<Appointment> {
        let mut appointment = request.validate(self.default_duration)?;
        let now = now.trunc_subsecs(0);
        if appointment.scheduled_at < now {
            warn!(
                pet_id = request.pet_id,
                requested = %appointment.scheduled_at,
                "Rejected appointment in the past"
            );
            return Err(SchedulingError::PastDate {
                requested: appointment.scheduled_at,
                now,
            });
        }

        let tx = self.db.begin()?;

        match self.db.get_pet(request.pet_id)? {
            Some(pet) if pet.is_active() => {}
            _ => return Err(SchedulingError::NotFound(format!("active pet {}", request.pet_id))),
        }
        match self.db.get_staff(request.veterinarian_id)? {
            Some(staff) if staff.active && staff.role == StaffRole::Veterinarian => {}
            Some(staff) if staff.active => {
                return Err(ValidationError::Invalid {
                    field: "veterinarian_id",
                    reason: format!("staff member {} is a {}", staff.id, staff.role.label()),
                }
                .into())
            }
            _ => {
                return Err(SchedulingError::NotFound(format!(
                    "active veterinarian {}",
                    request.veterinarian_id
                )))
            }
        }

        appointment.id = self.db.insert_appointment(&appointment)?;
        tx.commit().map_err(DbError::from)?;

        info!(
            appointment_id = appointment.id,
            pet_id = appointment.pet_id,
            veterinarian_id = appointment.veterinarian_id,
            scheduled_at = %appointment.scheduled_at,
            "Appointment scheduled"
        );
        Ok(appointment)
    }

    /// Move an appointment to `next`, as of the current time.
    pub fn transition(&self, id: i64, next: AppointmentStatus) -> SchedulingResult<Appointment> {
        self.transition_at(id, next, now_utc())
    }

    /// Move an appointment to `next`. Entering `cancelled` stamps the
    /// cancellation time with `now` in the same write.
    pub fn transition_at(
        &self,
        id: i64,
        next: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> SchedulingResult<Appointment> {
        let tx = self.db.begin()?;

        let mut appointment = self
            .db
            .get_appointment(id)?
            .ok_or_else(|| SchedulingError::NotFound(format!("appointment {}", id)))?;

        if !appointment.status.can_transition_to(next) {
            warn!(
                appointment_id = id,
                from = %appointment.status,
                to = %next,
                "Rejected appointment transition"
            );
            return Err(SchedulingError::InvalidTransition {
                from: appointment.status,
                to: next,
            });
        }

        if next == AppointmentStatus::Cancelled {
            appointment.cancelled_at = Some(now.trunc_subsecs(0));
        }
        let previous = appointment.status;
        appointment.status = next;
        self.db
            .update_appointment_status(id, next, appointment.cancelled_at.as_ref())?;
        tx.commit().map_err(DbError::from)?;

        info!(appointment_id = id, from = %previous, to = %next, "Appointment status changed");
        Ok(appointment)
    }

    pub fn appointment(&self, id: i64) -> SchedulingResult<Appointment> {
        self.db
            .get_appointment(id)?
            .ok_or_else(|| SchedulingError::NotFound(format!("appointment {}", id)))
    }

    /// Pending and confirmed appointments from `now` on, soonest first, at most `limit`.
    pub fn upcoming(&self, now: DateTime<Utc>, limit: usize) -> SchedulingResult<Vec<Appointment>> {
        self.upcoming_in_scope(now, limit, AppointmentScope::All)
    }

    /// [`Scheduler::upcoming`] restricted to what `ctx` may see.
    pub fn upcoming_for(
        &self,
        ctx: &StaffContext,
        now: DateTime<Utc>,
        limit: usize,
    ) -> SchedulingResult<Vec<Appointment>> {
        self.upcoming_in_scope(now, limit, appointment_scope(ctx))
    }

    fn upcoming_in_scope(
        &self,
        now: DateTime<Utc>,
        limit: usize,
        scope: AppointmentScope,
    ) -> SchedulingResult<Vec<Appointment>> {
        if now > latest_stored_instant() {
            return Ok(Vec::new());
        }
        let appointments = self
            .db
            .list_upcoming_appointments(&now.trunc_subsecs(0), limit, scope)?;
        debug!(count = appointments.len(), limit, ?scope, "Listed upcoming appointments");
        Ok(appointments)
    }

    /// All appointments on `today`, any status, in time order.
    pub fn todays_appointments(
        &self,
        today: NaiveDate,
        limit: Option<usize>,
    ) -> SchedulingResult<Vec<Appointment>> {
        Ok(self
            .db
            .list_appointments_on(&today, limit, AppointmentScope::All)?)
    }

    pub fn todays_appointments_for(
        &self,
        ctx: &StaffContext,
        today: NaiveDate,
        limit: Option<usize>,
    ) -> SchedulingResult<Vec<Appointment>> {
        Ok(self
            .db
            .list_appointments_on(&today, limit, appointment_scope(ctx))?)
    }

    /// A veterinarian's unfinished appointments overlapping `[start, start + minutes)`.
    ///
    /// Read-only; booking never consults it.
    pub fn conflicts(
        &self,
        veterinarian_id: i64,
        start: DateTime<Utc>,
        minutes: u32,
    ) -> SchedulingResult<Vec<Appointment>> {
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(minutes)))
            .map_or(latest_stored_instant(), |end| end.min(latest_stored_instant()));
        let overlapping: Vec<_> = self
            .db
            .list_unfinished_for_veterinarian(veterinarian_id, &end)?
            .into_iter()
            .filter(|appointment| appointment.overlaps(start, minutes))
            .collect();
        debug!(veterinarian_id, %start, minutes, count = overlapping.len(), "Checked conflicts");
        Ok(overlapping)
    }

    /// Vaccinations with a next dose in `[today, today + window_days]`, soonest first.
    pub fn due_vaccinations(
        &self,
        today: NaiveDate,
        window_days: u32,
    ) -> SchedulingResult<Vec<Vaccination>> {
        let until = due_window_end(today, window_days);
        Ok(self.db.list_due_vaccinations(&today, &until, None)?)
    }

    pub fn list_appointments(&self, filter: &AppointmentFilter) -> SchedulingResult<Vec<Appointment>> {
        Ok(self.db.list_appointments(filter)?)
    }

    /// Filtered listing with the caller's visibility applied on top.
    pub fn list_appointments_for(
        &self,
        ctx: &StaffContext,
        filter: &AppointmentFilter,
    ) -> SchedulingResult<Vec<Appointment>> {
        let filter = AppointmentFilter {
            scope: appointment_scope(ctx),
            ..filter.clone()
        };
        Ok(self.db.list_appointments(&filter)?)
    }
}

/// Last day of a due-vaccination window. Windows running past the last
/// storable day stop there.
pub(crate) fn due_window_end(today: NaiveDate, window_days: u32) -> NaiveDate {
    today
        .checked_add_signed(Duration::days(i64::from(window_days)))
        .map_or(latest_stored_date(), |end| end.min(latest_stored_date()))
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::models::{
        NewClient, NewPet, NewStaffMember, NewVaccination, Sex, Species, MAX_STORED_YEAR,
    };
    use chrono::TimeZone;
    use proptest::prelude::*;

    const EDGES: [(AppointmentStatus, AppointmentStatus); 5] = [
        (AppointmentStatus::Pending, AppointmentStatus::Confirmed),
        (AppointmentStatus::Pending, AppointmentStatus::Cancelled),
        (AppointmentStatus::Confirmed, AppointmentStatus::InProgress),
        (AppointmentStatus::Confirmed, AppointmentStatus::Cancelled),
        (AppointmentStatus::InProgress, AppointmentStatus::Completed),
    ];

    fn setup() -> (Database, AppointmentRequest) {
        let db = Database::open_in_memory().unwrap();
        let client_id = db
            .insert_client(&NewClient::new("Ana", "Gomez", "555-0100").validate().unwrap())
            .unwrap();
        let pet_id = db
            .insert_pet(&NewPet::new(client_id, "Rex", Species::Dog, Sex::Male).validate().unwrap())
            .unwrap();
        let vet_id = db
            .insert_staff(
                &NewStaffMember::new("Laura", "laura@clinic.com", StaffRole::Veterinarian)
                    .validate()
                    .unwrap(),
            )
            .unwrap();
        let when = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
        (db, AppointmentRequest::new(pet_id, vet_id, when, "checkup"))
    }

    fn status() -> impl Strategy<Value = AppointmentStatus> {
        prop::sample::select(AppointmentStatus::ALL.to_vec())
    }

    proptest! {
        /// Only the listed edges succeed; every other pair is rejected and
        /// leaves the stored status untouched.
        #[test]
        fn transition_follows_edges(from in status(), to in status()) {
            let (db, request) = setup();
            let scheduler = Scheduler::new(&db);
            let now = Utc.with_ymd_and_hms(2029, 1, 1, 0, 0, 0).unwrap();
            let id = scheduler.schedule_at(&request, now).unwrap().id;
            db.update_appointment_status(id, from, None).unwrap();

            let result = scheduler.transition_at(id, to, now);
            if EDGES.contains(&(from, to)) {
                prop_assert_eq!(result.unwrap().status, to);
            } else {
                let rejected = matches!(
                    result,
                    Err(SchedulingError::InvalidTransition { from: f, to: t }) if f == from && t == to
                );
                prop_assert!(rejected);
                prop_assert_eq!(db.get_appointment(id).unwrap().unwrap().status, from);
            }
        }

        /// Any time before "now" is refused and nothing is stored.
        #[test]
        fn past_dates_always_rejected(minutes_ago in 1i64..5_000_000) {
            let (db, mut request) = setup();
            let now = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
            request.scheduled_at = now - Duration::minutes(minutes_ago);

            let result = Scheduler::new(&db).schedule_at(&request, now);
            let is_past_date = matches!(result, Err(SchedulingError::PastDate { .. }));
            prop_assert!(is_past_date);
            prop_assert!(db.list_appointments(&AppointmentFilter::default()).unwrap().is_empty());
        }

        /// Bookings the store cannot read back are refused; everything
        /// accepted stays listable.
        #[test]
        fn far_future_bookings(years_ahead in 0i32..250_000) {
            let (db, mut request) = setup();
            let now = Utc.with_ymd_and_hms(2029, 1, 1, 0, 0, 0).unwrap();
            let year = 2030 + years_ahead;
            request.scheduled_at = Utc.with_ymd_and_hms(year, 1, 1, 9, 0, 0).unwrap();

            let scheduler = Scheduler::new(&db);
            let result = scheduler.schedule_at(&request, now);
            let listed = db.list_appointments(&AppointmentFilter::default()).unwrap();
            if year <= MAX_STORED_YEAR {
                prop_assert!(result.is_ok());
                prop_assert_eq!(listed.len(), 1);
                prop_assert_eq!(scheduler.upcoming(now, 5).unwrap().len(), 1);
            } else {
                let rejected = matches!(result, Err(SchedulingError::Validation(_)));
                prop_assert!(rejected);
                prop_assert!(listed.is_empty());
            }
        }

        /// Any duration gets an answer; the check window saturates instead
        /// of overflowing.
        #[test]
        fn conflicts_with_any_duration(minutes in any::<u32>()) {
            let (db, request) = setup();
            let now = Utc.with_ymd_and_hms(2029, 1, 1, 0, 0, 0).unwrap();
            let scheduler = Scheduler::new(&db);
            let booked = scheduler.schedule_at(&request, now).unwrap();

            let start = booked.scheduled_at - Duration::hours(1);
            let hits = scheduler.conflicts(booked.veterinarian_id, start, minutes).unwrap();
            prop_assert_eq!(hits.len(), usize::from(minutes > 60));
        }

        /// Any window gets an answer and never reaches past the last
        /// storable day.
        #[test]
        fn due_window_saturates(window in any::<u32>(), days_ahead in 0i64..3_000_000) {
            let (db, request) = setup();
            let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
            let next = (today + Duration::days(days_ahead)).min(latest_stored_date());
            let vaccination = NewVaccination::new(request.pet_id, "Rabies", today)
                .with_next_dose(next)
                .validate()
                .unwrap();
            db.insert_vaccination(&vaccination).unwrap();

            let due = Scheduler::new(&db).due_vaccinations(today, window).unwrap();
            let reachable = i64::from(window) >= (next - today).num_days();
            prop_assert_eq!(due.len(), usize::from(reachable));
            prop_assert!(due_window_end(today, window) <= latest_stored_date());
        }
    }
}

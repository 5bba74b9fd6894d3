//! Dashboard summaries.
//!
//! Everything here is a read over the store at one point in time; results are
//! plain values that can be cached or serialized.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::access::{appointment_scope, AppointmentScope};
use crate::config::ClinicConfig;
use crate::db::{AppointmentOverview, Database, DbResult};
use crate::models::{AppointmentStatus, Species, StaffContext, Vaccination};
use crate::scheduling::due_window_end;

/// Headline numbers for one day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DashboardCounts {
    pub active_clients: u32,
    pub active_pets: u32,
    /// Pending or confirmed appointments today
    pub open_appointments_today: u32,
    pub consultations_this_month: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeciesCount {
    pub species: Species,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCount {
    pub status: AppointmentStatus,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyTotal {
    /// 1-12
    pub month: u32,
    pub count: u32,
}

/// Everything the front page shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub counts: DashboardCounts,
    pub todays_appointments: Vec<AppointmentOverview>,
    pub upcoming_appointments: Vec<AppointmentOverview>,
    pub due_vaccinations: Vec<Vaccination>,
    pub species: Vec<SpeciesCount>,
}

impl Dashboard {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub struct ReportAggregator<'a> {
    db: &'a Database,
    config: ClinicConfig,
}

impl<'a> ReportAggregator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self::with_config(db, &ClinicConfig::default())
    }

    pub fn with_config(db: &'a Database, config: &ClinicConfig) -> Self {
        Self {
            db,
            config: config.clone(),
        }
    }

    pub fn counts(&self, today: NaiveDate) -> DbResult<DashboardCounts> {
        Ok(DashboardCounts {
            active_clients: self.db.count_active_clients()?,
            active_pets: self.db.count_active_pets()?,
            open_appointments_today: self.db.count_open_appointments_on(&today)?,
            consultations_this_month: self
                .db
                .count_consultations_in_month(today.year(), today.month())?,
        })
    }

    /// Active pets per species, most common first. Species without pets are left out.
    pub fn species_distribution(&self) -> DbResult<Vec<SpeciesCount>> {
        let mut counts: Vec<SpeciesCount> = self
            .db
            .count_active_pets_by_species()?
            .into_iter()
            .map(|(species, count)| SpeciesCount { species, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.species.cmp(&b.species)));
        Ok(counts)
    }

    /// Appointment count for every status, in lifecycle order.
    pub fn status_distribution(&self) -> DbResult<Vec<StatusCount>> {
        let stored = self.db.count_appointments_by_status()?;
        Ok(AppointmentStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: stored
                    .iter()
                    .find(|(s, _)| *s == status)
                    .map_or(0, |(_, count)| *count),
            })
            .collect())
    }

    /// Twelve entries, January first.
    pub fn monthly_consultation_totals(&self, year: i32) -> DbResult<Vec<MonthlyTotal>> {
        let stored = self.db.count_consultations_by_month(year)?;
        Ok((1..=12)
            .map(|month| MonthlyTotal {
                month,
                count: stored
                    .iter()
                    .find(|(m, _)| *m == month)
                    .map_or(0, |(_, count)| *count),
            })
            .collect())
    }

    pub fn dashboard(&self, now: DateTime<Utc>) -> DbResult<Dashboard> {
        self.dashboard_in_scope(now, AppointmentScope::All)
    }

    /// Dashboard with appointment lists limited to what `ctx` may see.
    /// Counts stay clinic-wide.
    pub fn dashboard_for(&self, ctx: &StaffContext, now: DateTime<Utc>) -> DbResult<Dashboard> {
        self.dashboard_in_scope(now, appointment_scope(ctx))
    }

    fn dashboard_in_scope(&self, now: DateTime<Utc>, scope: AppointmentScope) -> DbResult<Dashboard> {
        let today = now.date_naive();
        let window_end = due_window_end(today, self.config.vaccination_window_days);

        let todays = self
            .db
            .list_appointments_on(&today, Some(self.config.today_limit), scope)?;
        let upcoming = self
            .db
            .list_upcoming_appointments(&now, self.config.upcoming_limit, scope)?;

        let dashboard = Dashboard {
            generated_at: now,
            counts: self.counts(today)?,
            todays_appointments: self.db.appointment_overviews(todays)?,
            upcoming_appointments: self.db.appointment_overviews(upcoming)?,
            due_vaccinations: self.db.list_due_vaccinations(
                &today,
                &window_end,
                Some(self.config.upcoming_limit),
            )?,
            species: self.species_distribution()?,
        };
        debug!(
            today = %today,
            ?scope,
            todays = dashboard.todays_appointments.len(),
            upcoming = dashboard.upcoming_appointments.len(),
            "Built dashboard"
        );
        Ok(dashboard)
    }
}

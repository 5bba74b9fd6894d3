//! Appointment database operations.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{date_to_sql, get_enum, get_opt_ts, get_ts, ts_to_sql, Database, DbResult};
use crate::access::AppointmentScope;
use crate::models::{Appointment, AppointmentStatus, Species};

const APPOINTMENT_COLUMNS: &str = "a.id, a.pet_id, a.veterinarian_id, a.scheduled_at, a.reason, \
     a.status, a.notes, a.duration_minutes, a.created_at, a.cancelled_at";

fn row_to_appointment(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        pet_id: row.get(1)?,
        veterinarian_id: row.get(2)?,
        scheduled_at: get_ts(row, 3)?,
        reason: row.get(4)?,
        status: get_enum(row, 5)?,
        notes: row.get(6)?,
        duration_minutes: row.get(7)?,
        created_at: get_ts(row, 8)?,
        cancelled_at: get_opt_ts(row, 9)?,
    })
}

/// Listing filter. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    /// Calendar day (UTC) of the scheduled time
    pub on: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub veterinarian_id: Option<i64>,
    pub pet_id: Option<i64>,
    pub scope: AppointmentScope,
    pub limit: Option<usize>,
}

/// Appointment joined with the names a listing shows next to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentOverview {
    pub appointment: Appointment,
    pub pet_name: String,
    pub species: Species,
    pub client_name: String,
    pub client_phone: String,
    pub veterinarian_name: String,
}

/// WHERE clause fragments plus their bound values.
#[derive(Default)]
struct Conditions {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl Conditions {
    fn push(&mut self, clause: &str, value: Value) {
        self.clauses.push(clause.to_string());
        self.values.push(value);
    }

    fn push_scope(&mut self, scope: AppointmentScope) {
        match scope {
            AppointmentScope::All => {}
            AppointmentScope::Veterinarian(id) => {
                self.push("a.veterinarian_id = ?", Value::Integer(id))
            }
            AppointmentScope::Nothing => self.clauses.push("0".to_string()),
        }
    }

    fn push_day(&mut self, day: &NaiveDate) {
        self.push("substr(a.scheduled_at, 1, 10) = ?", Value::Text(date_to_sql(day)));
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }
}

fn limit_sql(limit: Option<usize>) -> String {
    limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default()
}

impl Database {
    /// Insert an appointment, returning the new id.
    pub fn insert_appointment(&self, appointment: &Appointment) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO appointments (
                pet_id, veterinarian_id, scheduled_at, reason, status, notes,
                duration_minutes, created_at, cancelled_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                appointment.pet_id,
                appointment.veterinarian_id,
                ts_to_sql(&appointment.scheduled_at),
                appointment.reason,
                appointment.status.as_str(),
                appointment.notes,
                appointment.duration_minutes,
                ts_to_sql(&appointment.created_at),
                appointment.cancelled_at.as_ref().map(ts_to_sql),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_appointment(&self, id: i64) -> DbResult<Option<Appointment>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM appointments a WHERE a.id = ?", APPOINTMENT_COLUMNS),
                [id],
                row_to_appointment,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Write a status change together with its cancellation timestamp.
    pub fn update_appointment_status(
        &self,
        id: i64,
        status: AppointmentStatus,
        cancelled_at: Option<&DateTime<Utc>>,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE appointments SET status = ?2, cancelled_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), cancelled_at.map(ts_to_sql)],
        )?;
        Ok(rows_affected > 0)
    }

    /// Filtered listing, newest first.
    pub fn list_appointments(&self, filter: &AppointmentFilter) -> DbResult<Vec<Appointment>> {
        let mut conditions = Conditions::default();
        conditions.push_scope(filter.scope);
        if let Some(day) = &filter.on {
            conditions.push_day(day);
        }
        if let Some(status) = filter.status {
            conditions.push("a.status = ?", Value::Text(status.as_str().to_string()));
        }
        if let Some(vet) = filter.veterinarian_id {
            conditions.push("a.veterinarian_id = ?", Value::Integer(vet));
        }
        if let Some(pet) = filter.pet_id {
            conditions.push("a.pet_id = ?", Value::Integer(pet));
        }

        let sql = format!(
            "SELECT {} FROM appointments a {} ORDER BY a.scheduled_at DESC, a.id DESC{}",
            APPOINTMENT_COLUMNS,
            conditions.where_sql(),
            limit_sql(filter.limit)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(conditions.values.iter()), row_to_appointment)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Pending/confirmed appointments at or after `now`, soonest first.
    pub fn list_upcoming_appointments(
        &self,
        now: &DateTime<Utc>,
        limit: usize,
        scope: AppointmentScope,
    ) -> DbResult<Vec<Appointment>> {
        let mut conditions = Conditions::default();
        conditions.push_scope(scope);
        conditions.push("a.scheduled_at >= ?", Value::Text(ts_to_sql(now)));
        conditions
            .clauses
            .push("a.status IN ('pending', 'confirmed')".to_string());

        let sql = format!(
            "SELECT {} FROM appointments a {} ORDER BY a.scheduled_at ASC, a.id ASC{}",
            APPOINTMENT_COLUMNS,
            conditions.where_sql(),
            limit_sql(Some(limit))
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(conditions.values.iter()), row_to_appointment)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every appointment on `day`, in time order.
    pub fn list_appointments_on(
        &self,
        day: &NaiveDate,
        limit: Option<usize>,
        scope: AppointmentScope,
    ) -> DbResult<Vec<Appointment>> {
        let mut conditions = Conditions::default();
        conditions.push_scope(scope);
        conditions.push_day(day);

        let sql = format!(
            "SELECT {} FROM appointments a {} ORDER BY a.scheduled_at ASC, a.id ASC{}",
            APPOINTMENT_COLUMNS,
            conditions.where_sql(),
            limit_sql(limit)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(conditions.values.iter()), row_to_appointment)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// A veterinarian's not-yet-finished appointments starting before `before`.
    pub fn list_unfinished_for_veterinarian(
        &self,
        veterinarian_id: i64,
        before: &DateTime<Utc>,
    ) -> DbResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM appointments a
            WHERE a.veterinarian_id = ?1
              AND a.scheduled_at < ?2
              AND a.status IN ('pending', 'confirmed', 'in_progress')
            ORDER BY a.scheduled_at ASC, a.id ASC
            "#,
            APPOINTMENT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![veterinarian_id, ts_to_sql(before)], row_to_appointment)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn list_appointments_for_pet(&self, pet_id: i64, limit: usize) -> DbResult<Vec<Appointment>> {
        self.list_appointments(&AppointmentFilter {
            pet_id: Some(pet_id),
            limit: Some(limit),
            ..Default::default()
        })
    }

    /// Pending or confirmed appointments on `day`.
    pub fn count_open_appointments_on(&self, day: &NaiveDate) -> DbResult<u32> {
        self.conn
            .query_row(
                r#"
                SELECT COUNT(*) FROM appointments
                WHERE substr(scheduled_at, 1, 10) = ?1
                  AND status IN ('pending', 'confirmed')
                "#,
                [date_to_sql(day)],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    /// Count per status; statuses without rows are absent.
    pub fn count_appointments_by_status(&self) -> DbResult<Vec<(AppointmentStatus, u32)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM appointments GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            let status: AppointmentStatus = get_enum(row, 0)?;
            let count: u32 = row.get(1)?;
            Ok((status, count))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Attach pet, owner and veterinarian names to a set of appointments.
    pub fn appointment_overviews(&self, appointments: Vec<Appointment>) -> DbResult<Vec<AppointmentOverview>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT p.name, p.species, c.given_name || ' ' || c.family_name, c.phone, s.name
            FROM pets p
            JOIN clients c ON c.id = p.client_id
            JOIN staff s ON s.id = ?2
            WHERE p.id = ?1
            "#,
        )?;

        let mut overviews = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let overview = stmt
                .query_row(params![appointment.pet_id, appointment.veterinarian_id], |row| {
                    Ok(AppointmentOverview {
                        pet_name: row.get(0)?,
                        species: get_enum(row, 1)?,
                        client_name: row.get(2)?,
                        client_phone: row.get(3)?,
                        veterinarian_name: row.get(4)?,
                        appointment: appointment.clone(),
                    })
                })?;
            overviews.push(overview);
        }
        Ok(overviews)
    }
}

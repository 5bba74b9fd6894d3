//! Consultation (medical record) database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{date_to_sql, get_opt_date, get_ts, ts_to_sql, Database, DbResult};
use crate::models::Consultation;

const CONSULTATION_COLUMNS: &str = "id, appointment_id, pet_id, veterinarian_id, consulted_at, \
     reason, symptoms, diagnosis, treatment, weight_kg, temperature_c, heart_rate_bpm, notes, \
     next_visit, created_at";

fn row_to_consultation(row: &Row<'_>) -> rusqlite::Result<Consultation> {
    Ok(Consultation {
        id: row.get(0)?,
        appointment_id: row.get(1)?,
        pet_id: row.get(2)?,
        veterinarian_id: row.get(3)?,
        consulted_at: get_ts(row, 4)?,
        reason: row.get(5)?,
        symptoms: row.get(6)?,
        diagnosis: row.get(7)?,
        treatment: row.get(8)?,
        weight_kg: row.get(9)?,
        temperature_c: row.get(10)?,
        heart_rate_bpm: row.get(11)?,
        notes: row.get(12)?,
        next_visit: get_opt_date(row, 13)?,
        created_at: get_ts(row, 14)?,
    })
}

impl Database {
    /// Insert a consultation, returning the new id.
    pub fn insert_consultation(&self, consultation: &Consultation) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO consultations (
                appointment_id, pet_id, veterinarian_id, consulted_at, reason,
                symptoms, diagnosis, treatment, weight_kg, temperature_c,
                heart_rate_bpm, notes, next_visit, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                consultation.appointment_id,
                consultation.pet_id,
                consultation.veterinarian_id,
                ts_to_sql(&consultation.consulted_at),
                consultation.reason,
                consultation.symptoms,
                consultation.diagnosis,
                consultation.treatment,
                consultation.weight_kg,
                consultation.temperature_c,
                consultation.heart_rate_bpm,
                consultation.notes,
                consultation.next_visit.as_ref().map(date_to_sql),
                ts_to_sql(&consultation.created_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_consultation(&self, id: i64) -> DbResult<Option<Consultation>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM consultations WHERE id = ?", CONSULTATION_COLUMNS),
                [id],
                row_to_consultation,
            )
            .optional()
            .map_err(Into::into)
    }

    /// A pet's most recent consultations, newest first.
    pub fn list_consultations_for_pet(&self, pet_id: i64, limit: usize) -> DbResult<Vec<Consultation>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM consultations
            WHERE pet_id = ?1
            ORDER BY consulted_at DESC, id DESC
            LIMIT ?2
            "#,
            CONSULTATION_COLUMNS
        ))?;
        let rows = stmt.query_map(params![pet_id, limit as i64], row_to_consultation)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Consultations, newest first, optionally only those one veterinarian recorded.
    pub fn list_consultations(&self, veterinarian_id: Option<i64>) -> DbResult<Vec<Consultation>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM consultations
            WHERE ?1 IS NULL OR veterinarian_id = ?1
            ORDER BY consulted_at DESC, id DESC
            "#,
            CONSULTATION_COLUMNS
        ))?;
        let rows = stmt.query_map([veterinarian_id], row_to_consultation)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Consultations held in one calendar month. Years the store cannot
    /// hold have none.
    pub fn count_consultations_in_month(&self, year: i32, month: u32) -> DbResult<u32> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM consultations WHERE substr(consulted_at, 1, 7) = ?1",
                [format!("{:04}-{:02}", year, month)],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    /// Consultation count per month of `year`, as `(month, count)` for months
    /// that have any.
    pub fn count_consultations_by_month(&self, year: i32) -> DbResult<Vec<(u32, u32)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT CAST(substr(consulted_at, 6, 2) AS INTEGER), COUNT(*)
            FROM consultations
            WHERE substr(consulted_at, 1, 4) = ?1
            GROUP BY substr(consulted_at, 1, 7)
            ORDER BY 1
            "#,
        )?;
        let rows = stmt.query_map([format!("{:04}", year)], |row| {
            let month: u32 = row.get(0)?;
            let count: u32 = row.get(1)?;
            Ok((month, count))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

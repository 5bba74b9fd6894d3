//! Staff database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{get_enum, get_ts, map_constraint, ts_to_sql, Database, DbError, DbResult};
use crate::models::StaffMember;

const STAFF_COLUMNS: &str = "id, name, email, phone, role, active, joined_at";

fn row_to_staff(row: &Row<'_>) -> rusqlite::Result<StaffMember> {
    Ok(StaffMember {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        role: get_enum(row, 4)?,
        active: row.get(5)?,
        joined_at: get_ts(row, 6)?,
    })
}

/// Rows that keep a staff member from being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaffReferences {
    pub appointments: u32,
    pub consultations: u32,
}

impl StaffReferences {
    pub fn is_empty(&self) -> bool {
        self.appointments == 0 && self.consultations == 0
    }
}

impl Database {
    /// Insert a staff member, returning the new id.
    pub fn insert_staff(&self, staff: &StaffMember) -> DbResult<i64> {
        self.conn
            .execute(
                r#"
                INSERT INTO staff (name, email, phone, role, active, joined_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    staff.name,
                    staff.email,
                    staff.phone,
                    staff.role.as_str(),
                    staff.active,
                    ts_to_sql(&staff.joined_at),
                ],
            )
            .map_err(|e| map_constraint(e, "staff e-mail already registered"))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update identity fields and role. `joined_at` is immutable.
    pub fn update_staff(&self, staff: &StaffMember) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute(
                r#"
                UPDATE staff SET
                    name = ?2,
                    email = ?3,
                    phone = ?4,
                    role = ?5,
                    active = ?6
                WHERE id = ?1
                "#,
                params![
                    staff.id,
                    staff.name,
                    staff.email,
                    staff.phone,
                    staff.role.as_str(),
                    staff.active,
                ],
            )
            .map_err(|e| map_constraint(e, "staff e-mail already registered"))?;
        Ok(rows_affected > 0)
    }

    pub fn get_staff(&self, id: i64) -> DbResult<Option<StaffMember>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM staff WHERE id = ?", STAFF_COLUMNS),
                [id],
                row_to_staff,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All staff ordered by name.
    pub fn list_staff(&self) -> DbResult<Vec<StaffMember>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM staff ORDER BY name, id", STAFF_COLUMNS))?;
        let rows = stmt.query_map([], row_to_staff)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn set_staff_active(&self, id: i64, active: bool) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE staff SET active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn staff_references(&self, id: i64) -> DbResult<StaffReferences> {
        let appointments: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM appointments WHERE veterinarian_id = ?",
            [id],
            |row| row.get(0),
        )?;
        let consultations: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM consultations WHERE veterinarian_id = ?",
            [id],
            |row| row.get(0),
        )?;
        Ok(StaffReferences {
            appointments,
            consultations,
        })
    }

    /// Remove a staff member.
    ///
    /// Restricted while appointments or consultations reference them; their
    /// vaccination records keep the row but lose the veterinarian link. Returns
    /// the number of vaccinations that were unlinked.
    pub fn delete_staff(&self, id: i64) -> DbResult<u32> {
        let tx = self.begin()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM staff WHERE id = ?)",
            [id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::NotFound(format!("staff member {}", id)));
        }

        let refs = self.staff_references(id)?;
        if !refs.is_empty() {
            return Err(DbError::Conflict(format!(
                "staff member {} has {} appointment(s) and {} consultation(s)",
                id, refs.appointments, refs.consultations
            )));
        }

        let unlinked = tx.execute(
            "UPDATE vaccinations SET veterinarian_id = NULL WHERE veterinarian_id = ?",
            [id],
        )?;
        tx.execute("DELETE FROM staff WHERE id = ?", [id])?;
        tx.commit()?;

        Ok(unlinked as u32)
    }
}

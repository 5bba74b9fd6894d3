//! Pet database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{get_enum, get_opt_date, get_ts, ts_to_sql, Database, DbError, DbResult};
use crate::models::{Pet, PetStatus, Species};

const PET_COLUMNS: &str = "id, client_id, name, species, breed, sex, birth_date, weight_kg, \
     color, photo_url, status, allergies, notes, registered_at";

fn row_to_pet(row: &Row<'_>) -> rusqlite::Result<Pet> {
    Ok(Pet {
        id: row.get(0)?,
        client_id: row.get(1)?,
        name: row.get(2)?,
        species: get_enum(row, 3)?,
        breed: row.get(4)?,
        sex: get_enum(row, 5)?,
        birth_date: get_opt_date(row, 6)?,
        weight_kg: row.get(7)?,
        color: row.get(8)?,
        photo_url: row.get(9)?,
        status: get_enum(row, 10)?,
        allergies: row.get(11)?,
        notes: row.get(12)?,
        registered_at: get_ts(row, 13)?,
    })
}

/// What a pet removal cascaded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PetRemoval {
    pub appointments: u32,
    pub consultations: u32,
    pub vaccinations: u32,
}

impl Database {
    /// Insert a pet, returning the new id.
    pub fn insert_pet(&self, pet: &Pet) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO pets (
                client_id, name, species, breed, sex, birth_date, weight_kg,
                color, photo_url, status, allergies, notes, registered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                pet.client_id,
                pet.name,
                pet.species.as_str(),
                pet.breed,
                pet.sex.as_str(),
                pet.birth_date.as_ref().map(super::date_to_sql),
                pet.weight_kg,
                pet.color,
                pet.photo_url,
                pet.status.as_str(),
                pet.allergies,
                pet.notes,
                ts_to_sql(&pet.registered_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update a pet. `registered_at` is immutable.
    pub fn update_pet(&self, pet: &Pet) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE pets SET
                client_id = ?2,
                name = ?3,
                species = ?4,
                breed = ?5,
                sex = ?6,
                birth_date = ?7,
                weight_kg = ?8,
                color = ?9,
                photo_url = ?10,
                status = ?11,
                allergies = ?12,
                notes = ?13
            WHERE id = ?1
            "#,
            params![
                pet.id,
                pet.client_id,
                pet.name,
                pet.species.as_str(),
                pet.breed,
                pet.sex.as_str(),
                pet.birth_date.as_ref().map(super::date_to_sql),
                pet.weight_kg,
                pet.color,
                pet.photo_url,
                pet.status.as_str(),
                pet.allergies,
                pet.notes,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn get_pet(&self, id: i64) -> DbResult<Option<Pet>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM pets WHERE id = ?", PET_COLUMNS),
                [id],
                row_to_pet,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Active pets ordered by name.
    pub fn list_active_pets(&self) -> DbResult<Vec<Pet>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pets WHERE status = 'active' ORDER BY name, id",
            PET_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_pet)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn list_pets_for_client(&self, client_id: i64, active_only: bool) -> DbResult<Vec<Pet>> {
        let filter = if active_only { " AND status = 'active'" } else { "" };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pets WHERE client_id = ?{} ORDER BY name, id",
            PET_COLUMNS, filter
        ))?;
        let rows = stmt.query_map([client_id], row_to_pet)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn set_pet_status(&self, id: i64, status: PetStatus) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE pets SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn count_active_pets(&self) -> DbResult<u32> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM pets WHERE status = 'active'",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    /// Active-pet count per species, only species with at least one pet.
    pub fn count_active_pets_by_species(&self) -> DbResult<Vec<(Species, u32)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT species, COUNT(*)
            FROM pets
            WHERE status = 'active'
            GROUP BY species
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let species: Species = get_enum(row, 0)?;
            let count: u32 = row.get(1)?;
            Ok((species, count))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Hard-delete a pet together with its appointments, consultations and
    /// vaccinations, in one transaction.
    pub fn delete_pet(&self, id: i64) -> DbResult<PetRemoval> {
        let tx = self.begin()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM pets WHERE id = ?)",
            [id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::NotFound(format!("pet {}", id)));
        }

        let consultations = tx.execute(
            r#"
            DELETE FROM consultations
            WHERE pet_id = ?1
               OR appointment_id IN (SELECT id FROM appointments WHERE pet_id = ?1)
            "#,
            [id],
        )?;
        let vaccinations = tx.execute("DELETE FROM vaccinations WHERE pet_id = ?", [id])?;
        let appointments = tx.execute("DELETE FROM appointments WHERE pet_id = ?", [id])?;
        tx.execute("DELETE FROM pets WHERE id = ?", [id])?;
        tx.commit()?;

        Ok(PetRemoval {
            appointments: appointments as u32,
            consultations: consultations as u32,
            vaccinations: vaccinations as u32,
        })
    }
}

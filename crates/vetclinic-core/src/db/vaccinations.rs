//! Vaccination database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{date_to_sql, get_date, get_opt_date, get_ts, ts_to_sql, Database, DbResult};
use crate::models::Vaccination;

const VACCINATION_COLUMNS: &str =
    "id, pet_id, vaccine_name, applied_on, next_dose_on, veterinarian_id, notes, registered_at";

fn row_to_vaccination(row: &Row<'_>) -> rusqlite::Result<Vaccination> {
    Ok(Vaccination {
        id: row.get(0)?,
        pet_id: row.get(1)?,
        vaccine_name: row.get(2)?,
        applied_on: get_date(row, 3)?,
        next_dose_on: get_opt_date(row, 4)?,
        veterinarian_id: row.get(5)?,
        notes: row.get(6)?,
        registered_at: get_ts(row, 7)?,
    })
}

impl Database {
    /// Insert a vaccination, returning the new id.
    pub fn insert_vaccination(&self, vaccination: &Vaccination) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO vaccinations (
                pet_id, vaccine_name, applied_on, next_dose_on, veterinarian_id,
                notes, registered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                vaccination.pet_id,
                vaccination.vaccine_name,
                date_to_sql(&vaccination.applied_on),
                vaccination.next_dose_on.as_ref().map(date_to_sql),
                vaccination.veterinarian_id,
                vaccination.notes,
                ts_to_sql(&vaccination.registered_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_vaccination(&self, id: i64) -> DbResult<Option<Vaccination>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM vaccinations WHERE id = ?", VACCINATION_COLUMNS),
                [id],
                row_to_vaccination,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All of a pet's vaccinations, most recently applied first.
    pub fn list_vaccinations_for_pet(&self, pet_id: i64) -> DbResult<Vec<Vaccination>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM vaccinations WHERE pet_id = ? ORDER BY applied_on DESC, id DESC",
            VACCINATION_COLUMNS
        ))?;
        let rows = stmt.query_map([pet_id], row_to_vaccination)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Vaccinations whose next dose falls in `[from, to]`, soonest first.
    pub fn list_due_vaccinations(
        &self,
        from: &NaiveDate,
        to: &NaiveDate,
        limit: Option<usize>,
    ) -> DbResult<Vec<Vaccination>> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM vaccinations
            WHERE next_dose_on IS NOT NULL
              AND next_dose_on >= ?1
              AND next_dose_on <= ?2
            ORDER BY next_dose_on ASC, id ASC
            LIMIT ?3
            "#,
            VACCINATION_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![date_to_sql(from), date_to_sql(to), limit],
            row_to_vaccination,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewClient, NewPet, NewStaffMember, NewVaccination, Sex, Species, StaffRole};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_db() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let client_id = db
            .insert_client(&NewClient::new("Ana", "Gomez", "555-0100").validate().unwrap())
            .unwrap();
        let pet_id = db
            .insert_pet(&NewPet::new(client_id, "Rex", Species::Dog, Sex::Male).validate().unwrap())
            .unwrap();
        (db, pet_id)
    }

    fn insert(db: &Database, pet_id: i64, applied: NaiveDate, next: Option<NaiveDate>) -> i64 {
        let mut input = NewVaccination::new(pet_id, "Rabies", applied);
        input.next_dose_on = next;
        db.insert_vaccination(&input.validate().unwrap()).unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let (db, pet_id) = setup_db();
        let id = insert(&db, pet_id, date(2024, 1, 10), Some(date(2025, 1, 10)));

        let stored = db.get_vaccination(id).unwrap().unwrap();
        assert_eq!(stored.vaccine_name, "Rabies");
        assert_eq!(stored.applied_on, date(2024, 1, 10));
        assert_eq!(stored.next_dose_on, Some(date(2025, 1, 10)));
        assert_eq!(stored.veterinarian_id, None);
    }

    #[test]
    fn test_due_window_is_inclusive_and_ascending() {
        let (db, pet_id) = setup_db();
        let applied = date(2024, 1, 1);
        let last_day = insert(&db, pet_id, applied, Some(date(2024, 7, 1)));
        let first_day = insert(&db, pet_id, applied, Some(date(2024, 6, 1)));
        insert(&db, pet_id, applied, Some(date(2024, 5, 31)));
        insert(&db, pet_id, applied, Some(date(2024, 7, 2)));
        insert(&db, pet_id, applied, None);

        let due = db
            .list_due_vaccinations(&date(2024, 6, 1), &date(2024, 7, 1), None)
            .unwrap();
        let ids: Vec<_> = due.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![first_day, last_day]);

        let limited = db
            .list_due_vaccinations(&date(2024, 6, 1), &date(2024, 7, 1), Some(1))
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_pet_listing_newest_first() {
        let (db, pet_id) = setup_db();
        let older = insert(&db, pet_id, date(2023, 1, 1), None);
        let newer = insert(&db, pet_id, date(2024, 1, 1), None);

        let ids: Vec<_> = db
            .list_vaccinations_for_pet(pet_id)
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![newer, older]);
    }

    #[test]
    fn test_staff_removal_unlinks_vaccination() {
        let (db, pet_id) = setup_db();
        let vet_id = db
            .insert_staff(
                &NewStaffMember::new("Laura", "laura@clinic.com", StaffRole::Veterinarian)
                    .validate()
                    .unwrap(),
            )
            .unwrap();
        let mut input = NewVaccination::new(pet_id, "Rabies", date(2024, 1, 1));
        input.veterinarian_id = Some(vet_id);
        let id = db.insert_vaccination(&input.validate().unwrap()).unwrap();

        assert_eq!(db.delete_staff(vet_id).unwrap(), 1);
        assert_eq!(db.get_vaccination(id).unwrap().unwrap().veterinarian_id, None);
    }
}

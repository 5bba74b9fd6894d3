//! Client database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{map_constraint, Database, DbError, DbResult};
use crate::models::Client;

const CLIENT_COLUMNS: &str =
    "id, given_name, family_name, national_id, phone, email, address, active";

fn row_to_client(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        given_name: row.get(1)?,
        family_name: row.get(2)?,
        national_id: row.get(3)?,
        phone: row.get(4)?,
        email: row.get(5)?,
        address: row.get(6)?,
        active: row.get(7)?,
    })
}

impl Database {
    /// Insert a client, returning the new id.
    pub fn insert_client(&self, client: &Client) -> DbResult<i64> {
        self.conn
            .execute(
                r#"
                INSERT INTO clients (
                    given_name, family_name, national_id, phone, email, address, active
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    client.given_name,
                    client.family_name,
                    client.national_id,
                    client.phone,
                    client.email,
                    client.address,
                    client.active,
                ],
            )
            .map_err(|e| map_constraint(e, "national ID already registered"))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_client(&self, client: &Client) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute(
                r#"
                UPDATE clients SET
                    given_name = ?2,
                    family_name = ?3,
                    national_id = ?4,
                    phone = ?5,
                    email = ?6,
                    address = ?7,
                    active = ?8
                WHERE id = ?1
                "#,
                params![
                    client.id,
                    client.given_name,
                    client.family_name,
                    client.national_id,
                    client.phone,
                    client.email,
                    client.address,
                    client.active,
                ],
            )
            .map_err(|e| map_constraint(e, "national ID already registered"))?;
        Ok(rows_affected > 0)
    }

    /// Get a client by id, active or not.
    pub fn get_client(&self, id: i64) -> DbResult<Option<Client>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM clients WHERE id = ?", CLIENT_COLUMNS),
                [id],
                row_to_client,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn get_client_by_national_id(&self, national_id: &str) -> DbResult<Option<Client>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM clients WHERE national_id = ?", CLIENT_COLUMNS),
                [national_id],
                row_to_client,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Active clients ordered by family name, then given name.
    pub fn list_active_clients(&self) -> DbResult<Vec<Client>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM clients WHERE active = 1 ORDER BY family_name, given_name, id",
            CLIENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_client)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Soft-delete or reactivate.
    pub fn set_client_active(&self, id: i64, active: bool) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE clients SET active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn count_active_clients(&self) -> DbResult<u32> {
        self.conn
            .query_row("SELECT COUNT(*) FROM clients WHERE active = 1", [], |row| {
                row.get(0)
            })
            .map_err(Into::into)
    }

    /// Number of pets owned by a client; `active_only` skips deceased/transferred.
    pub fn count_pets_for_client(&self, client_id: i64, active_only: bool) -> DbResult<u32> {
        let sql = if active_only {
            "SELECT COUNT(*) FROM pets WHERE client_id = ? AND status = 'active'"
        } else {
            "SELECT COUNT(*) FROM pets WHERE client_id = ?"
        };
        self.conn
            .query_row(sql, [client_id], |row| row.get(0))
            .map_err(Into::into)
    }

    /// Hard-delete a client. Restricted while any pet references them.
    pub fn delete_client(&self, id: i64) -> DbResult<()> {
        let tx = self.begin()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE id = ?)",
            [id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::NotFound(format!("client {}", id)));
        }

        let pets = self.count_pets_for_client(id, false)?;
        if pets > 0 {
            return Err(DbError::Conflict(format!(
                "client {} still owns {} pet(s)",
                id, pets
            )));
        }

        tx.execute("DELETE FROM clients WHERE id = ?", [id])?;
        tx.commit()?;
        Ok(())
    }
}

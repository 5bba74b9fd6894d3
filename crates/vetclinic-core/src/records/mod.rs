//! Client, pet and staff registry plus medical-record keeping.
//!
//! Registration and updates go through the typed `New*` inputs and their
//! `validate()` pass; references to other records are checked against the
//! store before anything is written. Removals apply the cascade/restrict
//! rules inside one transaction.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::access::{can_record_consultation, visible_consultations, visible_users};
use crate::config::ClinicConfig;
use crate::db::{Database, DbError, PetRemoval};
use crate::models::{
    Appointment, Client, Consultation, NewClient, NewConsultation, NewPet, NewStaffMember,
    NewVaccination, Pet, PetStatus, StaffContext, StaffMember, Vaccination, ValidationError,
};

/// Registry errors.
#[derive(Error, Debug)]
pub enum RecordsError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(DbError),
}

impl From<DbError> for RecordsError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => RecordsError::NotFound(what),
            DbError::Conflict(what) | DbError::Constraint(what) => RecordsError::Conflict(what),
            other => RecordsError::Database(other),
        }
    }
}

impl From<rusqlite::Error> for RecordsError {
    fn from(err: rusqlite::Error) -> Self {
        RecordsError::Database(DbError::Sqlite(err))
    }
}

pub type RecordsResult<T> = Result<T, RecordsError>;

/// How much of a pet's past [`Registry::pet_history`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    pub consultations: usize,
    pub appointments: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        ClinicConfig::default().into()
    }
}

impl From<ClinicConfig> for HistoryLimits {
    fn from(config: ClinicConfig) -> Self {
        Self::from(&config)
    }
}

impl From<&ClinicConfig> for HistoryLimits {
    fn from(config: &ClinicConfig) -> Self {
        Self {
            consultations: config.history_consultations,
            appointments: config.history_appointments,
        }
    }
}

/// A pet's record card: owner, recent visits and every vaccination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetHistory {
    pub pet: Pet,
    pub owner: Client,
    /// Newest first
    pub consultations: Vec<Consultation>,
    /// Most recently applied first
    pub vaccinations: Vec<Vaccination>,
    /// Newest first
    pub appointments: Vec<Appointment>,
}

impl PetHistory {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

pub struct Registry<'a> {
    db: &'a Database,
}

impl<'a> Registry<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // =====================================================================
    // Clients
    // =====================================================================

    pub fn register_client(&self, input: &NewClient) -> RecordsResult<Client> {
        let mut client = input.validate()?;
        client.id = self.db.insert_client(&client)?;
        info!(client_id = client.id, "Client registered");
        Ok(client)
    }

    /// Replace a client's identity fields. The active flag is kept.
    pub fn update_client(&self, id: i64, input: &NewClient) -> RecordsResult<Client> {
        let existing = self.get_client(id)?;
        let mut client = input.validate()?;
        client.id = id;
        client.active = existing.active;
        self.db.update_client(&client)?;
        info!(client_id = id, "Client updated");
        Ok(client)
    }

    /// Soft delete: the client disappears from active listings only.
    pub fn deactivate_client(&self, id: i64) -> RecordsResult<()> {
        if !self.db.set_client_active(id, false)? {
            return Err(RecordsError::NotFound(format!("client {}", id)));
        }
        info!(client_id = id, "Client deactivated");
        Ok(())
    }

    pub fn reactivate_client(&self, id: i64) -> RecordsResult<()> {
        if !self.db.set_client_active(id, true)? {
            return Err(RecordsError::NotFound(format!("client {}", id)));
        }
        info!(client_id = id, "Client reactivated");
        Ok(())
    }

    pub fn get_client(&self, id: i64) -> RecordsResult<Client> {
        self.db
            .get_client(id)?
            .ok_or_else(|| RecordsError::NotFound(format!("client {}", id)))
    }

    pub fn list_active_clients(&self) -> RecordsResult<Vec<Client>> {
        Ok(self.db.list_active_clients()?)
    }

    pub fn active_pets_of_client(&self, client_id: i64) -> RecordsResult<Vec<Pet>> {
        self.get_client(client_id)?;
        Ok(self.db.list_pets_for_client(client_id, true)?)
    }

    /// Number of active pets the client owns, counted by the store.
    pub fn active_pet_count(&self, client_id: i64) -> RecordsResult<u32> {
        self.get_client(client_id)?;
        Ok(self.db.count_pets_for_client(client_id, true)?)
    }

    /// Hard delete. Refused with `Conflict` while the client owns any pet.
    pub fn remove_client(&self, id: i64) -> RecordsResult<()> {
        self.db.delete_client(id).map_err(|err| {
            warn!(client_id = id, error = %err, "Client removal refused");
            RecordsError::from(err)
        })?;
        info!(client_id = id, "Client removed");
        Ok(())
    }

    // =====================================================================
    // Pets
    // =====================================================================

    /// Register a pet for an active client.
    pub fn register_pet(&self, input: &NewPet) -> RecordsResult<Pet> {
        let mut pet = input.validate()?;
        self.require_active_client(pet.client_id)?;
        pet.id = self.db.insert_pet(&pet)?;
        info!(pet_id = pet.id, client_id = pet.client_id, species = %pet.species.as_str(), "Pet registered");
        Ok(pet)
    }

    /// Replace a pet's descriptive fields. Status and registration time are kept;
    /// moving the pet to another owner requires that owner to be active.
    pub fn update_pet(&self, id: i64, input: &NewPet) -> RecordsResult<Pet> {
        let existing = self.get_pet(id)?;
        let mut pet = input.validate()?;
        if pet.client_id != existing.client_id {
            self.require_active_client(pet.client_id)?;
        }
        pet.id = id;
        pet.status = existing.status;
        pet.registered_at = existing.registered_at;
        self.db.update_pet(&pet)?;
        info!(pet_id = id, "Pet updated");
        Ok(pet)
    }

    pub fn set_pet_status(&self, id: i64, status: PetStatus) -> RecordsResult<()> {
        if !self.db.set_pet_status(id, status)? {
            return Err(RecordsError::NotFound(format!("pet {}", id)));
        }
        info!(pet_id = id, status = status.as_str(), "Pet status changed");
        Ok(())
    }

    pub fn get_pet(&self, id: i64) -> RecordsResult<Pet> {
        self.db
            .get_pet(id)?
            .ok_or_else(|| RecordsError::NotFound(format!("pet {}", id)))
    }

    pub fn list_active_pets(&self) -> RecordsResult<Vec<Pet>> {
        Ok(self.db.list_active_pets()?)
    }

    /// Hard delete, taking the pet's appointments, consultations and
    /// vaccinations with it.
    pub fn remove_pet(&self, id: i64) -> RecordsResult<PetRemoval> {
        let removal = self.db.delete_pet(id)?;
        info!(
            pet_id = id,
            appointments = removal.appointments,
            consultations = removal.consultations,
            vaccinations = removal.vaccinations,
            "Pet removed"
        );
        Ok(removal)
    }

    pub fn pet_history(&self, pet_id: i64, limits: HistoryLimits) -> RecordsResult<PetHistory> {
        let pet = self.get_pet(pet_id)?;
        let owner = self.get_client(pet.client_id)?;
        let consultations = self
            .db
            .list_consultations_for_pet(pet_id, limits.consultations)?;
        let vaccinations = self.db.list_vaccinations_for_pet(pet_id)?;
        let appointments = self.db.list_appointments_for_pet(pet_id, limits.appointments)?;
        debug!(
            pet_id,
            consultations = consultations.len(),
            vaccinations = vaccinations.len(),
            appointments = appointments.len(),
            "Loaded pet history"
        );
        Ok(PetHistory {
            pet,
            owner,
            consultations,
            vaccinations,
            appointments,
        })
    }

    // =====================================================================
    // Staff
    // =====================================================================

    pub fn register_staff(&self, input: &NewStaffMember) -> RecordsResult<StaffMember> {
        let mut staff = input.validate()?;
        staff.id = self.db.insert_staff(&staff)?;
        info!(staff_id = staff.id, role = staff.role.as_str(), "Staff member registered");
        Ok(staff)
    }

    /// Replace identity fields and role. Active flag and join date are kept.
    pub fn update_staff(&self, id: i64, input: &NewStaffMember) -> RecordsResult<StaffMember> {
        let existing = self.get_staff(id)?;
        let mut staff = input.validate()?;
        staff.id = id;
        staff.active = existing.active;
        staff.joined_at = existing.joined_at;
        self.db.update_staff(&staff)?;
        info!(staff_id = id, role = staff.role.as_str(), "Staff member updated");
        Ok(staff)
    }

    pub fn deactivate_staff(&self, id: i64) -> RecordsResult<()> {
        if !self.db.set_staff_active(id, false)? {
            return Err(RecordsError::NotFound(format!("staff member {}", id)));
        }
        info!(staff_id = id, "Staff member deactivated");
        Ok(())
    }

    pub fn get_staff(&self, id: i64) -> RecordsResult<StaffMember> {
        self.db
            .get_staff(id)?
            .ok_or_else(|| RecordsError::NotFound(format!("staff member {}", id)))
    }

    pub fn list_staff(&self) -> RecordsResult<Vec<StaffMember>> {
        Ok(self.db.list_staff()?)
    }

    /// Staff records the caller may see.
    pub fn list_staff_for(&self, ctx: &StaffContext) -> RecordsResult<Vec<StaffMember>> {
        let staff = self.db.list_staff()?;
        Ok(visible_users(ctx, &staff).into_iter().cloned().collect())
    }

    /// Hard delete. Refused while appointments or consultations reference the
    /// member; returns how many vaccinations lost their veterinarian link.
    pub fn remove_staff(&self, id: i64) -> RecordsResult<u32> {
        let unlinked = self.db.delete_staff(id).map_err(|err| {
            warn!(staff_id = id, error = %err, "Staff removal refused");
            RecordsError::from(err)
        })?;
        info!(staff_id = id, unlinked_vaccinations = unlinked, "Staff member removed");
        Ok(unlinked)
    }

    // =====================================================================
    // Medical records
    // =====================================================================

    /// Record a consultation signed by the caller.
    pub fn record_consultation(
        &self,
        ctx: &StaffContext,
        input: &NewConsultation,
    ) -> RecordsResult<Consultation> {
        if !can_record_consultation(ctx) {
            warn!(staff_id = ctx.id, role = ctx.role.as_str(), "Consultation recording refused");
            return Err(RecordsError::Forbidden(format!(
                "{} {} may not record consultations",
                ctx.role.label(),
                ctx.id
            )));
        }
        let mut consultation = input.validate(ctx.id)?;

        let tx = self.db.begin()?;

        match self.db.get_staff(ctx.id)? {
            Some(staff) if staff.active => {}
            _ => return Err(RecordsError::NotFound(format!("active staff member {}", ctx.id))),
        }
        self.get_pet(input.pet_id)?;
        let appointment = self
            .db
            .get_appointment(input.appointment_id)?
            .ok_or_else(|| {
                RecordsError::NotFound(format!("appointment {}", input.appointment_id))
            })?;
        if appointment.pet_id != input.pet_id {
            return Err(ValidationError::Invalid {
                field: "appointment_id",
                reason: format!(
                    "appointment {} belongs to pet {}, not {}",
                    appointment.id, appointment.pet_id, input.pet_id
                ),
            }
            .into());
        }

        consultation.id = self.db.insert_consultation(&consultation)?;
        tx.commit()?;

        info!(
            consultation_id = consultation.id,
            pet_id = consultation.pet_id,
            veterinarian_id = consultation.veterinarian_id,
            "Consultation recorded"
        );
        Ok(consultation)
    }

    /// Consultations the caller may see, optionally for one pet.
    pub fn consultations_for(
        &self,
        ctx: &StaffContext,
        pet_id: Option<i64>,
    ) -> RecordsResult<Vec<Consultation>> {
        let all = self.db.list_consultations(None)?;
        Ok(visible_consultations(ctx, &all)
            .into_iter()
            .filter(|c| pet_id.map_or(true, |id| c.pet_id == id))
            .cloned()
            .collect())
    }

    pub fn record_vaccination(&self, input: &NewVaccination) -> RecordsResult<Vaccination> {
        let mut vaccination = input.validate()?;

        let tx = self.db.begin()?;
        self.get_pet(vaccination.pet_id)?;
        if let Some(vet_id) = vaccination.veterinarian_id {
            self.get_staff(vet_id)?;
        }
        vaccination.id = self.db.insert_vaccination(&vaccination)?;
        tx.commit()?;

        info!(
            vaccination_id = vaccination.id,
            pet_id = vaccination.pet_id,
            vaccine = %vaccination.vaccine_name,
            "Vaccination recorded"
        );
        Ok(vaccination)
    }

    fn require_active_client(&self, client_id: i64) -> RecordsResult<()> {
        match self.db.get_client(client_id)? {
            Some(client) if client.active => Ok(()),
            _ => Err(RecordsError::NotFound(format!("active client {}", client_id))),
        }
    }
}

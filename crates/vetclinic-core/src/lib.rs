//! Vet Clinic Core Library
//!
//! Scheduling and records engine for a veterinary clinic: client/pet registry,
//! appointment lifecycle, consultation history and vaccination tracking.
//!
//! # Architecture
//!
//! ```text
//!                    StaffContext (from the auth collaborator)
//!                                 │
//!                          ┌──────▼──────┐
//!                          │   access    │  visibility filters
//!                          └──────┬──────┘
//!             ┌───────────────────┼────────────────────┐
//!             ▼                   ▼                    ▼
//!       ┌───────────┐      ┌────────────┐       ┌────────────┐
//!       │ records   │      │ scheduling │       │ reporting  │
//!       │ Registry  │      │ Scheduler  │       │ Aggregator │
//!       └─────┬─────┘      └─────┬──────┘       └─────┬──────┘
//!             │  validate         │  pending → confirmed → in_progress → completed
//!             │  + references     │      └──────────┴──► cancelled
//!             └───────────────────┼────────────────────┘
//!                                 ▼
//!                     ┌───────────────────────┐
//!                     │   db (SQLite store)   │
//!                     │ one transaction per   │
//!                     │ engine operation      │
//!                     └───────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite entity store
//! - [`models`]: Domain types and input validation
//! - [`access`]: Role-based visibility rules
//! - [`scheduling`]: Appointment state machine and look-ahead queries
//! - [`records`]: Registry CRUD with cascade/restrict removal
//! - [`reporting`]: Dashboard summaries
//! - [`config`]: `VETCLINIC_*` configuration

pub mod access;
pub mod config;
pub mod db;
pub mod models;
pub mod records;
pub mod reporting;
pub mod scheduling;

// Re-export commonly used types
pub use config::ClinicConfig;
pub use db::Database;
pub use models::{
    Appointment, AppointmentRequest, AppointmentStatus, Client, Consultation, Pet, PetStatus,
    Sex, Species, StaffContext, StaffMember, StaffRole, Vaccination,
};
pub use records::{HistoryLimits, Registry};
pub use reporting::ReportAggregator;
pub use scheduling::Scheduler;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetClinicError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Appointment in the past: {0}")]
    PastDate(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for VetClinicError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => VetClinicError::NotFound(what),
            db::DbError::Conflict(what) | db::DbError::Constraint(what) => {
                VetClinicError::Conflict(what)
            }
            other => VetClinicError::DatabaseError(other.to_string()),
        }
    }
}

impl From<models::ValidationError> for VetClinicError {
    fn from(e: models::ValidationError) -> Self {
        VetClinicError::InvalidInput(e.to_string())
    }
}

impl From<scheduling::SchedulingError> for VetClinicError {
    fn from(e: scheduling::SchedulingError) -> Self {
        use scheduling::SchedulingError;
        match e {
            SchedulingError::Database(err) => err.into(),
            SchedulingError::Validation(err) => err.into(),
            err @ SchedulingError::PastDate { .. } => VetClinicError::PastDate(err.to_string()),
            err @ SchedulingError::InvalidTransition { .. } => {
                VetClinicError::InvalidTransition(err.to_string())
            }
            SchedulingError::NotFound(what) => VetClinicError::NotFound(what),
        }
    }
}

impl From<records::RecordsError> for VetClinicError {
    fn from(e: records::RecordsError) -> Self {
        use records::RecordsError;
        match e {
            RecordsError::Validation(err) => err.into(),
            RecordsError::NotFound(what) => VetClinicError::NotFound(what),
            RecordsError::Conflict(what) => VetClinicError::Conflict(what),
            RecordsError::Forbidden(what) => VetClinicError::Forbidden(what),
            RecordsError::Database(err) => err.into(),
        }
    }
}

impl From<config::ConfigError> for VetClinicError {
    fn from(e: config::ConfigError) -> Self {
        VetClinicError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for VetClinicError {
    fn from(e: serde_json::Error) -> Self {
        VetClinicError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VetClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VetClinicError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, VetClinicError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| VetClinicError::InvalidInput(format!("{}: '{}' ({})", field, raw, e)))
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, VetClinicError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| VetClinicError::InvalidInput(format!("{}: '{}' ({})", field, raw, e)))
}

fn parse_opt_date(field: &str, raw: Option<String>) -> Result<Option<NaiveDate>, VetClinicError> {
    raw.map(|raw| parse_date(field, &raw)).transpose()
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<ClinicCore>, VetClinicError> {
    let db = Database::open(&path)?;
    Ok(ClinicCore::wrap(db, ClinicConfig::default()))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<ClinicCore>, VetClinicError> {
    let db = Database::open_in_memory()?;
    Ok(ClinicCore::wrap(db, ClinicConfig::default()))
}

/// Open the database named by `VETCLINIC_DB_PATH` (in-memory when unset),
/// configured from the environment.
#[uniffi::export]
pub fn open_database_from_env() -> Result<Arc<ClinicCore>, VetClinicError> {
    let config = ClinicConfig::from_env()?;
    let db = match &config.db_path {
        Some(path) => Database::open(path)?,
        None => Database::open_in_memory()?,
    };
    Ok(ClinicCore::wrap(db, config))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    db: Arc<Mutex<Database>>,
    config: ClinicConfig,
}

impl ClinicCore {
    fn wrap(db: Database, config: ClinicConfig) -> Arc<Self> {
        tracing::info!(
            appointment_minutes = config.appointment_minutes,
            on_disk = config.db_path.is_some(),
            "Clinic core opened"
        );
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        })
    }
}

#[uniffi::export]
impl ClinicCore {
    // =========================================================================
    // Client Operations
    // =========================================================================

    pub fn register_client(&self, client: FfiNewClient) -> Result<FfiClient, VetClinicError> {
        let db = self.db.lock()?;
        let created = Registry::new(&db).register_client(&client.into())?;
        Ok(created.into())
    }

    pub fn update_client(&self, id: i64, client: FfiNewClient) -> Result<FfiClient, VetClinicError> {
        let db = self.db.lock()?;
        let updated = Registry::new(&db).update_client(id, &client.into())?;
        Ok(updated.into())
    }

    pub fn get_client(&self, id: i64) -> Result<FfiClient, VetClinicError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).get_client(id)?.into())
    }

    /// Active clients ordered by family name.
    pub fn list_active_clients(&self) -> Result<Vec<FfiClient>, VetClinicError> {
        let db = self.db.lock()?;
        let clients = Registry::new(&db).list_active_clients()?;
        Ok(clients.into_iter().map(|c| c.into()).collect())
    }

    pub fn deactivate_client(&self, id: i64) -> Result<(), VetClinicError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).deactivate_client(id)?)
    }

    pub fn reactivate_client(&self, id: i64) -> Result<(), VetClinicError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).reactivate_client(id)?)
    }

    /// Hard delete; fails with `Conflict` while the client owns pets.
    pub fn remove_client(&self, id: i64) -> Result<(), VetClinicError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).remove_client(id)?)
    }

    // =========================================================================
    // Pet Operations
    // =========================================================================

    pub fn register_pet(&self, pet: FfiNewPet) -> Result<FfiPet, VetClinicError> {
        let db = self.db.lock()?;
        let input = pet.into_input()?;
        Ok(Registry::new(&db).register_pet(&input)?.into())
    }

    pub fn update_pet(&self, id: i64, pet: FfiNewPet) -> Result<FfiPet, VetClinicError> {
        let db = self.db.lock()?;
        let input = pet.into_input()?;
        Ok(Registry::new(&db).update_pet(id, &input)?.into())
    }

    pub fn get_pet(&self, id: i64) -> Result<FfiPet, VetClinicError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).get_pet(id)?.into())
    }

    pub fn list_active_pets(&self) -> Result<Vec<FfiPet>, VetClinicError> {
        let db = self.db.lock()?;
        let pets = Registry::new(&db).list_active_pets()?;
        Ok(pets.into_iter().map(|p| p.into()).collect())
    }

    pub fn active_pets_of_client(&self, client_id: i64) -> Result<Vec<FfiPet>, VetClinicError> {
        let db = self.db.lock()?;
        let pets = Registry::new(&db).active_pets_of_client(client_id)?;
        Ok(pets.into_iter().map(|p| p.into()).collect())
    }

    pub fn active_pet_count(&self, client_id: i64) -> Result<u32, VetClinicError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).active_pet_count(client_id)?)
    }

    /// Set lifecycle status ("active", "deceased", "transferred").
    pub fn set_pet_status(&self, id: i64, status: String) -> Result<(), VetClinicError> {
        let db = self.db.lock()?;
        let status: PetStatus = status.parse()?;
        Ok(Registry::new(&db).set_pet_status(id, status)?)
    }

    /// Hard delete together with the pet's appointments, consultations and vaccinations.
    pub fn remove_pet(&self, id: i64) -> Result<FfiPetRemoval, VetClinicError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).remove_pet(id)?.into())
    }

    /// Pet record card as JSON, limited by the configured history sizes.
    pub fn pet_history_json(&self, pet_id: i64) -> Result<String, VetClinicError> {
        let db = self.db.lock()?;
        let history = Registry::new(&db).pet_history(pet_id, HistoryLimits::from(&self.config))?;
        Ok(history.to_json()?)
    }

    // =========================================================================
    // Staff Operations
    // =========================================================================

    pub fn register_staff(&self, staff: FfiNewStaffMember) -> Result<FfiStaffMember, VetClinicError> {
        let db = self.db.lock()?;
        let input = staff.into_input()?;
        Ok(Registry::new(&db).register_staff(&input)?.into())
    }

    pub fn update_staff(
        &self,
        id: i64,
        staff: FfiNewStaffMember,
    ) -> Result<FfiStaffMember, VetClinicError> {
        let db = self.db.lock()?;
        let input = staff.into_input()?;
        Ok(Registry::new(&db).update_staff(id, &input)?.into())
    }

    pub fn deactivate_staff(&self, id: i64) -> Result<(), VetClinicError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).deactivate_staff(id)?)
    }

    /// Staff records visible to the caller.
    pub fn list_staff(&self, caller: FfiStaffContext) -> Result<Vec<FfiStaffMember>, VetClinicError> {
        let db = self.db.lock()?;
        let ctx = caller.into_context()?;
        let staff = Registry::new(&db).list_staff_for(&ctx)?;
        Ok(staff.into_iter().map(|s| s.into()).collect())
    }

    /// Remove a staff member; returns how many vaccinations were unlinked.
    pub fn remove_staff(&self, id: i64) -> Result<u32, VetClinicError> {
        let db = self.db.lock()?;
        Ok(Registry::new(&db).remove_staff(id)?)
    }

    // =========================================================================
    // Scheduling Operations
    // =========================================================================

    pub fn schedule_appointment(
        &self,
        request: FfiAppointmentRequest,
    ) -> Result<FfiAppointment, VetClinicError> {
        let db = self.db.lock()?;
        let request = request.into_request()?;
        let scheduler = Scheduler::with_config(&db, &self.config);
        Ok(scheduler.schedule(&request)?.into())
    }

    /// Move an appointment to `status` ("confirmed", "cancelled", ...).
    pub fn transition_appointment(
        &self,
        id: i64,
        status: String,
    ) -> Result<FfiAppointment, VetClinicError> {
        let db = self.db.lock()?;
        let next: AppointmentStatus = status.parse()?;
        let scheduler = Scheduler::with_config(&db, &self.config);
        Ok(scheduler.transition(id, next)?.into())
    }

    /// Upcoming appointments visible to the caller; `limit` defaults to the configured one.
    pub fn upcoming_appointments(
        &self,
        caller: FfiStaffContext,
        limit: Option<u32>,
    ) -> Result<Vec<FfiAppointment>, VetClinicError> {
        let db = self.db.lock()?;
        let ctx = caller.into_context()?;
        let limit = limit.map_or(self.config.upcoming_limit, |l| l as usize);
        let appointments = Scheduler::with_config(&db, &self.config).upcoming_for(&ctx, Utc::now(), limit)?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// Today's appointments visible to the caller, in time order.
    pub fn todays_appointments(
        &self,
        caller: FfiStaffContext,
    ) -> Result<Vec<FfiAppointment>, VetClinicError> {
        let db = self.db.lock()?;
        let ctx = caller.into_context()?;
        let appointments = Scheduler::with_config(&db, &self.config).todays_appointments_for(
            &ctx,
            Utc::now().date_naive(),
            Some(self.config.today_limit),
        )?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// Unfinished appointments of a veterinarian overlapping the given slot.
    pub fn appointment_conflicts(
        &self,
        veterinarian_id: i64,
        start: String,
        duration_minutes: u32,
    ) -> Result<Vec<FfiAppointment>, VetClinicError> {
        let db = self.db.lock()?;
        let start = parse_timestamp("start", &start)?;
        let appointments =
            Scheduler::with_config(&db, &self.config).conflicts(veterinarian_id, start, duration_minutes)?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// Vaccinations due within `window_days` (configured window when absent).
    pub fn due_vaccinations(&self, window_days: Option<u32>) -> Result<Vec<FfiVaccination>, VetClinicError> {
        let db = self.db.lock()?;
        let window = window_days.unwrap_or(self.config.vaccination_window_days);
        let today = Utc::now().date_naive();
        let due = Scheduler::with_config(&db, &self.config).due_vaccinations(today, window)?;
        Ok(due.into_iter().map(|v| v.into()).collect())
    }

    // =========================================================================
    // Medical Records
    // =========================================================================

    /// Record a consultation signed by the caller.
    pub fn record_consultation(
        &self,
        caller: FfiStaffContext,
        consultation: FfiNewConsultation,
    ) -> Result<FfiConsultation, VetClinicError> {
        let db = self.db.lock()?;
        let ctx = caller.into_context()?;
        let input = consultation.into_input()?;
        Ok(Registry::new(&db).record_consultation(&ctx, &input)?.into())
    }

    pub fn list_consultations(
        &self,
        caller: FfiStaffContext,
        pet_id: Option<i64>,
    ) -> Result<Vec<FfiConsultation>, VetClinicError> {
        let db = self.db.lock()?;
        let ctx = caller.into_context()?;
        let consultations = Registry::new(&db).consultations_for(&ctx, pet_id)?;
        Ok(consultations.into_iter().map(|c| c.into()).collect())
    }

    pub fn record_vaccination(
        &self,
        vaccination: FfiNewVaccination,
    ) -> Result<FfiVaccination, VetClinicError> {
        let db = self.db.lock()?;
        let input = vaccination.into_input()?;
        Ok(Registry::new(&db).record_vaccination(&input)?.into())
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    /// Dashboard as JSON, appointment lists scoped to the caller.
    pub fn dashboard_json(&self, caller: FfiStaffContext) -> Result<String, VetClinicError> {
        let db = self.db.lock()?;
        let ctx = caller.into_context()?;
        let dashboard = ReportAggregator::with_config(&db, &self.config).dashboard_for(&ctx, Utc::now())?;
        Ok(dashboard.to_json()?)
    }

    pub fn species_distribution(&self) -> Result<Vec<FfiSpeciesCount>, VetClinicError> {
        let db = self.db.lock()?;
        let counts = ReportAggregator::with_config(&db, &self.config).species_distribution()?;
        Ok(counts
            .into_iter()
            .map(|c| FfiSpeciesCount {
                species: c.species.as_str().to_string(),
                count: c.count,
            })
            .collect())
    }

    /// Consultation totals for January..December of `year`.
    pub fn monthly_consultation_totals(&self, year: i32) -> Result<Vec<u32>, VetClinicError> {
        let db = self.db.lock()?;
        let totals = ReportAggregator::with_config(&db, &self.config).monthly_consultation_totals(year)?;
        Ok(totals.into_iter().map(|t| t.count).collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// Caller identity. `role` is "admin", "veterinarian" or "receptionist".
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStaffContext {
    pub id: i64,
    pub role: String,
    pub active: bool,
}

impl FfiStaffContext {
    fn into_context(self) -> Result<StaffContext, VetClinicError> {
        Ok(StaffContext {
            id: self.id,
            role: self.role.parse()?,
            active: self.active,
        })
    }
}

/// FFI-safe client input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewClient {
    pub given_name: String,
    pub family_name: String,
    pub national_id: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl From<FfiNewClient> for models::NewClient {
    fn from(client: FfiNewClient) -> Self {
        models::NewClient {
            given_name: client.given_name,
            family_name: client.family_name,
            national_id: client.national_id,
            phone: client.phone,
            email: client.email,
            address: client.address,
        }
    }
}

/// FFI-safe client.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClient {
    pub id: i64,
    pub full_name: String,
    pub given_name: String,
    pub family_name: String,
    pub national_id: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub active: bool,
}

impl From<Client> for FfiClient {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            full_name: client.full_name(),
            given_name: client.given_name,
            family_name: client.family_name,
            national_id: client.national_id,
            phone: client.phone,
            email: client.email,
            address: client.address,
            active: client.active,
        }
    }
}

/// FFI-safe pet input. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPet {
    pub client_id: i64,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub sex: String,
    pub birth_date: Option<String>,
    pub weight_kg: Option<f64>,
    pub color: Option<String>,
    pub photo_url: Option<String>,
    pub allergies: Option<String>,
    pub notes: Option<String>,
}

impl FfiNewPet {
    fn into_input(self) -> Result<models::NewPet, VetClinicError> {
        let mut pet = models::NewPet::new(
            self.client_id,
            self.name,
            self.species.parse()?,
            self.sex.parse()?,
        );
        pet.breed = self.breed;
        pet.birth_date = parse_opt_date("birth_date", self.birth_date)?;
        pet.weight_kg = self.weight_kg;
        pet.color = self.color;
        pet.photo_url = self.photo_url;
        pet.allergies = self.allergies;
        pet.notes = self.notes;
        Ok(pet)
    }
}

/// FFI-safe pet.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPet {
    pub id: i64,
    pub client_id: i64,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub sex: String,
    pub birth_date: Option<String>,
    /// Approximate age in years as of today
    pub age: Option<u32>,
    pub weight_kg: Option<f64>,
    pub color: Option<String>,
    pub photo_url: Option<String>,
    pub status: String,
    pub allergies: Option<String>,
    pub notes: Option<String>,
    pub registered_at: String,
}

impl From<Pet> for FfiPet {
    fn from(pet: Pet) -> Self {
        Self {
            id: pet.id,
            client_id: pet.client_id,
            age: pet.age(),
            species: pet.species.as_str().to_string(),
            sex: pet.sex.as_str().to_string(),
            status: pet.status.as_str().to_string(),
            birth_date: pet.birth_date.map(|d| d.to_string()),
            registered_at: pet.registered_at.to_rfc3339(),
            name: pet.name,
            breed: pet.breed,
            weight_kg: pet.weight_kg,
            color: pet.color,
            photo_url: pet.photo_url,
            allergies: pet.allergies,
            notes: pet.notes,
        }
    }
}

/// What a pet removal took with it.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPetRemoval {
    pub appointments: u32,
    pub consultations: u32,
    pub vaccinations: u32,
}

impl From<db::PetRemoval> for FfiPetRemoval {
    fn from(removal: db::PetRemoval) -> Self {
        Self {
            appointments: removal.appointments,
            consultations: removal.consultations,
            vaccinations: removal.vaccinations,
        }
    }
}

/// FFI-safe staff input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewStaffMember {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
}

impl FfiNewStaffMember {
    fn into_input(self) -> Result<models::NewStaffMember, VetClinicError> {
        let mut staff = models::NewStaffMember::new(self.name, self.email, self.role.parse()?);
        staff.phone = self.phone;
        Ok(staff)
    }
}

/// FFI-safe staff member.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStaffMember {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub active: bool,
    pub joined_at: String,
}

impl From<StaffMember> for FfiStaffMember {
    fn from(staff: StaffMember) -> Self {
        Self {
            id: staff.id,
            role: staff.role.as_str().to_string(),
            joined_at: staff.joined_at.to_rfc3339(),
            name: staff.name,
            email: staff.email,
            phone: staff.phone,
            active: staff.active,
        }
    }
}

/// FFI-safe appointment request. `scheduled_at` is RFC 3339.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointmentRequest {
    pub pet_id: i64,
    pub veterinarian_id: i64,
    pub scheduled_at: String,
    pub reason: String,
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
}

impl FfiAppointmentRequest {
    fn into_request(self) -> Result<AppointmentRequest, VetClinicError> {
        let mut request = AppointmentRequest::new(
            self.pet_id,
            self.veterinarian_id,
            parse_timestamp("scheduled_at", &self.scheduled_at)?,
            self.reason,
        );
        request.duration_minutes = self.duration_minutes;
        request.notes = self.notes;
        Ok(request)
    }
}

/// FFI-safe appointment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: i64,
    pub pet_id: i64,
    pub veterinarian_id: i64,
    pub scheduled_at: String,
    pub ends_at: String,
    pub reason: String,
    pub status: String,
    pub notes: Option<String>,
    pub duration_minutes: u32,
    pub created_at: String,
    pub cancelled_at: Option<String>,
}

impl From<Appointment> for FfiAppointment {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            pet_id: appointment.pet_id,
            veterinarian_id: appointment.veterinarian_id,
            scheduled_at: appointment.scheduled_at.to_rfc3339(),
            ends_at: appointment.ends_at().to_rfc3339(),
            status: appointment.status.as_str().to_string(),
            duration_minutes: appointment.duration_minutes,
            created_at: appointment.created_at.to_rfc3339(),
            cancelled_at: appointment.cancelled_at.map(|ts| ts.to_rfc3339()),
            reason: appointment.reason,
            notes: appointment.notes,
        }
    }
}

/// FFI-safe consultation input.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewConsultation {
    pub appointment_id: i64,
    pub pet_id: i64,
    pub consulted_at: String,
    pub reason: String,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub weight_kg: Option<f64>,
    pub temperature_c: Option<f64>,
    pub heart_rate_bpm: Option<u32>,
    pub notes: Option<String>,
    pub next_visit: Option<String>,
}

impl FfiNewConsultation {
    fn into_input(self) -> Result<models::NewConsultation, VetClinicError> {
        let mut consultation = models::NewConsultation::new(
            self.appointment_id,
            self.pet_id,
            parse_timestamp("consulted_at", &self.consulted_at)?,
            self.reason,
        );
        consultation.symptoms = self.symptoms;
        consultation.diagnosis = self.diagnosis;
        consultation.treatment = self.treatment;
        consultation.weight_kg = self.weight_kg;
        consultation.temperature_c = self.temperature_c;
        consultation.heart_rate_bpm = self.heart_rate_bpm;
        consultation.notes = self.notes;
        consultation.next_visit = parse_opt_date("next_visit", self.next_visit)?;
        Ok(consultation)
    }
}

/// FFI-safe consultation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConsultation {
    pub id: i64,
    pub appointment_id: i64,
    pub pet_id: i64,
    pub veterinarian_id: i64,
    pub consulted_at: String,
    pub reason: String,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub weight_kg: Option<f64>,
    pub temperature_c: Option<f64>,
    pub heart_rate_bpm: Option<u32>,
    pub notes: Option<String>,
    pub next_visit: Option<String>,
}

impl From<Consultation> for FfiConsultation {
    fn from(c: Consultation) -> Self {
        Self {
            id: c.id,
            appointment_id: c.appointment_id,
            pet_id: c.pet_id,
            veterinarian_id: c.veterinarian_id,
            consulted_at: c.consulted_at.to_rfc3339(),
            next_visit: c.next_visit.map(|d| d.to_string()),
            reason: c.reason,
            symptoms: c.symptoms,
            diagnosis: c.diagnosis,
            treatment: c.treatment,
            weight_kg: c.weight_kg,
            temperature_c: c.temperature_c,
            heart_rate_bpm: c.heart_rate_bpm,
            notes: c.notes,
        }
    }
}

/// FFI-safe vaccination input. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewVaccination {
    pub pet_id: i64,
    pub vaccine_name: String,
    pub applied_on: String,
    pub next_dose_on: Option<String>,
    pub veterinarian_id: Option<i64>,
    pub notes: Option<String>,
}

impl FfiNewVaccination {
    fn into_input(self) -> Result<models::NewVaccination, VetClinicError> {
        let mut vaccination = models::NewVaccination::new(
            self.pet_id,
            self.vaccine_name,
            parse_date("applied_on", &self.applied_on)?,
        );
        vaccination.next_dose_on = parse_opt_date("next_dose_on", self.next_dose_on)?;
        vaccination.veterinarian_id = self.veterinarian_id;
        vaccination.notes = self.notes;
        Ok(vaccination)
    }
}

/// FFI-safe vaccination.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVaccination {
    pub id: i64,
    pub pet_id: i64,
    pub vaccine_name: String,
    pub applied_on: String,
    pub next_dose_on: Option<String>,
    pub veterinarian_id: Option<i64>,
    pub notes: Option<String>,
    pub is_overdue: bool,
    pub days_until_next_dose: Option<i64>,
}

impl From<Vaccination> for FfiVaccination {
    fn from(v: Vaccination) -> Self {
        let today = Utc::now().date_naive();
        Self {
            id: v.id,
            pet_id: v.pet_id,
            is_overdue: v.is_overdue_on(today),
            days_until_next_dose: v.days_until_next_dose(today),
            applied_on: v.applied_on.to_string(),
            next_dose_on: v.next_dose_on.map(|d| d.to_string()),
            vaccine_name: v.vaccine_name,
            veterinarian_id: v.veterinarian_id,
            notes: v.notes,
        }
    }
}

/// FFI-safe species count.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSpeciesCount {
    pub species: String,
    pub count: u32,
}

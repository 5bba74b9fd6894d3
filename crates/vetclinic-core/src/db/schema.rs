//! SQLite schema definition.

/// Complete database schema for the clinic.
///
/// Foreign-key actions mirror the engine's own delete rules; the engine checks
/// and cascades explicitly before deleting, so these only act as a backstop.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Staff
-- ============================================================================

CREATE TABLE IF NOT EXISTS staff (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT,
    role TEXT NOT NULL DEFAULT 'receptionist'
        CHECK (role IN ('admin', 'veterinarian', 'receptionist')),
    active INTEGER NOT NULL DEFAULT 1,
    joined_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_staff_role ON staff(role);

-- ============================================================================
-- Clients (soft-deleted via active = 0)
-- ============================================================================

CREATE TABLE IF NOT EXISTS clients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    given_name TEXT NOT NULL,
    family_name TEXT NOT NULL,
    national_id TEXT UNIQUE,
    phone TEXT NOT NULL,
    email TEXT,
    address TEXT,
    active INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_clients_national_id ON clients(national_id);
CREATE INDEX IF NOT EXISTS idx_clients_phone ON clients(phone);
CREATE INDEX IF NOT EXISTS idx_clients_name ON clients(family_name, given_name);

-- ============================================================================
-- Pets
-- ============================================================================

CREATE TABLE IF NOT EXISTS pets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE RESTRICT,
    name TEXT NOT NULL,
    species TEXT NOT NULL
        CHECK (species IN ('dog', 'cat', 'bird', 'rodent', 'reptile', 'other')),
    breed TEXT,
    sex TEXT NOT NULL CHECK (sex IN ('male', 'female')),
    birth_date TEXT,                             -- YYYY-MM-DD
    weight_kg REAL,
    color TEXT,
    photo_url TEXT,
    status TEXT NOT NULL DEFAULT 'active'
        CHECK (status IN ('active', 'deceased', 'transferred')),
    allergies TEXT,
    notes TEXT,
    registered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pets_client ON pets(client_id);
CREATE INDEX IF NOT EXISTS idx_pets_species ON pets(species);

-- ============================================================================
-- Appointments
-- ============================================================================

CREATE TABLE IF NOT EXISTS appointments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pet_id INTEGER NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
    veterinarian_id INTEGER NOT NULL REFERENCES staff(id) ON DELETE RESTRICT,
    scheduled_at TEXT NOT NULL,                  -- RFC 3339, UTC, second precision
    reason TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'confirmed', 'in_progress', 'completed', 'cancelled')),
    notes TEXT,
    duration_minutes INTEGER NOT NULL DEFAULT 30 CHECK (duration_minutes > 0),
    created_at TEXT NOT NULL,
    cancelled_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_appointments_scheduled ON appointments(scheduled_at);
CREATE INDEX IF NOT EXISTS idx_appointments_vet_scheduled ON appointments(veterinarian_id, scheduled_at);
CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments(status);

-- ============================================================================
-- Consultations
-- ============================================================================

CREATE TABLE IF NOT EXISTS consultations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    appointment_id INTEGER NOT NULL REFERENCES appointments(id) ON DELETE CASCADE,
    pet_id INTEGER NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
    veterinarian_id INTEGER NOT NULL REFERENCES staff(id) ON DELETE RESTRICT,
    consulted_at TEXT NOT NULL,
    reason TEXT NOT NULL,
    symptoms TEXT,
    diagnosis TEXT,
    treatment TEXT,
    weight_kg REAL,
    temperature_c REAL,
    heart_rate_bpm INTEGER,
    notes TEXT,
    next_visit TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_consultations_pet ON consultations(pet_id, consulted_at);
CREATE INDEX IF NOT EXISTS idx_consultations_vet ON consultations(veterinarian_id);

-- ============================================================================
-- Vaccinations
-- ============================================================================

CREATE TABLE IF NOT EXISTS vaccinations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pet_id INTEGER NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
    vaccine_name TEXT NOT NULL,
    applied_on TEXT NOT NULL,
    next_dose_on TEXT,
    veterinarian_id INTEGER REFERENCES staff(id) ON DELETE SET NULL,
    notes TEXT,
    registered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_vaccinations_pet ON vaccinations(pet_id);
CREATE INDEX IF NOT EXISTS idx_vaccinations_next_dose ON vaccinations(next_dose_on);
"#;

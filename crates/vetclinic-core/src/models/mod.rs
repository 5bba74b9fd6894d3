//! Domain models for the clinic.

mod appointment;
mod client;
mod consultation;
mod pet;
mod staff;
mod vaccination;
mod validation;

pub use appointment::*;
pub use client::*;
pub use consultation::*;
pub use pet::*;
pub use staff::*;
pub use vaccination::*;
pub use validation::{
    latest_stored_date, latest_stored_instant, now_utc, ValidationError, ValidationResult,
    MAX_STORED_YEAR,
};

//! Engine configuration.
//!
//! Every key is optional; unset keys fall back to the clinic defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use dotenvy::dotenv;
use thiserror::Error;

use crate::models::DEFAULT_DURATION_MINUTES;

/// Longest accepted due-vaccination look-ahead (ten years).
pub const MAX_VACCINATION_WINDOW_DAYS: u32 = 3650;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicConfig {
    /// SQLite file; `None` means in-memory
    pub db_path: Option<PathBuf>,

    // Scheduling
    pub appointment_minutes: u32,
    pub vaccination_window_days: u32,

    // Dashboard and history limits
    pub upcoming_limit: usize,
    pub today_limit: usize,
    pub history_consultations: usize,
    pub history_appointments: usize,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            appointment_minutes: DEFAULT_DURATION_MINUTES,
            vaccination_window_days: 30,
            upcoming_limit: 5,
            today_limit: 10,
            history_consultations: 10,
            history_appointments: 5,
        }
    }
}

impl ClinicConfig {
    /// Read `VETCLINIC_*` variables, loading a `.env` file first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: FromStr>(
            lookup: &dyn Fn(&str) -> Option<String>,
            key: &str,
            default: T,
        ) -> Result<T, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => raw
                    .trim()
                    .parse::<T>()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), raw)),
            }
        }

        let defaults = Self::default();
        let config = Self {
            db_path: lookup("VETCLINIC_DB_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            appointment_minutes: parse(
                &lookup,
                "VETCLINIC_APPOINTMENT_MINUTES",
                defaults.appointment_minutes,
            )?,
            vaccination_window_days: parse(
                &lookup,
                "VETCLINIC_VACCINATION_WINDOW_DAYS",
                defaults.vaccination_window_days,
            )?,
            upcoming_limit: parse(&lookup, "VETCLINIC_UPCOMING_LIMIT", defaults.upcoming_limit)?,
            today_limit: parse(&lookup, "VETCLINIC_TODAY_LIMIT", defaults.today_limit)?,
            history_consultations: parse(
                &lookup,
                "VETCLINIC_HISTORY_CONSULTATIONS",
                defaults.history_consultations,
            )?,
            history_appointments: parse(
                &lookup,
                "VETCLINIC_HISTORY_APPOINTMENTS",
                defaults.history_appointments,
            )?,
        };

        if config.appointment_minutes == 0 {
            return Err(ConfigError::InvalidValue(
                "VETCLINIC_APPOINTMENT_MINUTES".into(),
                "0".into(),
            ));
        }
        if config.vaccination_window_days > MAX_VACCINATION_WINDOW_DAYS {
            return Err(ConfigError::InvalidValue(
                "VETCLINIC_VACCINATION_WINDOW_DAYS".into(),
                config.vaccination_window_days.to_string(),
            ));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ClinicConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClinicConfig::default());
        assert_eq!(config.appointment_minutes, 30);
        assert_eq!(config.vaccination_window_days, 30);
    }

    #[test]
    fn test_overrides() {
        let config = ClinicConfig::from_lookup(lookup(&[
            ("VETCLINIC_DB_PATH", "/var/lib/clinic.db"),
            ("VETCLINIC_APPOINTMENT_MINUTES", "45"),
            ("VETCLINIC_UPCOMING_LIMIT", " 8 "),
        ]))
        .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/clinic.db")));
        assert_eq!(config.appointment_minutes, 45);
        assert_eq!(config.upcoming_limit, 8);
        assert_eq!(config.today_limit, 10);
    }

    #[test]
    fn test_invalid_number() {
        let err = ClinicConfig::from_lookup(lookup(&[("VETCLINIC_TODAY_LIMIT", "ten")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue("VETCLINIC_TODAY_LIMIT".into(), "ten".into())
        );
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(ClinicConfig::from_lookup(lookup(&[("VETCLINIC_APPOINTMENT_MINUTES", "0")])).is_err());
    }

    #[test]
    fn test_vaccination_window_bounded() {
        let config =
            ClinicConfig::from_lookup(lookup(&[("VETCLINIC_VACCINATION_WINDOW_DAYS", "3650")])).unwrap();
        assert_eq!(config.vaccination_window_days, MAX_VACCINATION_WINDOW_DAYS);

        let err = ClinicConfig::from_lookup(lookup(&[(
            "VETCLINIC_VACCINATION_WINDOW_DAYS",
            "4294967295",
        )]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue(
                "VETCLINIC_VACCINATION_WINDOW_DAYS".into(),
                "4294967295".into()
            )
        );
    }
}

//! Field validation shared by all input structs.

use chrono::{DateTime, Datelike, NaiveDate, SubsecRound, TimeZone, Utc};
use thiserror::Error;

/// Input validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown value for {field}: {value}")]
    UnknownValue { field: &'static str, value: String },

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trim a required text field, rejecting blank input.
pub(crate) fn require_text(field: &'static str, value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank becomes `None`.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub(crate) fn max_len(field: &'static str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::Invalid {
            field,
            reason: format!("longer than {} characters", max),
        });
    }
    Ok(())
}

/// Minimal shape check: one `@` with text on both sides and a dot in the domain.
pub(crate) fn check_email(field: &'static str, value: &str) -> ValidationResult<()> {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(ValidationError::Invalid {
            field,
            reason: format!("'{}' is not an e-mail address", value),
        });
    }
    Ok(())
}

pub(crate) fn check_positive(field: &'static str, value: Option<f64>) -> ValidationResult<()> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(ValidationError::Invalid {
            field,
            reason: format!("{} must be greater than zero", v),
        }),
        _ => Ok(()),
    }
}

/// Last year the store's fixed-width `YYYY` text encoding can hold.
pub const MAX_STORED_YEAR: i32 = 9999;

/// Last calendar day the store can hold.
pub fn latest_stored_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(MAX_STORED_YEAR, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Last instant the store can hold.
pub fn latest_stored_instant() -> DateTime<Utc> {
    latest_stored_date()
        .and_hms_opt(23, 59, 59)
        .map_or(DateTime::<Utc>::MAX_UTC, |last| Utc.from_utc_datetime(&last))
}

pub(crate) fn check_stored_date(field: &'static str, value: NaiveDate) -> ValidationResult<()> {
    if !(0..=MAX_STORED_YEAR).contains(&value.year()) {
        return Err(ValidationError::Invalid {
            field,
            reason: format!("{} is outside years 0000-{}", value, MAX_STORED_YEAR),
        });
    }
    Ok(())
}

pub(crate) fn check_stored_instant(field: &'static str, value: DateTime<Utc>) -> ValidationResult<()> {
    check_stored_date(field, value.date_naive())
}

/// Current UTC time truncated to whole seconds (storage precision).
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("name", "  Rex ").unwrap(), "Rex");
        assert_eq!(
            require_text("name", "   "),
            Err(ValidationError::MissingField("name"))
        );
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" x ")), Some("x".into()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_check_email() {
        assert!(check_email("email", "ana@example.com").is_ok());
        assert!(check_email("email", "ana.example.com").is_err());
        assert!(check_email("email", "@example.com").is_err());
        assert!(check_email("email", "ana@example").is_err());
        assert!(check_email("email", "ana@@example.com").is_err());
    }

    #[test]
    fn test_check_positive() {
        assert!(check_positive("weight_kg", None).is_ok());
        assert!(check_positive("weight_kg", Some(4.5)).is_ok());
        assert!(check_positive("weight_kg", Some(0.0)).is_err());
        assert!(check_positive("weight_kg", Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_stored_range() {
        let last = latest_stored_date();
        assert_eq!(last, NaiveDate::from_ymd_opt(9999, 12, 31).unwrap());
        assert!(check_stored_date("applied_on", last).is_ok());
        assert!(check_stored_date("applied_on", last.succ_opt().unwrap()).is_err());
        assert!(check_stored_date("applied_on", NaiveDate::from_ymd_opt(-1, 1, 1).unwrap()).is_err());

        let instant = latest_stored_instant();
        assert_eq!(instant, Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap());
        assert!(check_stored_instant("scheduled_at", instant).is_ok());
        assert!(check_stored_instant("scheduled_at", instant + chrono::Duration::seconds(1)).is_err());
    }

    #[test]
    fn test_now_utc_has_no_subseconds() {
        assert_eq!(now_utc().timestamp_subsec_nanos(), 0);
    }
}

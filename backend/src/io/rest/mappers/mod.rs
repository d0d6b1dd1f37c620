//! Conversions between the `shared` DTOs and domain types.
//!
//! Dates travel as `YYYY-MM-DD` strings and timestamps as RFC 3339.
//! Parsing problems are collected so a request reports all of them.

pub mod account_mapper;
pub mod animal_mapper;
pub mod breeding_mapper;
pub mod species_mapper;
pub mod study_mapper;

pub use account_mapper::AccountMapper;
pub use animal_mapper::{AncestryMapper, AnimalMapper};
pub use breeding_mapper::BreedingMapper;
pub use species_mapper::SpeciesMapper;
pub use study_mapper::StudyMapper;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::errors::DomainError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| format!("{} must be a date in YYYY-MM-DD format, got '{}'", field, value))
}

/// Parse an optional date; blank counts as absent
pub fn parse_optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => parse_date(field, v).map(Some),
        None => Ok(None),
    }
}

pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| format!("{} must be an RFC 3339 timestamp, got '{}'", field, value))
}

/// Validation error listing each parse failure
pub fn collect_errors<const N: usize>(errors: [Option<String>; N]) -> DomainError {
    DomainError::Validation(errors.into_iter().flatten().collect())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("date_of_birth", " 2024-02-29 "), Ok(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert_eq!(
            parse_date("date_of_birth", "29/02/2024").unwrap_err(),
            "date_of_birth must be a date in YYYY-MM-DD format, got '29/02/2024'"
        );
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date("end_date", None), Ok(None));
        assert_eq!(parse_optional_date("end_date", Some("")), Ok(None));
        assert!(parse_optional_date("end_date", Some("soon")).is_err());
    }

    #[test]
    fn test_parse_timestamp_normalises_to_utc() {
        let parsed = parse_timestamp("recorded_at", "2024-06-01T10:00:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-06-01T08:00:00+00:00");
    }
}

//! # Error Types
//!
//! Domain-specific error types for rental-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rental-core errors (this file)                                        │
//! │  ├── CoreError        - Availability / confirmation failures           │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── LoadError        - Malformed fleet file rows                      │
//! │                                                                         │
//! │  rental-session errors                                                 │
//! │  ├── SessionError     - Lookup failures, renter identity               │
//! │  └── ReservationError - What the renter sees                           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SessionError → ReservationError  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{CarId, Period};

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by `CarRentalCompany`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The company does not offer the requested car type at all.
    #[error("{company} has no car type '{car_type}'")]
    UnknownCarType { company: String, car_type: String },

    /// Every car of the requested type is booked for (part of) the period.
    ///
    /// ## User Workflow
    /// ```text
    /// create_quote(sedan, 1 → 3)
    ///      │
    ///      ▼
    /// sedan #0 busy, sedan #1 busy
    ///      │
    ///      ▼
    /// UnavailableCarType ──► renter retries with other dates or type
    /// ```
    #[error("no {car_type} available at {company} for {period}")]
    UnavailableCarType {
        company: String,
        car_type: String,
        period: Period,
    },

    /// The quote was valid when issued but another confirmation took the
    /// last free car in the meantime.
    #[error("{car_type} at {company} for {period} was taken before confirmation")]
    ReservationConflict {
        company: String,
        car_type: String,
        period: Period,
    },

    /// Daily price times rental days does not fit in a `Money`.
    #[error("price of {car_type} at {company} for {period} is too large")]
    PriceTooLarge {
        company: String,
        car_type: String,
        period: Period,
    },

    /// A quote was handed to a company that did not issue it.
    #[error("quote belongs to {quoted}, not {company}")]
    WrongCompany { company: String, quoted: String },

    /// A car references a type the company does not own.
    #[error("car type '{car_type}' is not registered with {company}")]
    CarTypeNotRegistered { company: String, car_type: String },

    /// The company has no car with this id.
    #[error("{company} has no car with id {car_id}")]
    UnknownCar { company: String, car_id: CarId },

    /// Car ids are unique within a company.
    #[error("{company} already has a car with id {car_id}")]
    DuplicateCar { company: String, car_id: CarId },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. a price with three decimals).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// End date before start date.
    #[error("rental period ends ({end}) before it starts ({start})")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    /// Dates outside years 1 through 9999.
    #[error("date {date} is outside the supported range")]
    DateOutOfRange { date: NaiveDate },
}

// =============================================================================
// Load Error
// =============================================================================

/// Errors raised while parsing a fleet file.
///
/// Line numbers are 1-based and count comment lines too, so they match what
/// an editor shows.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("line {line}: missing field '{field}'")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: unexpected extra field '{value}'")]
    ExtraField { line: usize, value: String },

    #[error("line {line}: invalid {field} '{value}': {reason}")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
        reason: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnavailableCarType {
            company: "Hertz".to_string(),
            car_type: "sedan".to_string(),
            period: Period::new(day(1), day(3)).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "no sedan available at Hertz for 2026-03-01..2026-03-03"
        );

        let err = CoreError::DuplicateCar {
            company: "Hertz".to_string(),
            car_id: 7,
        };
        assert_eq!(err.to_string(), "Hertz already has a car with id 7");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "renter".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_load_error_messages() {
        let err = LoadError::MissingField {
            line: 3,
            field: "fleet_size",
        };
        assert_eq!(err.to_string(), "line 3: missing field 'fleet_size'");
    }
}

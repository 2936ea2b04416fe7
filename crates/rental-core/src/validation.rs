//! # Validation Module
//!
//! Input validation for names and car types.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Fleet loader / session entry points                          │
//! │  └── THIS MODULE: names present, prices and seats positive             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CarRentalCompany                                             │
//! │  └── Invariants: car types registered, car ids unique                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── PRIMARY KEY / UNIQUE constraints                                  │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::CarType;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates that a name-like field is present.
///
/// ## Example
/// ```rust
/// use rental_core::validation::validate_name;
///
/// assert!(validate_name("company", "Hertz").is_ok());
/// assert!(validate_name("company", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a car type before it is registered with a company.
///
/// ## Rules
/// - Name must not be empty
/// - At least one seat
/// - Daily price must be positive
/// - Trunk space must be a finite, non-negative number
pub fn validate_car_type(car_type: &CarType) -> ValidationResult<()> {
    validate_name("car_type", &car_type.name)?;

    if car_type.seats == 0 {
        return Err(ValidationError::MustBePositive {
            field: "seats".to_string(),
        });
    }

    if !car_type.daily_price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "daily_price".to_string(),
        });
    }

    if !car_type.trunk_space.is_finite() || car_type.trunk_space < 0.0 {
        return Err(ValidationError::InvalidFormat {
            field: "trunk_space".to_string(),
            reason: "must be a non-negative number".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

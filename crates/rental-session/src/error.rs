//! # Session Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StoreError        - What a RentalStore backend reports                │
//! │  SessionError      - Everything a session operation can fail with      │
//! │  ReservationError  - Renter-facing wrapper for quote / confirm         │
//! │                                                                         │
//! │  CoreError ─┐                                                          │
//! │  LoadError ─┼──► SessionError ──► ReservationError                     │
//! │  StoreError ┘                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rental_core::{CarId, CoreError, LoadError, Period};
use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Failures reported by a [`RentalStore`](crate::RentalStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A referenced company, car type or car does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A reservation in a committed batch overlaps one already stored.
    #[error("car {car_id} ({car_type}) at {company} is already booked during {period}")]
    Conflict {
        company: String,
        car_type: String,
        car_id: CarId,
        period: Period,
    },

    /// Backend specific failure (connection, corrupt row, ...).
    #[error("Storage error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Session Error
// =============================================================================

#[derive(Debug, Error)]
pub enum SessionError {
    /// The renter name of a reservation session can be set once.
    #[error("renter is already set to '{renter}'")]
    AlreadySet { renter: String },

    #[error("no renter set for this session")]
    RenterNotSet,

    #[error("company not found: {0}")]
    CompanyNotFound(String),

    #[error("company already exists: {0}")]
    DuplicateCompany(String),

    #[error("{company} has no car type '{car_type}'")]
    CarTypeNotFound { company: String, car_type: String },

    #[error("{company} has no car {car_id} of the requested type")]
    CarNotFound { company: String, car_id: CarId },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("fleet file rejected: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type SessionResult<T> = Result<T, SessionError>;

// =============================================================================
// Reservation Error
// =============================================================================

/// Renter-facing failure of quote creation or confirmation.
///
/// ## Confirmation Is All-or-Nothing
/// ```text
/// confirm_quotes([q1, q2, q3])
///      │
///      ├── q1 ok, q2 ok, q3 conflict
///      ▼
/// ReservationError::Confirm { pending: 3, .. }
///      │
///      └── nothing stored, all 3 quotes still held by the session
/// ```
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("could not create quote at {company}: {source}")]
    Quote {
        company: String,
        #[source]
        source: SessionError,
    },

    #[error("none of the {pending} quote(s) were confirmed: {source}")]
    Confirm {
        pending: usize,
        #[source]
        source: SessionError,
    },
}

impl ReservationError {
    /// The underlying failure.
    pub fn cause(&self) -> &SessionError {
        match self {
            ReservationError::Quote { source, .. } | ReservationError::Confirm { source, .. } => {
                source
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

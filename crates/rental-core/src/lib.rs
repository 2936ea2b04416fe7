//! # rental-core: Pure Domain Logic for Car Rental
//!
//! This crate is the **heart** of the reservation system. It contains the
//! rules for availability, quote pricing and confirmation as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Car Rental Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                rental-session (Sessions)                        │   │
//! │  │    ReservationSession ──► create_quote / confirm_quotes        │   │
//! │  │    ManagerSession     ──► add_new_car / statistics             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rental-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  company  │  │   money   │  │  loader   │  │   │
//! │  │   │  CarType  │  │ CarRental │  │   Money   │  │ FleetRow  │  │   │
//! │  │   │  Quote    │  │  Company  │  │           │  │  parsing  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    rental-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, SqliteStore            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain values (CarType, Car, Period, Quote, Reservation)
//! - [`company`] - `CarRentalCompany`: availability, pricing, confirmation
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`loader`] - Parsing of the comma-separated fleet format
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rental_core::{CarRentalCompany, CarType, Money, ReservationConstraints};
//!
//! let mut hertz = CarRentalCompany::new("Hertz");
//! hertz.add_car_type(CarType::new("sedan", 4, 2.5, Money::from_cents(5000), false)).unwrap();
//! hertz.add_car(0, "sedan").unwrap();
//!
//! let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
//! let constraints = ReservationConstraints::new(start, end, "sedan").unwrap();
//!
//! let quote = hertz.create_quote(&constraints, "alice").unwrap();
//! assert_eq!(quote.price, Money::from_cents(10000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod company;
pub mod error;
pub mod loader;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use company::CarRentalCompany;
pub use error::{CoreError, CoreResult, LoadError, ValidationError};
pub use loader::{parse_fleet, FleetRow};
pub use money::Money;
pub use types::*;

//! # rental-db: Database Layer for the Car Rental Manager
//!
//! SQLite persistence for companies, fleets and reservations, exposed to the
//! sessions as a [`RentalStore`](rental_session::RentalStore).
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Car Rental Data Flow                             │
//! │                                                                         │
//! │  ReservationSession / ManagerSession                                   │
//! │       │  Arc<dyn RentalStore>                                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     rental-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │ CompanyRepository  │  │ (embedded) │  │   │
//! │  │   │  SqlitePool   │◄───│ ReservationRepo    │  │ 001_init   │  │   │
//! │  │   └───────────────┘    └─────────┬──────────┘  └────────────┘  │   │
//! │  │                                  │                              │   │
//! │  │                            SqliteStore                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (rental.db)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - SQL per aggregate
//! - [`store`] - `SqliteStore`, the `RentalStore` implementation
//! - [`config`] - Layered settings (file + `RENTAL_*` env)
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rental_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("rental.db")).await?;
//! let store = Arc::new(db.store());
//! let manager = ManagerSession::new(store.clone());
//! manager.load_company("Hertz", &std::fs::read_to_string("hertz.csv")?).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, RentalSettings};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use store::SqliteStore;

pub use repository::company::CompanyRepository;
pub use repository::reservation::ReservationRepository;

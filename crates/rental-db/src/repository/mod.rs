//! # Repository Module
//!
//! SQL for the rental database, one repository per aggregate.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SqliteStore (RentalStore impl)                                        │
//! │       │                                                                 │
//! │       ├── CompanyRepository                                            │
//! │       │   ├── list_names / insert / insert_fleet                       │
//! │       │   ├── insert_car_type / find_car_type                          │
//! │       │   ├── insert_car / find_car                                    │
//! │       │   └── load  (whole company, one read transaction)              │
//! │       │                                                                 │
//! │       └── ReservationRepository                                        │
//! │           ├── insert_batch   (one write transaction, overlap guard)    │
//! │           └── count_by_renter                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries use the runtime `sqlx::query` API with `FromRow` row structs, so
//! building the crate does not need a live database.

pub mod company;
pub mod reservation;

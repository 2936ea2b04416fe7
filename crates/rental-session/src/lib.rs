//! # rental-session: Reservation and Manager Sessions
//!
//! Orchestrates the domain logic of `rental-core` across every company held
//! by a [`RentalStore`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Car Rental Data Flow                             │
//! │                                                                         │
//! │  Caller (CLI, RPC handler, test)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 rental-session (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────────┐        ┌────────────────────┐         │   │
//! │  │   │ ReservationSession │        │   ManagerSession   │         │   │
//! │  │   │  renter + quotes   │        │  fleet setup       │         │   │
//! │  │   │  confirm (atomic)  │        │  statistics        │         │   │
//! │  │   └─────────┬──────────┘        └─────────┬──────────┘         │   │
//! │  │             └───────────┬─────────────────┘                    │   │
//! │  │                         ▼                                      │   │
//! │  │                 dyn RentalStore                                │   │
//! │  └─────────────────────────┬───────────────────────────────────────┘   │
//! │             ┌──────────────┴──────────────┐                            │
//! │             ▼                             ▼                            │
//! │      InMemoryStore                 SqliteStore (rental-db)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sessions Are Plain Values
//! There is no session registry. A caller creates a `ReservationSession` per
//! renter, keeps it for the duration of the unit of work, and drops it.
//!
//! ## Usage
//! ```rust,ignore
//! let store = Arc::new(InMemoryStore::new());
//! let manager = ManagerSession::new(store.clone());
//! manager.load_company("Hertz", &fleet_text).await?;
//!
//! let mut session = ReservationSession::new(store);
//! session.set_renter_name("alice")?;
//! session.create_quote("Hertz", &constraints).await?;
//! let reservations = session.confirm_quotes().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod manager;
pub mod memory;
pub mod reservation;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ReservationError, SessionError, SessionResult, StoreError, StoreResult};
pub use manager::{LoadSummary, ManagerSession};
pub use memory::InMemoryStore;
pub use reservation::ReservationSession;
pub use store::RentalStore;

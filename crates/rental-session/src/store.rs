//! # Repository Interface
//!
//! The one seam between the sessions and persistence. Sessions never see a
//! connection pool or a lock; they see a [`RentalStore`].
//!
//! ## Contract
//! - Company names come back sorted ascending.
//! - `find_company` returns a fully populated snapshot: car types, cars and
//!   their reservations. Mutating the snapshot changes nothing stored.
//! - `insert_fleet` is atomic: a company is stored with all of its car types
//!   and cars, or not at all.
//! - `commit_reservations` is atomic. Either every reservation of the batch
//!   is stored or none is, and overlap with stored reservations is checked
//!   inside the same critical section that writes.

use async_trait::async_trait;
use rental_core::{Car, CarId, CarRentalCompany, CarType, Reservation};

use crate::error::StoreResult;

#[async_trait]
pub trait RentalStore: Send + Sync {
    /// Names of every registered company, ascending.
    async fn company_names(&self) -> StoreResult<Vec<String>>;

    async fn find_company(&self, name: &str) -> StoreResult<Option<CarRentalCompany>>;

    async fn find_car_type(&self, company: &str, name: &str) -> StoreResult<Option<CarType>>;

    /// A single car with its reservations.
    async fn find_car(&self, company: &str, id: CarId) -> StoreResult<Option<Car>>;

    /// Fails with `Duplicate` if the name is taken.
    async fn insert_company(&self, name: &str) -> StoreResult<()>;

    /// No-op when the company already has a type with this name.
    async fn insert_car_type(&self, company: &str, car_type: &CarType) -> StoreResult<()>;

    async fn insert_car(&self, company: &str, id: CarId, car_type: &str) -> StoreResult<()>;

    /// Stores a new company together with its car types and cars, all or
    /// nothing. Fails with `Duplicate` if the name is taken.
    async fn insert_fleet(&self, company: &CarRentalCompany) -> StoreResult<()>;

    /// Stores a batch of reservations, all or nothing.
    async fn commit_reservations(&self, reservations: &[Reservation]) -> StoreResult<()>;

    /// Reservations made by `renter` across all companies.
    async fn count_reservations_by(&self, renter: &str) -> StoreResult<usize>;
}

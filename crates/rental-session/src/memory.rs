//! # In-Memory Store
//!
//! A [`RentalStore`] over a map of companies behind a single async RwLock.
//! Used by tests and by callers that do not need durability.
//!
//! Every write takes the write lock for its whole duration, which is what
//! makes `commit_reservations` atomic: the batch is applied to copies of the
//! affected companies and swapped in only if every reservation fits.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rental_core::{Car, CarId, CarRentalCompany, CarType, CoreError, Reservation};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::RentalStore;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    companies: RwLock<BTreeMap<String, CarRentalCompany>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn company_not_found(name: &str) -> StoreError {
    StoreError::NotFound {
        entity: "company".to_string(),
        id: name.to_string(),
    }
}

fn rejected(err: CoreError, reservation: Option<&Reservation>) -> StoreError {
    match (err, reservation) {
        (CoreError::ReservationConflict { company, car_type, period }, Some(r)) => {
            StoreError::Conflict {
                company,
                car_type,
                car_id: r.car_id,
                period,
            }
        }
        (CoreError::UnknownCar { company, car_id }, _) => StoreError::NotFound {
            entity: "car".to_string(),
            id: format!("{company}/{car_id}"),
        },
        (CoreError::CarTypeNotRegistered { company, car_type }, _) => StoreError::NotFound {
            entity: "car type".to_string(),
            id: format!("{company}/{car_type}"),
        },
        (CoreError::DuplicateCar { company, car_id }, _) => StoreError::Duplicate {
            field: "car".to_string(),
            value: format!("{company}/{car_id}"),
        },
        (other, _) => StoreError::Backend(other.to_string()),
    }
}

#[async_trait]
impl RentalStore for InMemoryStore {
    async fn company_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.companies.read().await.keys().cloned().collect())
    }

    async fn find_company(&self, name: &str) -> StoreResult<Option<CarRentalCompany>> {
        Ok(self.companies.read().await.get(name).cloned())
    }

    async fn find_car_type(&self, company: &str, name: &str) -> StoreResult<Option<CarType>> {
        let companies = self.companies.read().await;
        Ok(companies
            .get(company)
            .and_then(|c| c.car_type(name))
            .cloned())
    }

    async fn find_car(&self, company: &str, id: CarId) -> StoreResult<Option<Car>> {
        let companies = self.companies.read().await;
        Ok(companies.get(company).and_then(|c| c.car(id)).cloned())
    }

    async fn insert_company(&self, name: &str) -> StoreResult<()> {
        let mut companies = self.companies.write().await;
        if companies.contains_key(name) {
            return Err(StoreError::Duplicate {
                field: "company".to_string(),
                value: name.to_string(),
            });
        }
        companies.insert(name.to_string(), CarRentalCompany::new(name));
        debug!(company = %name, "Company stored");
        Ok(())
    }

    async fn insert_car_type(&self, company: &str, car_type: &CarType) -> StoreResult<()> {
        let mut companies = self.companies.write().await;
        let entry = companies
            .get_mut(company)
            .ok_or_else(|| company_not_found(company))?;
        entry
            .add_car_type(car_type.clone())
            .map_err(|e| rejected(e, None))?;
        Ok(())
    }

    async fn insert_car(&self, company: &str, id: CarId, car_type: &str) -> StoreResult<()> {
        let mut companies = self.companies.write().await;
        let entry = companies
            .get_mut(company)
            .ok_or_else(|| company_not_found(company))?;
        entry.add_car(id, car_type).map_err(|e| rejected(e, None))?;
        Ok(())
    }

    async fn insert_fleet(&self, company: &CarRentalCompany) -> StoreResult<()> {
        let mut companies = self.companies.write().await;
        if companies.contains_key(company.name()) {
            return Err(StoreError::Duplicate {
                field: "company".to_string(),
                value: company.name().to_string(),
            });
        }
        companies.insert(company.name().to_string(), company.clone());
        debug!(
            company = %company.name(),
            cars = company.cars().count(),
            "Fleet stored"
        );
        Ok(())
    }

    async fn commit_reservations(&self, reservations: &[Reservation]) -> StoreResult<()> {
        let mut companies = self.companies.write().await;

        let mut working: BTreeMap<&str, CarRentalCompany> = BTreeMap::new();
        for reservation in reservations {
            let name = reservation.company();
            if !working.contains_key(name) {
                let current = companies.get(name).ok_or_else(|| company_not_found(name))?;
                working.insert(name, current.clone());
            }
            if let Some(company) = working.get_mut(name) {
                company
                    .record_reservation(reservation.clone())
                    .map_err(|e| rejected(e, Some(reservation)))?;
            }
        }

        for (name, company) in working {
            companies.insert(name.to_string(), company);
        }
        debug!(count = reservations.len(), "Reservations committed");
        Ok(())
    }

    async fn count_reservations_by(&self, renter: &str) -> StoreResult<usize> {
        let companies = self.companies.read().await;
        Ok(companies
            .values()
            .map(|c| c.reservations_by(renter).len())
            .sum())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rental_core::{Money, ReservationConstraints};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    async fn hertz_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert_company("Hertz").await.unwrap();
        let sedan = CarType::new("sedan", 4, 2.5, Money::from_cents(5000), false);
        store.insert_car_type("Hertz", &sedan).await.unwrap();
        store.insert_car("Hertz", 0, "sedan").await.unwrap();
        store
    }

    fn reservation(store_copy: &mut CarRentalCompany, renter: &str, from: u32, to: u32) -> Reservation {
        let constraints = ReservationConstraints::new(day(from), day(to), "sedan").unwrap();
        let quote = store_copy.create_quote(&constraints, renter).unwrap();
        store_copy.confirm_quote(&quote).unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_company() {
        let store = hertz_store().await;
        assert!(matches!(
            store.insert_company("Hertz").await,
            Err(StoreError::Duplicate { .. })
        ));
        assert_eq!(store.company_names().await.unwrap(), vec!["Hertz"]);
    }

    #[tokio::test]
    async fn test_snapshot_is_detached() {
        let store = hertz_store().await;
        let mut copy = store.find_company("Hertz").await.unwrap().unwrap();
        reservation(&mut copy, "alice", 1, 3);
        assert_eq!(copy.total_reservations(), 1);

        let fresh = store.find_company("Hertz").await.unwrap().unwrap();
        assert_eq!(fresh.total_reservations(), 0);
    }

    #[tokio::test]
    async fn test_commit_is_all_or_nothing() {
        let store = hertz_store().await;

        let mut first = store.find_company("Hertz").await.unwrap().unwrap();
        let taken = reservation(&mut first, "bob", 2, 4);
        store.commit_reservations(&[taken]).await.unwrap();

        // Built against a stale snapshot: the second one overlaps bob's.
        let mut stale = CarRentalCompany::new("Hertz");
        stale
            .add_car_type(CarType::new("sedan", 4, 2.5, Money::from_cents(5000), false))
            .unwrap();
        stale.add_car(0, "sedan").unwrap();
        let fine = reservation(&mut stale, "alice", 10, 12);
        let clash = reservation(&mut stale, "alice", 3, 5);

        let err = store.commit_reservations(&[fine, clash]).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { car_id: 0, .. }));

        assert_eq!(store.count_reservations_by("alice").await.unwrap(), 0);
        assert_eq!(store.count_reservations_by("bob").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_fleet() {
        let store = hertz_store().await;

        let mut avis = CarRentalCompany::new("Avis");
        avis.add_car_type(CarType::new("van", 8, 6.0, Money::from_cents(9000), true))
            .unwrap();
        avis.add_car(0, "van").unwrap();
        store.insert_fleet(&avis).await.unwrap();
        assert_eq!(store.find_car("Avis", 0).await.unwrap().unwrap().car_type(), "van");

        // A second fleet under a taken name changes nothing.
        let mut clash = CarRentalCompany::new("Hertz");
        clash
            .add_car_type(CarType::new("van", 8, 6.0, Money::from_cents(9000), true))
            .unwrap();
        assert!(matches!(
            store.insert_fleet(&clash).await,
            Err(StoreError::Duplicate { .. })
        ));
        assert!(store.find_car_type("Hertz", "van").await.unwrap().is_none());
        assert_eq!(store.company_names().await.unwrap(), vec!["Avis", "Hertz"]);
    }

    #[tokio::test]
    async fn test_find_car_and_type() {
        let store = hertz_store().await;
        assert!(store.find_car_type("Hertz", "sedan").await.unwrap().is_some());
        assert!(store.find_car_type("Hertz", "van").await.unwrap().is_none());
        assert!(store.find_car_type("Avis", "sedan").await.unwrap().is_none());
        assert_eq!(store.find_car("Hertz", 0).await.unwrap().unwrap().car_type(), "sedan");
        assert!(store.find_car("Hertz", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_car_unknown_type() {
        let store = hertz_store().await;
        assert!(matches!(
            store.insert_car("Hertz", 1, "van").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.insert_car("Hertz", 0, "sedan").await,
            Err(StoreError::Duplicate { .. })
        ));
    }
}

//! # SQLite-backed RentalStore
//!
//! Adapts the repositories to the trait the sessions program against.
//! Nothing is cached: every call reads the database.

use async_trait::async_trait;
use rental_core::{Car, CarId, CarRentalCompany, CarType, Reservation};
use rental_session::{RentalStore, StoreResult};

use crate::repository::company::CompanyRepository;
use crate::repository::reservation::ReservationRepository;

#[derive(Debug, Clone)]
pub struct SqliteStore {
    companies: CompanyRepository,
    reservations: ReservationRepository,
}

impl SqliteStore {
    pub fn new(companies: CompanyRepository, reservations: ReservationRepository) -> Self {
        SqliteStore {
            companies,
            reservations,
        }
    }
}

#[async_trait]
impl RentalStore for SqliteStore {
    async fn company_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.companies.list_names().await?)
    }

    async fn find_company(&self, name: &str) -> StoreResult<Option<CarRentalCompany>> {
        Ok(self.companies.load(name).await?)
    }

    async fn find_car_type(&self, company: &str, name: &str) -> StoreResult<Option<CarType>> {
        Ok(self.companies.find_car_type(company, name).await?)
    }

    async fn find_car(&self, company: &str, id: CarId) -> StoreResult<Option<Car>> {
        Ok(self.companies.find_car(company, id).await?)
    }

    async fn insert_company(&self, name: &str) -> StoreResult<()> {
        Ok(self.companies.insert(name).await?)
    }

    async fn insert_car_type(&self, company: &str, car_type: &CarType) -> StoreResult<()> {
        Ok(self.companies.insert_car_type(company, car_type).await?)
    }

    async fn insert_car(&self, company: &str, id: CarId, car_type: &str) -> StoreResult<()> {
        Ok(self.companies.insert_car(company, id, car_type).await?)
    }

    async fn insert_fleet(&self, company: &CarRentalCompany) -> StoreResult<()> {
        Ok(self.companies.insert_fleet(company).await?)
    }

    async fn commit_reservations(&self, reservations: &[Reservation]) -> StoreResult<()> {
        Ok(self.reservations.insert_batch(reservations).await?)
    }

    async fn count_reservations_by(&self, renter: &str) -> StoreResult<usize> {
        Ok(self.reservations.count_by_renter(renter).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use rental_core::{CoreError, Money, Period, ReservationConstraints};
    use rental_session::{ManagerSession, ReservationError, ReservationSession, SessionError, StoreError};
    use std::sync::Arc;

    const HERTZ: &str = "\
# name,seats,trunk,price,smoking,fleet
sedan,4,2.5,50.0,false,2
van,8,6,90,true,1
";

    const AVIS: &str = "\
compact,4,1.5,35,false,1
sedan,4,2.5,50.0,false,1
";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn wants(car_type: &str, from: u32, to: u32) -> ReservationConstraints {
        ReservationConstraints::new(day(from), day(to), car_type).unwrap()
    }

    async fn setup() -> Arc<SqliteStore> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(db.store());
        let manager = ManagerSession::new(store.clone());
        manager.load_company("Hertz", HERTZ).await.unwrap();
        manager.load_company("Avis", AVIS).await.unwrap();
        store
    }

    /// Yields after every company snapshot, so sessions joined on one task
    /// all read before any of them commits.
    struct Interleaved(Arc<SqliteStore>);

    #[async_trait]
    impl RentalStore for Interleaved {
        async fn company_names(&self) -> StoreResult<Vec<String>> {
            self.0.company_names().await
        }

        async fn find_company(&self, name: &str) -> StoreResult<Option<CarRentalCompany>> {
            let company = self.0.find_company(name).await;
            tokio::task::yield_now().await;
            company
        }

        async fn find_car_type(&self, company: &str, name: &str) -> StoreResult<Option<CarType>> {
            self.0.find_car_type(company, name).await
        }

        async fn find_car(&self, company: &str, id: CarId) -> StoreResult<Option<Car>> {
            self.0.find_car(company, id).await
        }

        async fn insert_company(&self, name: &str) -> StoreResult<()> {
            self.0.insert_company(name).await
        }

        async fn insert_car_type(&self, company: &str, car_type: &CarType) -> StoreResult<()> {
            self.0.insert_car_type(company, car_type).await
        }

        async fn insert_car(&self, company: &str, id: CarId, car_type: &str) -> StoreResult<()> {
            self.0.insert_car(company, id, car_type).await
        }

        async fn insert_fleet(&self, company: &CarRentalCompany) -> StoreResult<()> {
            self.0.insert_fleet(company).await
        }

        async fn commit_reservations(&self, reservations: &[Reservation]) -> StoreResult<()> {
            self.0.commit_reservations(reservations).await
        }

        async fn count_reservations_by(&self, renter: &str) -> StoreResult<usize> {
            self.0.count_reservations_by(renter).await
        }
    }

    async fn session(store: &Arc<SqliteStore>, renter: &str) -> ReservationSession<SqliteStore> {
        let mut session = ReservationSession::new(store.clone());
        session.set_renter_name(renter).unwrap();
        session
    }

    #[tokio::test]
    async fn test_quote_confirm_persists() {
        let store = setup().await;
        let mut alice = session(&store, "alice").await;

        alice.create_quote("Hertz", &wants("sedan", 1, 3)).await.unwrap();
        alice.create_quote("Avis", &wants("compact", 1, 2)).await.unwrap();
        let reservations = alice.confirm_quotes().await.unwrap();
        assert_eq!(reservations.len(), 2);

        let manager = ManagerSession::new(store.clone());
        assert_eq!(manager.number_of_reservations_by("alice").await.unwrap(), 2);
        assert_eq!(
            manager.number_of_reservations("Hertz", "sedan").await.unwrap(),
            1
        );
        assert_eq!(
            manager
                .number_of_reservations_for_car("Hertz", "sedan", 0)
                .await
                .unwrap(),
            1
        );

        let hertz = store.find_company("Hertz").await.unwrap().unwrap();
        assert_eq!(hertz.reservations_by("alice")[0].id, reservations[0].id);
    }

    #[tokio::test]
    async fn test_conflict_leaves_database_untouched() {
        let store = setup().await;
        let mut alice = session(&store, "alice").await;
        let mut bob = session(&store, "bob").await;

        alice.create_quote("Avis", &wants("sedan", 5, 7)).await.unwrap();
        alice.create_quote("Hertz", &wants("van", 1, 3)).await.unwrap();
        bob.create_quote("Hertz", &wants("van", 2, 3)).await.unwrap();
        bob.confirm_quotes().await.unwrap();

        let err = alice.confirm_quotes().await.unwrap_err();
        assert!(matches!(
            err.cause(),
            SessionError::Core(CoreError::ReservationConflict { .. })
        ));
        assert_eq!(alice.current_quotes().len(), 2);
        assert_eq!(store.count_reservations_by("alice").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batch_overlapping_itself() {
        let store = setup().await;
        let mut alice = session(&store, "alice").await;

        alice.create_quote("Hertz", &wants("van", 1, 3)).await.unwrap();
        alice.create_quote("Hertz", &wants("van", 1, 3)).await.unwrap();

        let err = alice.confirm_quotes().await.unwrap_err();
        assert!(matches!(err, ReservationError::Confirm { pending: 2, .. }));
        assert!(matches!(
            err.cause(),
            SessionError::Core(CoreError::ReservationConflict { .. })
        ));
        assert_eq!(store.count_reservations_by("alice").await.unwrap(), 0);
        assert_eq!(alice.current_quotes().len(), 2);
    }

    #[tokio::test]
    async fn test_lost_race_retries_on_remaining_car() {
        let store = Arc::new(Interleaved(setup().await));
        let mut alice = ReservationSession::new(store.clone());
        let mut bob = ReservationSession::new(store.clone());
        alice.set_renter_name("alice").unwrap();
        bob.set_renter_name("bob").unwrap();

        alice.create_quote("Hertz", &wants("sedan", 1, 3)).await.unwrap();
        bob.create_quote("Hertz", &wants("sedan", 1, 3)).await.unwrap();
        let (a, b) = tokio::join!(alice.confirm_quotes(), bob.confirm_quotes());

        let mut ids = vec![a.unwrap()[0].car_id, b.unwrap()[0].car_id];
        ids.sort();
        assert_eq!(ids, vec![0, 1]);

        let hertz = store.0.find_company("Hertz").await.unwrap().unwrap();
        assert_eq!(hertz.reservations_for_type("sedan"), 2);
    }

    #[tokio::test]
    async fn test_failed_load_leaves_no_company() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let manager = ManagerSession::new(Arc::new(db.store()));

        sqlx::query(
            "CREATE TRIGGER refuse_cars BEFORE INSERT ON cars \
             BEGIN SELECT RAISE(ABORT, 'disk quota exceeded'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(matches!(
            manager.load_company("Hertz", HERTZ).await,
            Err(SessionError::Store(StoreError::Backend(_)))
        ));
        assert!(manager.all_rental_companies().await.unwrap().is_empty());

        sqlx::query("DROP TRIGGER refuse_cars")
            .execute(db.pool())
            .await
            .unwrap();
        let summary = manager.load_company("Hertz", HERTZ).await.unwrap();
        assert_eq!(summary.cars, 3);
    }

    #[tokio::test]
    async fn test_stale_batch_rejected_by_store() {
        let store = setup().await;

        // Two snapshots taken before either commits.
        let mut first = store.find_company("Hertz").await.unwrap().unwrap();
        let mut second = store.find_company("Hertz").await.unwrap().unwrap();
        let quote = first.create_quote(&wants("van", 1, 3), "alice").unwrap();
        let a = first.confirm_quote(&quote).unwrap();
        let quote = second.create_quote(&wants("van", 2, 4), "bob").unwrap();
        let b = second.confirm_quote(&quote).unwrap();

        store.commit_reservations(&[a]).await.unwrap();
        assert!(matches!(
            store.commit_reservations(&[b]).await,
            Err(StoreError::Conflict { car_id: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_browsing_and_statistics() {
        let store = setup().await;
        let mut alice = session(&store, "alice").await;
        let period = Period::new(day(1), day(3)).unwrap();

        let names: Vec<_> = alice
            .available_car_types(&period)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["compact", "sedan", "van"]);

        let (company, cheapest) = alice.cheapest_car_type(&period).await.unwrap().unwrap();
        assert_eq!(company, "Avis");
        assert_eq!(cheapest.daily_price, Money::from_cents(3500));

        alice.create_quote("Hertz", &wants("van", 1, 3)).await.unwrap();
        alice.confirm_quotes().await.unwrap();

        let manager = ManagerSession::new(store.clone());
        assert_eq!(
            manager.most_popular_car_rental_company().await.unwrap().as_deref(),
            Some("Hertz")
        );
        assert_eq!(manager.car_ids("Hertz", "van").await.unwrap(), vec![2]);
        assert!(matches!(
            manager.load_company("Hertz", HERTZ).await,
            Err(SessionError::DuplicateCompany(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_confirms_never_overbook() {
        let store = setup().await;

        let mut handles = Vec::new();
        for i in 0..6 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let mut s = ReservationSession::new(store);
                s.set_renter_name(format!("renter-{i}")).unwrap();
                if s.create_quote("Hertz", &wants("van", 1, 5)).await.is_err() {
                    return false;
                }
                s.confirm_quotes().await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let hertz = store.find_company("Hertz").await.unwrap().unwrap();
        assert_eq!(hertz.reservations_for_type("van"), 1);
    }
}

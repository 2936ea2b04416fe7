//! # Manager Session
//!
//! Fleet administration and statistics for the people running the companies.
//! Stateless apart from the store handle, so one instance can be shared.

use std::sync::Arc;

use rental_core::{parse_fleet, CarId, CarRentalCompany, CarType, CoreError};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult, StoreError};
use crate::store::RentalStore;

/// What `load_company` registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub company: String,
    pub car_types: usize,
    pub cars: usize,
}

pub struct ManagerSession<S: RentalStore + ?Sized> {
    store: Arc<S>,
}

impl<S: RentalStore + ?Sized> ManagerSession<S> {
    pub fn new(store: Arc<S>) -> Self {
        ManagerSession { store }
    }

    pub async fn all_rental_companies(&self) -> SessionResult<Vec<String>> {
        Ok(self.store.company_names().await?)
    }

    // =========================================================================
    // Fleet setup
    // =========================================================================

    pub async fn add_new_company(&self, name: &str) -> SessionResult<()> {
        rental_core::validation::validate_name("company", name).map_err(CoreError::from)?;
        self.store.insert_company(name).await.map_err(|e| match e {
            StoreError::Duplicate { .. } => SessionError::DuplicateCompany(name.to_string()),
            other => other.into(),
        })?;
        info!(company = %name, "Company registered");
        Ok(())
    }

    /// Registers a car type with a company.
    ///
    /// If the company already has a type with this name, that type is kept
    /// and returned unchanged.
    pub async fn add_new_car_type(&self, company: &str, car_type: CarType) -> SessionResult<CarType> {
        let mut current = self.company(company).await?;
        if let Some(existing) = current.car_type(&car_type.name) {
            debug!(company = %company, car_type = %existing.name, "Car type already registered");
            return Ok(existing.clone());
        }

        current.add_car_type(car_type.clone())?;
        self.store.insert_car_type(company, &car_type).await?;
        info!(company = %company, car_type = %car_type.name, "Car type registered");
        Ok(car_type)
    }

    /// Adds a car of an already registered type.
    pub async fn add_new_car(&self, company: &str, id: CarId, car_type: &str) -> SessionResult<()> {
        if self.store.find_car_type(company, car_type).await?.is_none() {
            self.company(company).await?;
            return Err(SessionError::CarTypeNotFound {
                company: company.to_string(),
                car_type: car_type.to_string(),
            });
        }
        if self.store.find_car(company, id).await?.is_some() {
            return Err(CoreError::DuplicateCar {
                company: company.to_string(),
                car_id: id,
            }
            .into());
        }

        self.store.insert_car(company, id, car_type).await?;
        debug!(company = %company, car_id = id, car_type = %car_type, "Car added");
        Ok(())
    }

    /// Creates a company from a fleet file.
    ///
    /// The whole file is parsed and checked before anything is written, and
    /// the company is then stored in one step. Car ids are assigned
    /// sequentially from 0 in file order.
    pub async fn load_company(&self, name: &str, fleet: &str) -> SessionResult<LoadSummary> {
        rental_core::validation::validate_name("company", name).map_err(CoreError::from)?;
        let rows = parse_fleet(fleet)?;

        let mut company = CarRentalCompany::new(name);
        let mut next_id: CarId = 0;
        for row in rows {
            let registered = company.add_car_type(row.car_type)?.name.clone();
            for _ in 0..row.fleet_size {
                company.add_car(next_id, &registered)?;
                next_id += 1;
            }
        }

        self.store.insert_fleet(&company).await.map_err(|e| match e {
            StoreError::Duplicate { .. } => SessionError::DuplicateCompany(name.to_string()),
            other => other.into(),
        })?;

        let summary = LoadSummary {
            company: name.to_string(),
            car_types: company.car_types().count(),
            cars: company.cars().count(),
        };
        info!(
            company = %summary.company,
            car_types = summary.car_types,
            cars = summary.cars,
            "Company loaded"
        );
        Ok(summary)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Car types of a company, ordered by name.
    pub async fn car_types(&self, company: &str) -> SessionResult<Vec<CarType>> {
        Ok(self.company(company).await?.car_types().cloned().collect())
    }

    /// Ids of the cars of one type, ascending.
    pub async fn car_ids(&self, company: &str, car_type: &str) -> SessionResult<Vec<CarId>> {
        let current = self.company(company).await?;
        require_type(&current, car_type)?;
        Ok(current.cars_of_type(car_type).map(|c| c.id()).collect())
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Reservations across every car of one type.
    pub async fn number_of_reservations(&self, company: &str, car_type: &str) -> SessionResult<usize> {
        let current = self.company(company).await?;
        require_type(&current, car_type)?;
        Ok(current.reservations_for_type(car_type))
    }

    /// Reservations of a single car, which must be of `car_type`.
    pub async fn number_of_reservations_for_car(
        &self,
        company: &str,
        car_type: &str,
        id: CarId,
    ) -> SessionResult<usize> {
        match self.store.find_car(company, id).await? {
            Some(car) if car.car_type() == car_type => Ok(car.reservations().len()),
            Some(_) => Err(SessionError::CarNotFound {
                company: company.to_string(),
                car_id: id,
            }),
            None => {
                self.company(company).await?;
                Err(SessionError::CarNotFound {
                    company: company.to_string(),
                    car_id: id,
                })
            }
        }
    }

    /// Reservations made by `renter` across all companies.
    pub async fn number_of_reservations_by(&self, renter: &str) -> SessionResult<usize> {
        Ok(self.store.count_reservations_by(renter).await?)
    }

    /// The company with the most reservations; ties go to the lowest name.
    ///
    /// `None` when no company is registered.
    pub async fn most_popular_car_rental_company(&self) -> SessionResult<Option<String>> {
        let mut best: Option<(String, usize)> = None;
        for name in self.store.company_names().await? {
            let Some(company) = self.store.find_company(&name).await? else {
                continue;
            };
            let total = company.total_reservations();
            if best.as_ref().map_or(true, |(_, most)| total > *most) {
                best = Some((name, total));
            }
        }
        Ok(best.map(|(name, _)| name))
    }

    async fn company(&self, name: &str) -> SessionResult<CarRentalCompany> {
        self.store
            .find_company(name)
            .await?
            .ok_or_else(|| SessionError::CompanyNotFound(name.to_string()))
    }
}

fn require_type(company: &CarRentalCompany, car_type: &str) -> SessionResult<()> {
    if company.car_type(car_type).is_none() {
        return Err(SessionError::CarTypeNotFound {
            company: company.name().to_string(),
            car_type: car_type.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

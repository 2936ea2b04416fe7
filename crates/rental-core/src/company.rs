//! # Car Rental Company
//!
//! The aggregate that owns a company's car types and cars and answers every
//! availability question about them.
//!
//! ## Quote → Reservation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Quote / Reservation Lifecycle                        │
//! │                                                                         │
//! │  create_quote(constraints, renter)                                     │
//! │  ├── type known?           no ──► UnknownCarType                       │
//! │  ├── any car of type free? no ──► UnavailableCarType                   │
//! │  └── Quote { price = daily × days }   (no car is held!)                │
//! │           │                                                             │
//! │           ▼   ... other renters may confirm in between ...              │
//! │                                                                         │
//! │  confirm_quote(quote)                                                  │
//! │  ├── re-check availability  none ──► ReservationConflict               │
//! │  ├── pick free car with lowest id                                      │
//! │  └── Reservation { id: UUID, car_id } appended to that car             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//! Types are kept in a `BTreeMap` keyed by name and cars in one keyed by id,
//! so "first match" is always the lowest name or id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::types::{Car, CarId, CarType, Period, Quote, Reservation, ReservationConstraints};
use crate::validation::{validate_car_type, validate_name};

/// One rental company: its car types, its cars and their reservations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarRentalCompany {
    name: String,
    car_types: BTreeMap<String, CarType>,
    cars: BTreeMap<CarId, Car>,
}

impl CarRentalCompany {
    /// Creates a company with no types and no cars.
    pub fn new(name: impl Into<String>) -> Self {
        CarRentalCompany {
            name: name.into(),
            car_types: BTreeMap::new(),
            cars: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    // =========================================================================
    // Fleet setup
    // =========================================================================

    /// Registers a car type, or returns the one already registered under the
    /// same name. An existing type is never replaced.
    pub fn add_car_type(&mut self, car_type: CarType) -> CoreResult<&CarType> {
        validate_car_type(&car_type)?;
        Ok(self
            .car_types
            .entry(car_type.name.clone())
            .or_insert(car_type))
    }

    /// Adds a car of an already registered type.
    pub fn add_car(&mut self, id: CarId, car_type: &str) -> CoreResult<&Car> {
        if !self.car_types.contains_key(car_type) {
            return Err(CoreError::CarTypeNotRegistered {
                company: self.name.clone(),
                car_type: car_type.to_string(),
            });
        }
        if self.cars.contains_key(&id) {
            return Err(CoreError::DuplicateCar {
                company: self.name.clone(),
                car_id: id,
            });
        }
        Ok(self.cars.entry(id).or_insert(Car::new(id, car_type)))
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// All car types, ordered by name.
    pub fn car_types(&self) -> impl Iterator<Item = &CarType> {
        self.car_types.values()
    }

    pub fn car_type(&self, name: &str) -> Option<&CarType> {
        self.car_types.get(name)
    }

    /// All cars, ordered by id.
    pub fn cars(&self) -> impl Iterator<Item = &Car> {
        self.cars.values()
    }

    pub fn car(&self, id: CarId) -> Option<&Car> {
        self.cars.get(&id)
    }

    /// Cars of one type, ordered by id.
    pub fn cars_of_type<'a>(&'a self, car_type: &'a str) -> impl Iterator<Item = &'a Car> + 'a {
        self.cars.values().filter(move |c| c.car_type() == car_type)
    }

    // =========================================================================
    // Availability
    // =========================================================================

    /// True when at least one car of `car_type` is free for all of `period`.
    pub fn is_available(&self, car_type: &str, period: &Period) -> bool {
        self.cars_of_type(car_type).any(|c| c.is_available(period))
    }

    /// Car types with at least one free car for `period`, ordered by name.
    pub fn available_car_types(&self, period: &Period) -> Vec<&CarType> {
        self.car_types
            .values()
            .filter(|t| self.is_available(&t.name, period))
            .collect()
    }

    /// The available type with the lowest daily price; ties go to the lowest
    /// name.
    pub fn cheapest_car_type(&self, period: &Period) -> Option<&CarType> {
        self.available_car_types(period)
            .into_iter()
            .min_by(|a, b| {
                a.daily_price
                    .cmp(&b.daily_price)
                    .then_with(|| a.name.cmp(&b.name))
            })
    }

    // =========================================================================
    // Quotes and reservations
    // =========================================================================

    /// Prices a rental without holding a car.
    pub fn create_quote(
        &self,
        constraints: &ReservationConstraints,
        renter: &str,
    ) -> CoreResult<Quote> {
        validate_name("renter", renter)?;

        let car_type = self.car_types.get(&constraints.car_type).ok_or_else(|| {
            CoreError::UnknownCarType {
                company: self.name.clone(),
                car_type: constraints.car_type.clone(),
            }
        })?;

        if !self.is_available(&car_type.name, &constraints.period) {
            return Err(CoreError::UnavailableCarType {
                company: self.name.clone(),
                car_type: car_type.name.clone(),
                period: constraints.period,
            });
        }

        let price = car_type
            .price_for(&constraints.period)
            .ok_or_else(|| CoreError::PriceTooLarge {
                company: self.name.clone(),
                car_type: car_type.name.clone(),
                period: constraints.period,
            })?;

        Ok(Quote {
            renter: renter.to_string(),
            period: constraints.period,
            company: self.name.clone(),
            car_type: car_type.name.clone(),
            price,
        })
    }

    /// Turns a quote into a reservation on the free car with the lowest id.
    ///
    /// Availability is checked again here; a quote whose last car was taken
    /// since it was issued fails with `ReservationConflict`.
    pub fn confirm_quote(&mut self, quote: &Quote) -> CoreResult<Reservation> {
        if quote.company != self.name {
            return Err(CoreError::WrongCompany {
                company: self.name.clone(),
                quoted: quote.company.clone(),
            });
        }

        let car = self
            .cars
            .values_mut()
            .find(|c| c.car_type() == quote.car_type && c.is_available(&quote.period))
            .ok_or_else(|| CoreError::ReservationConflict {
                company: quote.company.clone(),
                car_type: quote.car_type.clone(),
                period: quote.period,
            })?;

        let reservation = Reservation::new(quote.clone(), car.id());
        car.push_reservation(reservation.clone());
        Ok(reservation)
    }

    /// Attaches an already confirmed reservation to its car.
    ///
    /// Used when rebuilding a company from storage and when a store applies a
    /// committed batch. The overlap check still applies.
    pub fn record_reservation(&mut self, reservation: Reservation) -> CoreResult<()> {
        if reservation.company() != self.name {
            return Err(CoreError::WrongCompany {
                company: self.name.clone(),
                quoted: reservation.company().to_string(),
            });
        }

        let car = self
            .cars
            .get_mut(&reservation.car_id)
            .ok_or_else(|| CoreError::UnknownCar {
                company: self.name.clone(),
                car_id: reservation.car_id,
            })?;

        if car.car_type() != reservation.car_type() {
            return Err(CoreError::CarTypeNotRegistered {
                company: self.name.clone(),
                car_type: reservation.car_type().to_string(),
            });
        }

        if !car.is_available(reservation.period()) {
            return Err(CoreError::ReservationConflict {
                company: self.name.clone(),
                car_type: reservation.car_type().to_string(),
                period: *reservation.period(),
            });
        }

        car.push_reservation(reservation);
        Ok(())
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Reservations across all cars.
    pub fn total_reservations(&self) -> usize {
        self.cars.values().map(|c| c.reservations().len()).sum()
    }

    /// Every reservation made by `renter`, by car id then booking order.
    pub fn reservations_by(&self, renter: &str) -> Vec<&Reservation> {
        self.cars
            .values()
            .flat_map(|c| c.reservations())
            .filter(|r| r.renter() == renter)
            .collect()
    }

    /// Reservations across all cars of one type.
    pub fn reservations_for_type(&self, car_type: &str) -> usize {
        self.cars_of_type(car_type)
            .map(|c| c.reservations().len())
            .sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

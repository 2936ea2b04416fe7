//! # Reservation Session
//!
//! One renter's unit of work: collect quotes from any number of companies,
//! then confirm them together.
//!
//! ## Lifecycle
//! ```text
//! new ──► set_renter_name ──► create_quote* ──► confirm_quotes
//!                                 │                  │
//!                                 │          ok: quotes cleared
//!                                 │          err: quotes kept, nothing stored
//!                                 ▼
//!                          current_quotes
//! ```
//!
//! ## Confirming Against Snapshots
//! Quotes are confirmed on snapshots of their companies and the resulting
//! batch is committed in one store call. When another renter commits a car
//! this batch picked in between, the store reports a conflict and the whole
//! batch is rebuilt from fresh snapshots. The renter only sees
//! `ReservationConflict` when a fresh snapshot has no free car left, or when
//! every attempt lost the race.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use rental_core::{
    validation::validate_name, CarRentalCompany, CarType, CoreError, Period, Quote, Reservation,
    ReservationConstraints,
};
use tracing::{debug, info, warn};

use crate::error::{ReservationError, SessionError, SessionResult, StoreError};
use crate::store::RentalStore;

/// Snapshot-then-commit rounds before a lost race is reported as a conflict.
const CONFIRM_ATTEMPTS: usize = 5;

pub struct ReservationSession<S: RentalStore + ?Sized> {
    store: Arc<S>,
    renter: Option<String>,
    quotes: Vec<Quote>,
}

impl<S: RentalStore + ?Sized> ReservationSession<S> {
    pub fn new(store: Arc<S>) -> Self {
        ReservationSession {
            store,
            renter: None,
            quotes: Vec::new(),
        }
    }

    // =========================================================================
    // Renter identity
    // =========================================================================

    /// Sets the renter. Can be done once per session.
    pub fn set_renter_name(&mut self, name: impl Into<String>) -> SessionResult<()> {
        if let Some(renter) = &self.renter {
            return Err(SessionError::AlreadySet {
                renter: renter.clone(),
            });
        }
        let name = name.into();
        validate_name("renter", &name).map_err(CoreError::from)?;
        self.renter = Some(name);
        Ok(())
    }

    pub fn renter_name(&self) -> Option<&str> {
        self.renter.as_deref()
    }

    // =========================================================================
    // Browsing
    // =========================================================================

    pub async fn all_rental_companies(&self) -> SessionResult<Vec<String>> {
        Ok(self.store.company_names().await?)
    }

    /// Car types with a free car somewhere during `period`.
    ///
    /// Types offered identically by several companies are listed once.
    /// Result is ordered by type name.
    pub async fn available_car_types(&self, period: &Period) -> SessionResult<Vec<CarType>> {
        let mut available: Vec<CarType> = Vec::new();
        for company in self.companies().await? {
            for car_type in company.available_car_types(period) {
                if !available.contains(car_type) {
                    available.push(car_type.clone());
                }
            }
        }
        available.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(available)
    }

    /// The cheapest available type across all companies.
    ///
    /// Ties on price go to the lowest type name, then the lowest company
    /// name. Returns the type together with the company offering it.
    pub async fn cheapest_car_type(
        &self,
        period: &Period,
    ) -> SessionResult<Option<(String, CarType)>> {
        let mut best: Option<(String, CarType)> = None;
        for company in self.companies().await? {
            let Some(candidate) = company.cheapest_car_type(period) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((_, current)) => {
                    (candidate.daily_price, &candidate.name) < (current.daily_price, &current.name)
                }
            };
            if better {
                best = Some((company.name().to_string(), candidate.clone()));
            }
        }
        Ok(best)
    }

    // =========================================================================
    // Quotes
    // =========================================================================

    /// Asks `company` for a quote and keeps it in the session.
    pub async fn create_quote(
        &mut self,
        company: &str,
        constraints: &ReservationConstraints,
    ) -> Result<Quote, ReservationError> {
        let quote = self
            .quote_at(company, constraints)
            .await
            .map_err(|source| ReservationError::Quote {
                company: company.to_string(),
                source,
            })?;

        debug!(
            renter = %quote.renter,
            company = %quote.company,
            car_type = %quote.car_type,
            price = %quote.price,
            "Quote created"
        );
        self.quotes.push(quote.clone());
        Ok(quote)
    }

    async fn quote_at(
        &self,
        company: &str,
        constraints: &ReservationConstraints,
    ) -> SessionResult<Quote> {
        let renter = self.renter.as_deref().ok_or(SessionError::RenterNotSet)?;
        let company = self
            .store
            .find_company(company)
            .await?
            .ok_or_else(|| SessionError::CompanyNotFound(company.to_string()))?;
        Ok(company.create_quote(constraints, renter)?)
    }

    /// Quotes created so far, in creation order.
    pub fn current_quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Confirms every held quote, all or nothing.
    ///
    /// On success the reservations are returned in quote order and the
    /// session's quotes are cleared. On failure nothing is stored and the
    /// quotes stay in the session.
    pub async fn confirm_quotes(&mut self) -> Result<Vec<Reservation>, ReservationError> {
        let pending = self.quotes.len();
        let reservations = self.confirm_all().await.map_err(|source| {
            warn!(
                renter = ?self.renter,
                pending,
                error = %source,
                "Confirmation failed, no quote was confirmed"
            );
            ReservationError::Confirm { pending, source }
        })?;

        self.quotes.clear();
        info!(
            renter = ?self.renter,
            count = reservations.len(),
            "Quotes confirmed"
        );
        Ok(reservations)
    }

    async fn confirm_all(&self) -> SessionResult<Vec<Reservation>> {
        let mut attempt = 1;
        loop {
            let confirmed = self.confirm_on_snapshots().await?;
            if confirmed.is_empty() {
                return Ok(confirmed);
            }

            match self.store.commit_reservations(&confirmed).await {
                Ok(()) => return Ok(confirmed),
                Err(StoreError::Conflict {
                    company,
                    car_type,
                    car_id,
                    period,
                }) => {
                    if attempt == CONFIRM_ATTEMPTS {
                        return Err(CoreError::ReservationConflict {
                            company,
                            car_type,
                            period,
                        }
                        .into());
                    }
                    debug!(
                        renter = ?self.renter,
                        company = %company,
                        car_id,
                        attempt,
                        "Car taken before commit, retrying on fresh snapshots"
                    );
                    attempt += 1;
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    /// Confirms every quote on private copies of the companies. Nothing is
    /// stored.
    async fn confirm_on_snapshots(&self) -> SessionResult<Vec<Reservation>> {
        let mut working: HashMap<String, CarRentalCompany> = HashMap::new();
        let mut confirmed = Vec::with_capacity(self.quotes.len());

        for quote in &self.quotes {
            let company = match working.entry(quote.company.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let company = self
                        .store
                        .find_company(&quote.company)
                        .await?
                        .ok_or_else(|| SessionError::CompanyNotFound(quote.company.clone()))?;
                    entry.insert(company)
                }
            };
            confirmed.push(company.confirm_quote(quote)?);
        }

        Ok(confirmed)
    }

    async fn companies(&self) -> SessionResult<Vec<CarRentalCompany>> {
        let mut companies = Vec::new();
        for name in self.store.company_names().await? {
            // A company removed between the two calls is simply skipped.
            if let Some(company) = self.store.find_company(&name).await? {
                companies.push(company);
            }
        }
        Ok(companies)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Domain Types
//!
//! Core domain values used throughout the rental system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CarType      │   │      Car        │   │     Period      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name (key)     │◄──│  id (per co.)   │   │  start (incl.)  │       │
//! │  │  seats, trunk   │   │  car_type       │   │  end (excl.)    │       │
//! │  │  daily_price    │   │  reservations ──┼─┐ └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘ │                           │
//! │                                            │                           │
//! │  ┌─────────────────┐   ┌─────────────────┐ │                           │
//! │  │     Quote       │──►│  Reservation    │◄┘                           │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  renter, period │   │  id (UUID)      │                             │
//! │  │  company, type  │   │  car_id         │                             │
//! │  │  price          │   │  quote fields   │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

/// Identifier of a car, unique within its company.
pub type CarId = u32;

// =============================================================================
// Period
// =============================================================================

/// Half-open rental interval `[start, end)` at calendar-day granularity.
///
/// ## Normalization
/// A period that starts and ends on the same date is widened to that single
/// day, so every period covers at least one day:
/// ```text
/// new(03-01, 03-03) → [03-01, 03-03)  2 days
/// new(03-01, 03-01) → [03-01, 03-02)  1 day
/// new(03-03, 03-01) → InvalidPeriod
/// ```
///
/// ## Date Range
/// Both bounds must fall in years 1 through 9999. Storage keeps dates as
/// `YYYY-MM-DD` text and relies on it sorting like the dates themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawPeriod> for Period {
    type Error = ValidationError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Period::new(raw.start, raw.end)
    }
}

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

fn check_year(date: NaiveDate) -> Result<NaiveDate, ValidationError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        Ok(date)
    } else {
        Err(ValidationError::DateOutOfRange { date })
    }
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        check_year(start)?;
        check_year(end)?;
        if end < start {
            return Err(ValidationError::InvalidPeriod { start, end });
        }
        let end = if end == start {
            start
                .succ_opt()
                .ok_or(ValidationError::InvalidPeriod { start, end })?
        } else {
            end
        };
        Ok(Period {
            start,
            end: check_year(end)?,
        })
    }

    #[inline]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of rental days; at least 1.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }

    /// `start1 < end2 && start2 < end1`
    #[inline]
    pub fn overlaps(&self, other: &Period) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// =============================================================================
// Car Type
// =============================================================================

/// A category of car offered by a company.
///
/// Immutable after creation; `name` is the key within its company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarType {
    pub name: String,
    pub seats: u32,
    /// Trunk volume as given in the fleet file.
    pub trunk_space: f32,
    pub daily_price: Money,
    pub smoking_allowed: bool,
}

impl CarType {
    pub fn new(
        name: impl Into<String>,
        seats: u32,
        trunk_space: f32,
        daily_price: Money,
        smoking_allowed: bool,
    ) -> Self {
        CarType {
            name: name.into(),
            seats,
            trunk_space,
            daily_price,
            smoking_allowed,
        }
    }

    /// Price for renting one car of this type over `period`; `None` on
    /// overflow.
    #[inline]
    pub fn price_for(&self, period: &Period) -> Option<Money> {
        self.daily_price.for_days(period.days())
    }
}

impl fmt::Display for CarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} seats, trunk {}, {}/day, {})",
            self.name,
            self.seats,
            self.trunk_space,
            self.daily_price,
            if self.smoking_allowed {
                "smoking"
            } else {
                "non-smoking"
            }
        )
    }
}

// =============================================================================
// Reservation Constraints
// =============================================================================

/// What a renter asks for: a car type over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConstraints {
    pub period: Period,
    pub car_type: String,
}

impl ReservationConstraints {
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        car_type: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let car_type = car_type.into();
        if car_type.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "car_type".to_string(),
            });
        }
        Ok(ReservationConstraints {
            period: Period::new(start, end)?,
            car_type,
        })
    }
}

// =============================================================================
// Quote
// =============================================================================

/// A priced, unconfirmed reservation request.
///
/// Holding a quote does not hold a car: availability is checked again when
/// the quote is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub renter: String,
    pub period: Period,
    pub company: String,
    pub car_type: String,
    pub price: Money,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quote for {} from {} to {} at {}\nCar type: {}\tTotal price: {}",
            self.renter,
            self.period.start(),
            self.period.end(),
            self.company,
            self.car_type,
            self.price
        )
    }
}

// =============================================================================
// Reservation
// =============================================================================

/// A confirmed quote bound to one physical car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub car_id: CarId,
    #[serde(flatten)]
    pub quote: Quote,
}

impl Reservation {
    /// Confirms `quote` onto `car_id` with a fresh id.
    pub fn new(quote: Quote, car_id: CarId) -> Self {
        Reservation {
            id: Uuid::new_v4(),
            car_id,
            quote,
        }
    }

    /// Rebuilds a reservation read back from storage.
    pub fn restore(id: Uuid, car_id: CarId, quote: Quote) -> Self {
        Reservation { id, car_id, quote }
    }

    #[inline]
    pub fn renter(&self) -> &str {
        &self.quote.renter
    }

    #[inline]
    pub fn company(&self) -> &str {
        &self.quote.company
    }

    #[inline]
    pub fn car_type(&self) -> &str {
        &self.quote.car_type
    }

    #[inline]
    pub fn period(&self) -> &Period {
        &self.quote.period
    }

    #[inline]
    pub fn price(&self) -> Money {
        self.quote.price
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reservation for {} from {} to {} at {}\nCar type: {}\tCar: {}\nTotal price: {}",
            self.quote.renter,
            self.quote.period.start(),
            self.quote.period.end(),
            self.quote.company,
            self.quote.car_type,
            self.car_id,
            self.quote.price
        )
    }
}

// =============================================================================
// Car
// =============================================================================

/// One physical vehicle and its reservation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    id: CarId,
    car_type: String,
    reservations: Vec<Reservation>,
}

impl Car {
    pub fn new(id: CarId, car_type: impl Into<String>) -> Self {
        Car {
            id,
            car_type: car_type.into(),
            reservations: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> CarId {
        self.id
    }

    #[inline]
    pub fn car_type(&self) -> &str {
        &self.car_type
    }

    /// Reservations in the order they were made.
    #[inline]
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    /// True when no reservation on this car overlaps `period`.
    pub fn is_available(&self, period: &Period) -> bool {
        !self
            .reservations
            .iter()
            .any(|r| r.period().overlaps(period))
    }

    pub(crate) fn push_reservation(&mut self, reservation: Reservation) {
        self.reservations.push(reservation);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn period(a: u32, b: u32) -> Period {
        Period::new(day(a), day(b)).unwrap()
    }

    #[test]
    fn test_period_days() {
        assert_eq!(period(1, 3).days(), 2);
        assert_eq!(period(1, 2).days(), 1);
    }

    #[test]
    fn test_same_day_period_is_one_day() {
        let p = period(5, 5);
        assert_eq!(p.start(), day(5));
        assert_eq!(p.end(), day(6));
        assert_eq!(p.days(), 1);
    }

    #[test]
    fn test_reversed_period_rejected() {
        let err = Period::new(day(3), day(1)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_overlap_is_half_open() {
        // Returning a car on the 3rd frees it for a pickup on the 3rd
        assert!(!period(1, 3).overlaps(&period(3, 5)));
        assert!(!period(3, 5).overlaps(&period(1, 3)));
        assert!(period(1, 4).overlaps(&period(3, 5)));
        assert!(period(2, 3).overlaps(&period(1, 5)));
        assert!(period(1, 5).overlaps(&period(1, 5)));
    }

    #[test]
    fn test_dates_limited_to_four_digit_years() {
        let last = NaiveDate::from_ymd_opt(9999, 12, 30).unwrap();
        let first_past = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
        assert!(Period::new(last, last).is_ok());
        assert!(matches!(
            Period::new(last, first_past),
            Err(ValidationError::DateOutOfRange { .. })
        ));
        // Widening the final day would step into year 10000.
        let final_day = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        assert!(Period::new(final_day, final_day).is_err());

        let year_zero = NaiveDate::from_ymd_opt(0, 6, 1).unwrap();
        assert!(Period::new(year_zero, day(1)).is_err());
    }

    #[test]
    fn test_price_for_period() {
        let sedan = CarType::new("sedan", 4, 2.5, Money::from_cents(5000), false);
        assert_eq!(sedan.price_for(&period(1, 3)), Some(Money::from_cents(10000)));
        assert_eq!(sedan.price_for(&period(1, 1)), Some(Money::from_cents(5000)));
    }

    #[test]
    fn test_constraints_require_car_type() {
        assert!(ReservationConstraints::new(day(1), day(2), "  ").is_err());
        assert!(ReservationConstraints::new(day(1), day(2), "sedan").is_ok());
    }

    #[test]
    fn test_car_availability() {
        let mut car = Car::new(0, "sedan");
        assert!(car.is_available(&period(1, 3)));

        let quote = Quote {
            renter: "alice".to_string(),
            period: period(1, 3),
            company: "Hertz".to_string(),
            car_type: "sedan".to_string(),
            price: Money::from_cents(10000),
        };
        car.push_reservation(Reservation::new(quote, 0));

        assert!(!car.is_available(&period(2, 4)));
        assert!(car.is_available(&period(3, 4)));
    }

    #[test]
    fn test_reservation_display() {
        let quote = Quote {
            renter: "alice".to_string(),
            period: period(1, 3),
            company: "Hertz".to_string(),
            car_type: "sedan".to_string(),
            price: Money::from_cents(10000),
        };
        let reservation = Reservation::new(quote, 1);
        assert_eq!(
            reservation.to_string(),
            "Reservation for alice from 2026-03-01 to 2026-03-03 at Hertz\nCar type: sedan\tCar: 1\nTotal price: $100.00"
        );
    }

    #[test]
    fn test_reservation_serde_flattens_quote() {
        let quote = Quote {
            renter: "alice".to_string(),
            period: period(1, 3),
            company: "Hertz".to_string(),
            car_type: "sedan".to_string(),
            price: Money::from_cents(10000),
        };
        let reservation = Reservation::new(quote, 1);

        let json = serde_json::to_value(&reservation).unwrap();
        assert_eq!(json["renter"], "alice");
        assert_eq!(json["car_id"], 1);
        assert_eq!(json["period"]["start"], "2026-03-01");

        let back: Reservation = serde_json::from_value(json).unwrap();
        assert_eq!(back, reservation);
    }

    #[test]
    fn test_period_deserialize_validates() {
        let json = serde_json::json!({ "start": "2026-03-05", "end": "2026-03-01" });
        assert!(serde_json::from_value::<Period>(json).is_err());
    }
}

//! # Money Module
//!
//! Provides the `Money` type for rental prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Daily price 33.33 as f64, rented for 3 days:                           │
//! │    33.33 * 3.0 = 99.99000000000001  ❌                                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    3333 cents * 3 = 9999 cents (exactly $99.99)                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rental_core::money::Money;
//!
//! let daily = Money::from_cents(5000); // $50.00
//! let total = daily.for_days(2);       // $100.00
//! assert_eq!(total, Some(Money::from_cents(10000)));
//!
//! // Fleet files carry decimal text
//! let parsed: Money = "49.99".parse().unwrap();
//! assert_eq!(parsed.cents(), 4999);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// CarType.daily_price ──► Quote.price (× rental days) ──► Reservation.price
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Price of renting for `days` days at this daily rate, or `None` when
    /// the total does not fit in an `i64` of cents.
    ///
    /// ## Example
    /// ```rust
    /// use rental_core::money::Money;
    ///
    /// let daily = Money::from_cents(3333);
    /// assert_eq!(daily.for_days(3), Some(Money::from_cents(9999)));
    /// assert_eq!(Money::from_cents(i64::MAX / 2).for_days(3), None);
    /// ```
    #[inline]
    pub fn for_days(&self, days: i64) -> Option<Self> {
        self.0.checked_mul(days).map(Money)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses decimal text with at most two fractional digits.
///
/// ```text
/// "50"     → 5000
/// "50.5"   → 5050
/// "49.99"  → 4999
/// "49.999" → InvalidFormat (sub-cent precision is never silently dropped)
/// ```
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (major, minor) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, ""),
        };

        if major.is_empty() && minor.is_empty() {
            return Err(invalid("expected a decimal number"));
        }
        if !major.chars().all(|c| c.is_ascii_digit()) || !minor.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("expected a decimal number"));
        }
        if minor.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }

        let major: i64 = if major.is_empty() {
            0
        } else {
            major.parse().map_err(|_| invalid("value too large"))?
        };
        let minor: i64 = match minor.len() {
            0 => 0,
            1 => minor.parse::<i64>().map_err(|_| invalid("expected digits"))? * 10,
            _ => minor.parse().map_err(|_| invalid("expected digits"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("value too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

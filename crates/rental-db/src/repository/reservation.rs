//! # Reservation Repository
//!
//! ## Batch Commit
//! ```text
//! BEGIN
//!   for each reservation:
//!     INSERT ... SELECT ... WHERE NOT EXISTS (overlapping row, same car)
//!        │
//!        ├── 1 row   ✓ next
//!        ├── 0 rows  ✗ Overlap      ──► ROLLBACK
//!        └── FK      ✗ NotFound     ──► ROLLBACK
//! COMMIT
//! ```
//! The overlap guard is part of the INSERT itself, so the check and the write
//! happen under the same SQLite write lock. A batch that overlaps itself is
//! caught too: later rows see earlier ones inside the transaction.

use chrono::NaiveDate;
use rental_core::{CarId, Money, Period, Quote, Reservation};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

// =============================================================================
// Row Type
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ReservationRow {
    id: String,
    company: String,
    car_id: i64,
    car_type: String,
    renter: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    price_cents: i64,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = DbError;

    fn try_from(row: ReservationRow) -> DbResult<Self> {
        let id = Uuid::parse_str(&row.id).map_err(|e| DbError::corrupt("reservations", e))?;
        let car_id = CarId::try_from(row.car_id).map_err(|e| DbError::corrupt("reservations", e))?;
        let period = Period::new(row.start_date, row.end_date)
            .map_err(|e| DbError::corrupt("reservations", e))?;

        Ok(Reservation::restore(
            id,
            car_id,
            Quote {
                renter: row.renter,
                period,
                company: row.company,
                car_type: row.car_type,
                price: Money::from_cents(row.price_cents),
            },
        ))
    }
}

/// Reservations of a company, or of one of its cars, by car id then booking
/// order.
pub(crate) async fn fetch_reservations(
    conn: &mut SqliteConnection,
    company: &str,
    car_id: Option<CarId>,
) -> DbResult<Vec<Reservation>> {
    let rows: Vec<ReservationRow> = sqlx::query_as(
        r#"
        SELECT id, company, car_id, car_type, renter, start_date, end_date, price_cents
        FROM reservations
        WHERE company = ?1 AND (?2 IS NULL OR car_id = ?2)
        ORDER BY car_id, rowid
        "#,
    )
    .bind(company)
    .bind(car_id.map(i64::from))
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(Reservation::try_from).collect()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for reservations.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// Inserts every reservation or none.
    pub async fn insert_batch(&self, reservations: &[Reservation]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for reservation in reservations {
            insert_guarded(&mut *tx, reservation).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(count = reservations.len(), "Reservation batch committed");
        Ok(())
    }

    /// Reservations made by `renter` across all companies.
    pub async fn count_by_renter(&self, renter: &str) -> DbResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE renter = ?1")
            .bind(renter)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}

async fn insert_guarded(conn: &mut SqliteConnection, reservation: &Reservation) -> DbResult<()> {
    let period = reservation.period();
    debug!(
        id = %reservation.id,
        company = %reservation.company(),
        car_id = reservation.car_id,
        "Inserting reservation"
    );

    let result = sqlx::query(
        r#"
        INSERT INTO reservations (
            id, company, car_id, car_type, renter, start_date, end_date, price_cents
        )
        SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8
        WHERE NOT EXISTS (
            SELECT 1 FROM reservations
            WHERE company = ?2 AND car_id = ?3
              AND start_date < ?7 AND end_date > ?6
        )
        "#,
    )
    .bind(reservation.id.to_string())
    .bind(reservation.company())
    .bind(i64::from(reservation.car_id))
    .bind(reservation.car_type())
    .bind(reservation.renter())
    .bind(period.start())
    .bind(period.end())
    .bind(reservation.price().cents())
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::ForeignKeyViolation { .. } => DbError::not_found(
            "car",
            format!(
                "{}/{} ({})",
                reservation.company(),
                reservation.car_id,
                reservation.car_type()
            ),
        ),
        other => other,
    })?;

    if result.rows_affected() == 0 {
        return Err(DbError::Overlap {
            company: reservation.company().to_string(),
            car_type: reservation.car_type().to_string(),
            car_id: reservation.car_id,
            period: *period,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

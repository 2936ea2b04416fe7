//! # Company Repository
//!
//! Companies, their car types and their cars.
//!
//! ## Loading a Company
//! ```text
//! BEGIN (read)
//!   SELECT companies      ── missing? → None
//!   SELECT car_types      ── add_car_type
//!   SELECT cars           ── add_car
//!   SELECT reservations   ── record_reservation (overlap re-checked)
//! COMMIT
//! ```
//! All four reads run in one transaction so a concurrent commit is either
//! entirely visible or not at all.
//!
//! `insert_fleet` writes a company, its types and its cars the same way: one
//! transaction, so a failure part way leaves no trace of the company.

use rental_core::{Car, CarId, CarRentalCompany, CarType, Money};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::reservation::fetch_reservations;

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CarTypeRow {
    name: String,
    seats: i64,
    trunk_space: f64,
    daily_price_cents: i64,
    smoking_allowed: bool,
}

impl TryFrom<CarTypeRow> for CarType {
    type Error = DbError;

    fn try_from(row: CarTypeRow) -> DbResult<Self> {
        let seats = u32::try_from(row.seats).map_err(|e| DbError::corrupt("car_types", e))?;
        Ok(CarType::new(
            row.name,
            seats,
            row.trunk_space as f32,
            Money::from_cents(row.daily_price_cents),
            row.smoking_allowed,
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CarRow {
    id: i64,
    car_type: String,
}

fn car_id(raw: i64) -> DbResult<CarId> {
    CarId::try_from(raw).map_err(|e| DbError::corrupt("cars", e))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for companies, car types and cars.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CompanyRepository { pool }
    }

    /// All company names, ascending.
    pub async fn list_names(&self) -> DbResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>("SELECT name FROM companies ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    pub async fn insert(&self, name: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_company(&mut *conn, name).await
    }

    /// Stores a car type. An existing type with the same name is left as is.
    pub async fn insert_car_type(&self, company: &str, car_type: &CarType) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_car_type(&mut *conn, company, car_type).await
    }

    pub async fn find_car_type(&self, company: &str, name: &str) -> DbResult<Option<CarType>> {
        let row: Option<CarTypeRow> = sqlx::query_as(
            r#"
            SELECT name, seats, trunk_space, daily_price_cents, smoking_allowed
            FROM car_types
            WHERE company = ?1 AND name = ?2
            "#,
        )
        .bind(company)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CarType::try_from).transpose()
    }

    /// Adds a car of a registered type.
    pub async fn insert_car(&self, company: &str, id: CarId, car_type: &str) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_car(&mut *conn, company, id, car_type).await
    }

    /// Stores a new company with its car types and cars in one transaction.
    pub async fn insert_fleet(&self, company: &CarRentalCompany) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        insert_company(&mut *tx, company.name()).await?;
        for car_type in company.car_types() {
            insert_car_type(&mut *tx, company.name(), car_type).await?;
        }
        for car in company.cars() {
            insert_car(&mut *tx, company.name(), car.id(), car.car_type()).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            company = %company.name(),
            car_types = company.car_types().count(),
            cars = company.cars().count(),
            "Fleet committed"
        );
        Ok(())
    }

    /// One car with its reservations.
    pub async fn find_car(&self, company: &str, id: CarId) -> DbResult<Option<Car>> {
        let mut tx = self.pool.begin().await?;

        let car_type: Option<CarTypeRow> = sqlx::query_as(
            r#"
            SELECT t.name, t.seats, t.trunk_space, t.daily_price_cents, t.smoking_allowed
            FROM cars c
            JOIN car_types t ON t.company = c.company AND t.name = c.car_type
            WHERE c.company = ?1 AND c.id = ?2
            "#,
        )
        .bind(company)
        .bind(i64::from(id))
        .fetch_optional(&mut *tx)
        .await?;

        let Some(car_type) = car_type else {
            return Ok(None);
        };

        // Rebuilt through a one-car company so stored reservations go through
        // the same checks as a full load.
        let mut single = CarRentalCompany::new(company);
        let type_name = car_type.name.clone();
        single
            .add_car_type(CarType::try_from(car_type)?)
            .map_err(|e| DbError::corrupt("car_types", e))?;
        single
            .add_car(id, &type_name)
            .map_err(|e| DbError::corrupt("cars", e))?;
        for reservation in fetch_reservations(&mut *tx, company, Some(id)).await? {
            single
                .record_reservation(reservation)
                .map_err(|e| DbError::corrupt("reservations", e))?;
        }
        tx.commit().await?;

        Ok(single.car(id).cloned())
    }

    /// Loads a whole company: types, cars and every reservation.
    pub async fn load(&self, name: &str) -> DbResult<Option<CarRentalCompany>> {
        let mut tx = self.pool.begin().await?;

        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM companies WHERE name = ?1")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;
        if found.is_none() {
            return Ok(None);
        }

        let company = load_company(&mut *tx, name).await?;
        tx.commit().await?;

        debug!(
            company = %name,
            cars = company.cars().count(),
            reservations = company.total_reservations(),
            "Company loaded"
        );
        Ok(Some(company))
    }
}

async fn insert_company(conn: &mut SqliteConnection, name: &str) -> DbResult<()> {
    debug!(company = %name, "Inserting company");

    sqlx::query("INSERT INTO companies (name) VALUES (?1)")
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("company", name),
            other => other,
        })?;

    Ok(())
}

async fn insert_car_type(
    conn: &mut SqliteConnection,
    company: &str,
    car_type: &CarType,
) -> DbResult<()> {
    debug!(company = %company, car_type = %car_type.name, "Inserting car type");

    sqlx::query(
        r#"
        INSERT INTO car_types (
            company, name, seats, trunk_space, daily_price_cents, smoking_allowed
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT (company, name) DO NOTHING
        "#,
    )
    .bind(company)
    .bind(&car_type.name)
    .bind(i64::from(car_type.seats))
    .bind(f64::from(car_type.trunk_space))
    .bind(car_type.daily_price.cents())
    .bind(car_type.smoking_allowed)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::ForeignKeyViolation { .. } => DbError::not_found("company", company),
        other => other,
    })?;

    Ok(())
}

async fn insert_car(
    conn: &mut SqliteConnection,
    company: &str,
    id: CarId,
    car_type: &str,
) -> DbResult<()> {
    debug!(company = %company, car_id = id, car_type = %car_type, "Inserting car");

    sqlx::query("INSERT INTO cars (company, id, car_type) VALUES (?1, ?2, ?3)")
        .bind(company)
        .bind(i64::from(id))
        .bind(car_type)
        .execute(&mut *conn)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("car", format!("{company}/{id}")),
            DbError::ForeignKeyViolation { .. } => {
                DbError::not_found("car type", format!("{company}/{car_type}"))
            }
            other => other,
        })?;

    Ok(())
}

async fn load_company(conn: &mut SqliteConnection, name: &str) -> DbResult<CarRentalCompany> {
    let mut company = CarRentalCompany::new(name);

    let types: Vec<CarTypeRow> = sqlx::query_as(
        r#"
        SELECT name, seats, trunk_space, daily_price_cents, smoking_allowed
        FROM car_types
        WHERE company = ?1
        ORDER BY name
        "#,
    )
    .bind(name)
    .fetch_all(&mut *conn)
    .await?;
    for row in types {
        company
            .add_car_type(CarType::try_from(row)?)
            .map_err(|e| DbError::corrupt("car_types", e))?;
    }

    let cars: Vec<CarRow> =
        sqlx::query_as("SELECT id, car_type FROM cars WHERE company = ?1 ORDER BY id")
            .bind(name)
            .fetch_all(&mut *conn)
            .await?;
    for row in cars {
        company
            .add_car(car_id(row.id)?, &row.car_type)
            .map_err(|e| DbError::corrupt("cars", e))?;
    }

    for reservation in fetch_reservations(conn, name, None).await? {
        company
            .record_reservation(reservation)
            .map_err(|e| DbError::corrupt("reservations", e))?;
    }

    Ok(company)
}

// =============================================================================
// Unit Tests
// =============================================================================

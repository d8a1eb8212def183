//! Catalog repository (grooming services, day-care options)

use async_trait::async_trait;
use sqlx::{FromRow, Pool, Postgres};

use super::CatalogStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        catalog::{UpsertDayCareOption, UpsertGroomingService},
        DayCareOption, DayCareType, GroomingService,
    },
};

#[derive(Debug, FromRow)]
struct DayCareOptionRow {
    care_type: String,
    price: f64,
    description: Option<String>,
}

impl TryFrom<DayCareOptionRow> for DayCareOption {
    type Error = AppError;

    fn try_from(row: DayCareOptionRow) -> Result<Self, Self::Error> {
        Ok(DayCareOption {
            care_type: row.care_type.parse().map_err(AppError::Internal)?,
            price: row.price,
            description: row.description,
        })
    }
}

/// Unique violations become conflicts, everything else stays a database error
fn conflict_on_duplicate(e: sqlx::Error, what: String) -> AppError {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(what),
        other => AppError::Database(other),
    }
}

#[derive(Clone)]
pub struct CatalogRepository {
    pool: Pool<Postgres>,
}

impl CatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    // ---- Grooming services ----

    async fn list_grooming_services(&self) -> AppResult<Vec<GroomingService>> {
        let rows = sqlx::query_as::<_, GroomingService>(
            "SELECT * FROM grooming_services ORDER BY price, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_grooming_service(&self, data: &UpsertGroomingService) -> AppResult<GroomingService> {
        sqlx::query_as::<_, GroomingService>(
            r#"
            INSERT INTO grooming_services (name, price, duration, discount, features, recommended)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.price)
        .bind(data.duration)
        .bind(data.discount)
        .bind(&data.features)
        .bind(data.recommended)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_duplicate(e, format!("Service '{}' already exists", data.name)))
    }

    async fn update_grooming_service(&self, id: i32, data: &UpsertGroomingService) -> AppResult<GroomingService> {
        sqlx::query_as::<_, GroomingService>(
            r#"
            UPDATE grooming_services
            SET name = $2, price = $3, duration = $4, discount = $5,
                features = $6, recommended = $7, modif_date = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.price)
        .bind(data.duration)
        .bind(data.discount)
        .bind(&data.features)
        .bind(data.recommended)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_duplicate(e, format!("Service '{}' already exists", data.name)))?
        .ok_or_else(|| AppError::CatalogNotFound(format!("Grooming service {} not found", id)))
    }

    async fn delete_grooming_service(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM grooming_services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::CatalogNotFound(format!("Grooming service {} not found", id)));
        }
        Ok(())
    }

    // ---- Day-care options ----

    async fn list_day_care_options(&self) -> AppResult<Vec<DayCareOption>> {
        let rows = sqlx::query_as::<_, DayCareOptionRow>(
            "SELECT care_type, price, description FROM day_care_options ORDER BY care_type",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(DayCareOption::try_from).collect()
    }

    async fn create_day_care_option(&self, data: &UpsertDayCareOption) -> AppResult<DayCareOption> {
        sqlx::query_as::<_, DayCareOptionRow>(
            r#"
            INSERT INTO day_care_options (care_type, price, description)
            VALUES ($1, $2, $3)
            RETURNING care_type, price, description
            "#,
        )
        .bind(data.care_type.as_str())
        .bind(data.price)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_duplicate(e, format!("Day-care option '{}' already exists", data.care_type)))?
        .try_into()
    }

    async fn update_day_care_option(&self, data: &UpsertDayCareOption) -> AppResult<DayCareOption> {
        sqlx::query_as::<_, DayCareOptionRow>(
            r#"
            UPDATE day_care_options SET price = $2, description = $3
            WHERE care_type = $1
            RETURNING care_type, price, description
            "#,
        )
        .bind(data.care_type.as_str())
        .bind(data.price)
        .bind(&data.description)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::CatalogNotFound(format!("Day-care option '{}' not found", data.care_type)))?
        .try_into()
    }

    async fn delete_day_care_option(&self, care_type: DayCareType) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM day_care_options WHERE care_type = $1")
            .bind(care_type.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::CatalogNotFound(format!("Day-care option '{}' not found", care_type)));
        }
        Ok(())
    }
}

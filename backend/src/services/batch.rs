//! Rearing batch management service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Batch;
use shared::validation::{validate_bird_count, validate_mortality};

/// Batch service for managing rearing batches
#[derive(Clone)]
pub struct BatchService {
    db: PgPool,
}

/// Database row for a batch
#[derive(Debug, FromRow)]
struct BatchRow {
    id: Uuid,
    farm_id: Uuid,
    name: String,
    breed: Option<String>,
    arrival_date: NaiveDate,
    initial_bird_count: i32,
    current_bird_count: i32,
    arrival_avg_weight_kg: Option<Decimal>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BatchRow> for Batch {
    fn from(row: BatchRow) -> Self {
        Batch {
            id: row.id,
            farm_id: row.farm_id,
            name: row.name,
            breed: row.breed,
            arrival_date: row.arrival_date,
            initial_bird_count: row.initial_bird_count,
            current_bird_count: row.current_bird_count,
            arrival_avg_weight_kg: row.arrival_avg_weight_kg,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a batch
#[derive(Debug, Deserialize)]
pub struct CreateBatchInput {
    pub name: String,
    pub breed: Option<String>,
    pub arrival_date: NaiveDate,
    pub initial_bird_count: i32,
    pub arrival_avg_weight_kg: Option<Decimal>,
}

/// Input for recording mortality against a batch
#[derive(Debug, Deserialize)]
pub struct RecordMortalityInput {
    pub count: i32,
}

const BATCH_COLUMNS: &str = "id, farm_id, name, breed, arrival_date, initial_bird_count, \
                             current_bird_count, arrival_avg_weight_kg, is_active, \
                             created_at, updated_at";

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a rearing batch
    pub async fn create_batch(&self, farm_id: Uuid, input: CreateBatchInput) -> AppResult<Batch> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Batch name is required".to_string(),
            });
        }

        validate_bird_count(input.initial_bird_count).map_err(|msg| AppError::Validation {
            field: "initial_bird_count".to_string(),
            message: msg.to_string(),
        })?;

        if let Some(weight) = input.arrival_avg_weight_kg {
            if weight <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "arrival_avg_weight_kg".to_string(),
                    message: "Arrival weight must be positive".to_string(),
                });
            }
        }

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            INSERT INTO batches (farm_id, name, breed, arrival_date, initial_bird_count,
                                 current_bird_count, arrival_avg_weight_kg)
            VALUES ($1, $2, $3, $4, $5, $5, $6)
            RETURNING {BATCH_COLUMNS}
            "#,
        ))
        .bind(farm_id)
        .bind(input.name.trim())
        .bind(&input.breed)
        .bind(input.arrival_date)
        .bind(input.initial_bird_count)
        .bind(input.arrival_avg_weight_kg)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a batch by ID
    pub async fn get_batch(&self, farm_id: Uuid, batch_id: Uuid) -> AppResult<Batch> {
        let row = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE id = $1 AND farm_id = $2",
        ))
        .bind(batch_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        Ok(row.into())
    }

    /// List all batches for a farm
    pub async fn list_batches(&self, farm_id: Uuid) -> AppResult<Vec<Batch>> {
        let rows = sqlx::query_as::<_, BatchRow>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE farm_id = $1 ORDER BY arrival_date DESC",
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Record mortality, reducing the batch's live bird count.
    ///
    /// The count is checked against the current value under a row lock so
    /// concurrent records cannot push the count negative.
    pub async fn record_mortality(
        &self,
        farm_id: Uuid,
        batch_id: Uuid,
        input: RecordMortalityInput,
    ) -> AppResult<Batch> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, i32>(
            "SELECT current_bird_count FROM batches WHERE id = $1 AND farm_id = $2 FOR UPDATE",
        )
        .bind(batch_id)
        .bind(farm_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        validate_mortality(input.count, current).map_err(|msg| AppError::Validation {
            field: "count".to_string(),
            message: msg.to_string(),
        })?;

        let row = sqlx::query_as::<_, BatchRow>(&format!(
            r#"
            UPDATE batches
            SET current_bird_count = current_bird_count - $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {BATCH_COLUMNS}
            "#,
        ))
        .bind(input.count)
        .bind(batch_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(batch_id = %batch_id, count = input.count, "mortality recorded");

        Ok(row.into())
    }

    /// Close out a batch (sold or cleared)
    pub async fn deactivate_batch(&self, farm_id: Uuid, batch_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE batches SET is_active = false, updated_at = NOW() WHERE id = $1 AND farm_id = $2",
        )
        .bind(batch_id)
        .bind(farm_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Batch".to_string()));
        }

        Ok(())
    }
}

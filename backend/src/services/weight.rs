//! Weight sampling service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::WeightSample;
use shared::validation::validate_weight_sample;

/// Weight service for recording periodic batch weigh-ins
#[derive(Clone)]
pub struct WeightService {
    db: PgPool,
}

/// Database row for a weight sample
#[derive(Debug, FromRow)]
struct SampleRow {
    id: Uuid,
    batch_id: Uuid,
    sample_date: NaiveDate,
    sample_size: i32,
    avg_weight_kg: Decimal,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SampleRow> for WeightSample {
    fn from(row: SampleRow) -> Self {
        WeightSample {
            id: row.id,
            batch_id: row.batch_id,
            sample_date: row.sample_date,
            sample_size: row.sample_size,
            avg_weight_kg: row.avg_weight_kg,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

/// Input for recording a weight sample
#[derive(Debug, Deserialize)]
pub struct RecordSampleInput {
    pub sample_date: NaiveDate,
    pub sample_size: i32,
    pub avg_weight_kg: Decimal,
    pub notes: Option<String>,
}

impl WeightService {
    /// Create a new WeightService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a weight sample for a batch
    pub async fn record_sample(
        &self,
        farm_id: Uuid,
        batch_id: Uuid,
        input: RecordSampleInput,
    ) -> AppResult<WeightSample> {
        let arrival_date = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT arrival_date FROM batches WHERE id = $1 AND farm_id = $2",
        )
        .bind(batch_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        validate_weight_sample(
            input.sample_size,
            input.avg_weight_kg,
            input.sample_date,
            arrival_date,
        )
        .map_err(|msg| AppError::Validation {
            field: "sample".to_string(),
            message: msg.to_string(),
        })?;

        let row = sqlx::query_as::<_, SampleRow>(
            r#"
            INSERT INTO weight_samples (batch_id, sample_date, sample_size, avg_weight_kg, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, batch_id, sample_date, sample_size, avg_weight_kg, notes, created_at
            "#,
        )
        .bind(batch_id)
        .bind(input.sample_date)
        .bind(input.sample_size)
        .bind(input.avg_weight_kg)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get weight samples for a batch in chronological order
    pub async fn get_batch_samples(
        &self,
        farm_id: Uuid,
        batch_id: Uuid,
    ) -> AppResult<Vec<WeightSample>> {
        let batch_found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM batches WHERE id = $1 AND farm_id = $2)",
        )
        .bind(batch_id)
        .bind(farm_id)
        .fetch_one(&self.db)
        .await?;

        if !batch_found {
            return Err(AppError::NotFound("Batch".to_string()));
        }

        let rows = sqlx::query_as::<_, SampleRow>(
            r#"
            SELECT id, batch_id, sample_date, sample_size, avg_weight_kg, notes, created_at
            FROM weight_samples
            WHERE batch_id = $1
            ORDER BY sample_date, created_at
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Delete a weight sample
    pub async fn delete_sample(&self, farm_id: Uuid, sample_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM weight_samples ws
            USING batches b
            WHERE ws.id = $1 AND ws.batch_id = b.id AND b.farm_id = $2
            "#,
        )
        .bind(sample_id)
        .bind(farm_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Weight sample".to_string()));
        }

        Ok(())
    }
}

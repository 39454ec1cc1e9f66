//! Feed efficiency analytics service
//!
//! Read-only: loads a batch's consumption history and weight samples and
//! delegates the metric computation to the shared FCR module. Never writes.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    compute_fcr_report, BatchProfile, FcrBenchmarks, FcrReport, FeedIntake, WeightSample,
};

/// Analytics service for computing FCR reports
#[derive(Clone)]
pub struct AnalyticsService {
    db: PgPool,
    benchmarks: FcrBenchmarks,
}

#[derive(Debug, FromRow)]
struct IntakeRow {
    event_date: NaiveDate,
    quantity_kg: Decimal,
    unit_cost: Option<Decimal>,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    arrival_date: NaiveDate,
    current_bird_count: i32,
    arrival_avg_weight_kg: Option<Decimal>,
}

#[derive(Debug, FromRow)]
struct SampleRow {
    id: Uuid,
    batch_id: Uuid,
    sample_date: NaiveDate,
    sample_size: i32,
    avg_weight_kg: Decimal,
    notes: Option<String>,
    created_at: chrono::DateTime<Utc>,
}

impl AnalyticsService {
    /// Create a new AnalyticsService with an injected benchmark table
    pub fn new(db: PgPool, benchmarks: FcrBenchmarks) -> Self {
        Self { db, benchmarks }
    }

    /// Compute the FCR report for a batch as of a date (defaults to today)
    pub async fn get_fcr_report(
        &self,
        farm_id: Uuid,
        batch_id: Uuid,
        as_of: Option<NaiveDate>,
    ) -> AppResult<FcrReport> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());

        let profile = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT arrival_date, current_bird_count, arrival_avg_weight_kg
            FROM batches
            WHERE id = $1 AND farm_id = $2
            "#,
        )
        .bind(batch_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        let intakes = sqlx::query_as::<_, IntakeRow>(
            r#"
            SELECT event_date, quantity_kg, unit_cost
            FROM ledger_events
            WHERE batch_id = $1 AND kind = 'consumption' AND event_date <= $2
            ORDER BY event_date
            "#,
        )
        .bind(batch_id)
        .bind(as_of)
        .fetch_all(&self.db)
        .await?;

        let samples = sqlx::query_as::<_, SampleRow>(
            r#"
            SELECT id, batch_id, sample_date, sample_size, avg_weight_kg, notes, created_at
            FROM weight_samples
            WHERE batch_id = $1 AND sample_date <= $2
            ORDER BY sample_date, created_at
            "#,
        )
        .bind(batch_id)
        .bind(as_of)
        .fetch_all(&self.db)
        .await?;

        let profile = BatchProfile {
            batch_id,
            arrival_date: profile.arrival_date,
            current_bird_count: profile.current_bird_count,
            arrival_avg_weight_kg: profile.arrival_avg_weight_kg,
        };

        let intakes: Vec<FeedIntake> = intakes
            .into_iter()
            .map(|r| FeedIntake {
                event_date: r.event_date,
                quantity_kg: r.quantity_kg,
                unit_cost: r.unit_cost,
            })
            .collect();

        let samples: Vec<WeightSample> = samples
            .into_iter()
            .map(|r| WeightSample {
                id: r.id,
                batch_id: r.batch_id,
                sample_date: r.sample_date,
                sample_size: r.sample_size,
                avg_weight_kg: r.avg_weight_kg,
                notes: r.notes,
                created_at: r.created_at,
            })
            .collect();

        Ok(compute_fcr_report(
            &profile,
            &intakes,
            &samples,
            &self.benchmarks,
            as_of,
        ))
    }
}

//! Weight sampling models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A periodic weight measurement for a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightSample {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub sample_date: NaiveDate,
    /// Number of birds weighed
    pub sample_size: i32,
    pub avg_weight_kg: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

//! Rearing batch models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rearing batch (flock) of birds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub breed: Option<String>,
    pub arrival_date: NaiveDate,
    pub initial_bird_count: i32,
    /// Live count, adjusted by mortality records
    pub current_bird_count: i32,
    /// Average weight per bird on arrival, used as the day-0 weight when
    /// only a single sample exists
    pub arrival_avg_weight_kg: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Batch {
    /// Age of the batch in days at the given date
    pub fn age_in_days(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.arrival_date).num_days()
    }

    /// Cumulative mortality since arrival
    pub fn total_mortality(&self) -> i32 {
        self.initial_bird_count - self.current_bird_count
    }
}

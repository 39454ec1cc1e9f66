//! Feed lot models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stocked feed lot: one brand/type combination tracked by quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedLot {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub name: String,
    pub feed_type: FeedType,
    /// Current quantity, maintained exclusively through ledger events
    pub quantity_kg: Decimal,
    /// Restock alert threshold
    pub reorder_threshold_kg: Decimal,
    /// Most recent purchase price per kg
    pub unit_cost: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedLot {
    /// Whether the lot has fallen to or below its reorder threshold
    pub fn needs_reorder(&self) -> bool {
        self.is_active && self.quantity_kg <= self.reorder_threshold_kg
    }
}

/// Feed formulation stages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedType {
    Starter,
    Grower,
    Finisher,
    Layer,
    Other,
}

impl FeedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::Starter => "starter",
            FeedType::Grower => "grower",
            FeedType::Finisher => "finisher",
            FeedType::Layer => "layer",
            FeedType::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "starter" => FeedType::Starter,
            "grower" => FeedType::Grower,
            "finisher" => FeedType::Finisher,
            "layer" => FeedType::Layer,
            _ => FeedType::Other,
        }
    }
}

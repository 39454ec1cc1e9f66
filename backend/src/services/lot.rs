//! Feed lot management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{EventKind, FeedLot, FeedType};
use shared::validation::{validate_quantity, validate_reorder_threshold, validate_unit_cost};

/// Lot service for managing feed lots
#[derive(Clone)]
pub struct LotService {
    db: PgPool,
}

/// Database row for a feed lot
#[derive(Debug, FromRow)]
struct LotRow {
    id: Uuid,
    farm_id: Uuid,
    name: String,
    feed_type: String,
    quantity_kg: Decimal,
    reorder_threshold_kg: Decimal,
    unit_cost: Decimal,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LotRow> for FeedLot {
    fn from(row: LotRow) -> Self {
        FeedLot {
            id: row.id,
            farm_id: row.farm_id,
            name: row.name,
            feed_type: FeedType::from_str(&row.feed_type),
            quantity_kg: row.quantity_kg,
            reorder_threshold_kg: row.reorder_threshold_kg,
            unit_cost: row.unit_cost,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a feed lot
#[derive(Debug, Deserialize)]
pub struct CreateLotInput {
    pub name: String,
    pub feed_type: FeedType,
    pub reorder_threshold_kg: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
    /// Opening stock, recorded as an opening purchase event so the ledger
    /// replay invariant holds from the first row
    pub opening_quantity_kg: Option<Decimal>,
}

/// Input for updating a feed lot
#[derive(Debug, Deserialize)]
pub struct UpdateLotInput {
    pub name: Option<String>,
    pub feed_type: Option<FeedType>,
    pub reorder_threshold_kg: Option<Decimal>,
}

const LOT_COLUMNS: &str = "id, farm_id, name, feed_type, quantity_kg, reorder_threshold_kg, \
                           unit_cost, is_active, created_at, updated_at";

impl LotService {
    /// Create a new LotService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a feed lot, optionally with opening stock
    pub async fn create_lot(&self, farm_id: Uuid, input: CreateLotInput) -> AppResult<FeedLot> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Lot name is required".to_string(),
            });
        }

        let threshold = input.reorder_threshold_kg.unwrap_or(Decimal::ZERO);
        validate_reorder_threshold(threshold).map_err(|msg| AppError::Validation {
            field: "reorder_threshold_kg".to_string(),
            message: msg.to_string(),
        })?;

        let unit_cost = input.unit_cost.unwrap_or(Decimal::ZERO);
        validate_unit_cost(unit_cost).map_err(|msg| AppError::Validation {
            field: "unit_cost".to_string(),
            message: msg.to_string(),
        })?;

        if let Some(opening) = input.opening_quantity_kg {
            validate_quantity(opening).map_err(|msg| AppError::Validation {
                field: "opening_quantity_kg".to_string(),
                message: msg.to_string(),
            })?;
        }

        let opening = input.opening_quantity_kg.unwrap_or(Decimal::ZERO);

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, LotRow>(&format!(
            r#"
            INSERT INTO feed_lots (farm_id, name, feed_type, quantity_kg, reorder_threshold_kg, unit_cost)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {LOT_COLUMNS}
            "#,
        ))
        .bind(farm_id)
        .bind(input.name.trim())
        .bind(input.feed_type.as_str())
        .bind(opening)
        .bind(threshold)
        .bind(unit_cost)
        .fetch_one(&mut *tx)
        .await?;

        if opening > Decimal::ZERO {
            sqlx::query(
                r#"
                INSERT INTO ledger_events (farm_id, lot_id, kind, quantity_kg, unit_cost, event_date)
                VALUES ($1, $2, $3, $4, $5, NOW()::date)
                "#,
            )
            .bind(farm_id)
            .bind(row.id)
            .bind(EventKind::Purchase.as_str())
            .bind(opening)
            .bind(unit_cost)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(row.into())
    }

    /// Get a feed lot by ID
    pub async fn get_lot(&self, farm_id: Uuid, lot_id: Uuid) -> AppResult<FeedLot> {
        let row = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM feed_lots WHERE id = $1 AND farm_id = $2",
        ))
        .bind(lot_id)
        .bind(farm_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Lot".to_string()))?;

        Ok(row.into())
    }

    /// List all feed lots for a farm
    pub async fn list_lots(&self, farm_id: Uuid) -> AppResult<Vec<FeedLot>> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            "SELECT {LOT_COLUMNS} FROM feed_lots WHERE farm_id = $1 ORDER BY name",
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// List active lots at or below their reorder threshold
    pub async fn list_low_stock(&self, farm_id: Uuid) -> AppResult<Vec<FeedLot>> {
        let rows = sqlx::query_as::<_, LotRow>(&format!(
            r#"
            SELECT {LOT_COLUMNS}
            FROM feed_lots
            WHERE farm_id = $1 AND is_active = true AND quantity_kg <= reorder_threshold_kg
            ORDER BY quantity_kg
            "#,
        ))
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Update a feed lot's descriptive fields.
    ///
    /// Quantity is deliberately not updatable here; stock only moves
    /// through the ledger.
    pub async fn update_lot(
        &self,
        farm_id: Uuid,
        lot_id: Uuid,
        input: UpdateLotInput,
    ) -> AppResult<FeedLot> {
        let existing = self.get_lot(farm_id, lot_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let feed_type = input.feed_type.unwrap_or(existing.feed_type);
        let threshold = input
            .reorder_threshold_kg
            .unwrap_or(existing.reorder_threshold_kg);

        validate_reorder_threshold(threshold).map_err(|msg| AppError::Validation {
            field: "reorder_threshold_kg".to_string(),
            message: msg.to_string(),
        })?;

        let row = sqlx::query_as::<_, LotRow>(&format!(
            r#"
            UPDATE feed_lots
            SET name = $1, feed_type = $2, reorder_threshold_kg = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {LOT_COLUMNS}
            "#,
        ))
        .bind(&name)
        .bind(feed_type.as_str())
        .bind(threshold)
        .bind(lot_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Deactivate a feed lot (lots with ledger history are never deleted)
    pub async fn deactivate_lot(&self, farm_id: Uuid, lot_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE feed_lots SET is_active = false, updated_at = NOW() WHERE id = $1 AND farm_id = $2",
        )
        .bind(lot_id)
        .bind(farm_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Lot".to_string()));
        }

        Ok(())
    }
}

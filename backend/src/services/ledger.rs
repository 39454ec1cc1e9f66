//! Stock ledger service
//!
//! Single write path for feed lot quantities. Every operation runs in one
//! transaction that locks the affected lot rows before the check-then-apply
//! step, so the stock-floor validation cannot race with a concurrent
//! mutation of the same lot.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{
    amendment_moves, check_moves, retraction_move, AmendedEvent, EventKind, LedgerEvent,
    StockMove,
};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::{validate_quantity, validate_unit_cost};

/// Ledger service for applying, amending and retracting stock events
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// Database row for a ledger event
#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    farm_id: Uuid,
    lot_id: Uuid,
    kind: String,
    quantity_kg: Decimal,
    unit_cost: Option<Decimal>,
    batch_id: Option<Uuid>,
    event_date: NaiveDate,
    created_at: chrono::DateTime<Utc>,
}

impl EventRow {
    fn into_event(self) -> AppResult<LedgerEvent> {
        let kind = EventKind::from_str(&self.kind)
            .ok_or_else(|| AppError::Internal(format!("unknown event kind '{}'", self.kind)))?;
        Ok(LedgerEvent {
            id: self.id,
            farm_id: self.farm_id,
            lot_id: self.lot_id,
            kind,
            quantity_kg: self.quantity_kg,
            unit_cost: self.unit_cost,
            batch_id: self.batch_id,
            event_date: self.event_date,
            created_at: self.created_at,
        })
    }
}

/// Input for recording a feed purchase
#[derive(Debug, Deserialize)]
pub struct RecordPurchaseInput {
    pub lot_id: Uuid,
    pub quantity_kg: Decimal,
    pub unit_cost: Decimal,
    pub event_date: Option<NaiveDate>,
}

/// Input for recording feed consumption by a batch
#[derive(Debug, Deserialize)]
pub struct RecordConsumptionInput {
    pub lot_id: Uuid,
    pub batch_id: Uuid,
    pub quantity_kg: Decimal,
    pub event_date: Option<NaiveDate>,
}

/// Input for amending an existing event; omitted fields keep their values
#[derive(Debug, Deserialize)]
pub struct AmendEventInput {
    pub lot_id: Option<Uuid>,
    pub quantity_kg: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
    pub batch_id: Option<Uuid>,
    pub event_date: Option<NaiveDate>,
}

/// An applied event together with the lot quantity it produced
#[derive(Debug, Serialize)]
pub struct AppliedEvent {
    pub event: LedgerEvent,
    pub lot_quantity_kg: Decimal,
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a feed purchase, increasing the lot's quantity
    pub async fn record_purchase(
        &self,
        farm_id: Uuid,
        input: RecordPurchaseInput,
    ) -> AppResult<AppliedEvent> {
        validate_quantity(input.quantity_kg).map_err(|msg| AppError::Validation {
            field: "quantity_kg".to_string(),
            message: msg.to_string(),
        })?;
        validate_unit_cost(input.unit_cost).map_err(|msg| AppError::Validation {
            field: "unit_cost".to_string(),
            message: msg.to_string(),
        })?;

        let event_date = input.event_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        let current = lock_lot(&mut tx, farm_id, input.lot_id).await?;
        let new_quantity = current + input.quantity_kg;

        sqlx::query(
            "UPDATE feed_lots SET quantity_kg = $1, unit_cost = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(new_quantity)
        .bind(input.unit_cost)
        .bind(input.lot_id)
        .execute(&mut *tx)
        .await?;

        let event = insert_event(
            &mut tx,
            farm_id,
            input.lot_id,
            EventKind::Purchase,
            input.quantity_kg,
            Some(input.unit_cost),
            None,
            event_date,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(lot_id = %input.lot_id, quantity_kg = %input.quantity_kg, "purchase recorded");

        Ok(AppliedEvent {
            event,
            lot_quantity_kg: new_quantity,
        })
    }

    /// Record feed consumption by a batch, decreasing the lot's quantity.
    ///
    /// Rejected entirely with `InsufficientStock` when the lot cannot cover
    /// the quantity; partial consumption is never applied.
    pub async fn record_consumption(
        &self,
        farm_id: Uuid,
        input: RecordConsumptionInput,
    ) -> AppResult<AppliedEvent> {
        validate_quantity(input.quantity_kg).map_err(|msg| AppError::Validation {
            field: "quantity_kg".to_string(),
            message: msg.to_string(),
        })?;

        let event_date = input.event_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        batch_exists(&mut tx, farm_id, input.batch_id).await?;

        let current = lock_lot(&mut tx, farm_id, input.lot_id).await?;
        if input.quantity_kg > current {
            return Err(AppError::InsufficientStock {
                requested_kg: input.quantity_kg,
                available_kg: current,
            });
        }
        let new_quantity = current - input.quantity_kg;

        // Snapshot the lot's current price on the event so analytics cost
        // totals reflect what the feed actually cost
        let unit_cost =
            sqlx::query_scalar::<_, Decimal>("SELECT unit_cost FROM feed_lots WHERE id = $1")
                .bind(input.lot_id)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query("UPDATE feed_lots SET quantity_kg = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_quantity)
            .bind(input.lot_id)
            .execute(&mut *tx)
            .await?;

        let event = insert_event(
            &mut tx,
            farm_id,
            input.lot_id,
            EventKind::Consumption,
            input.quantity_kg,
            Some(unit_cost),
            Some(input.batch_id),
            event_date,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            lot_id = %input.lot_id,
            batch_id = %input.batch_id,
            quantity_kg = %input.quantity_kg,
            "consumption recorded"
        );

        Ok(AppliedEvent {
            event,
            lot_quantity_kg: new_quantity,
        })
    }

    /// Amend an event: reverse its original delta, then apply the new one.
    ///
    /// All-or-nothing: if the forward application would violate the stock
    /// floor on any affected lot, the transaction rolls back and every lot
    /// keeps its prior quantity.
    pub async fn amend_event(
        &self,
        farm_id: Uuid,
        event_id: Uuid,
        input: AmendEventInput,
    ) -> AppResult<AppliedEvent> {
        let mut tx = self.db.begin().await?;

        let old = fetch_event(&mut tx, farm_id, event_id).await?;

        let amended = merge_amendment(&old, &input)?;

        if let Some(batch_id) = input.batch_id {
            batch_exists(&mut tx, farm_id, batch_id).await?;
        }

        let moves = amendment_moves(&old, &amended);
        let quantities = lock_move_lots(&mut tx, farm_id, &moves).await?;

        let updated = check_moves(&quantities, &moves).map_err(|v| AppError::InsufficientStock {
            requested_kg: amended.quantity_kg,
            available_kg: quantities.get(&v.lot_id).copied().unwrap_or(Decimal::ZERO),
        })?;

        write_quantities(&mut tx, &quantities, &updated).await?;

        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE ledger_events
            SET lot_id = $1, quantity_kg = $2, unit_cost = $3, batch_id = $4, event_date = $5
            WHERE id = $6
            RETURNING id, farm_id, lot_id, kind, quantity_kg, unit_cost, batch_id,
                      event_date, created_at
            "#,
        )
        .bind(amended.lot_id)
        .bind(amended.quantity_kg)
        .bind(amended.unit_cost)
        .bind(amended.batch_id)
        .bind(amended.event_date)
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        let lot_quantity_kg = updated
            .get(&amended.lot_id)
            .copied()
            .unwrap_or(Decimal::ZERO);

        tx.commit().await?;

        tracing::info!(event_id = %event_id, "ledger event amended");

        Ok(AppliedEvent {
            event: row.into_event()?,
            lot_quantity_kg,
        })
    }

    /// Retract an event, applying the exact inverse of its original delta.
    ///
    /// Retracting a purchase that has since been consumed past the floor
    /// fails with `RetractionWouldUnderflow` and changes nothing.
    pub async fn retract_event(&self, farm_id: Uuid, event_id: Uuid) -> AppResult<Decimal> {
        let mut tx = self.db.begin().await?;

        let event = fetch_event(&mut tx, farm_id, event_id).await?;

        let reversal = retraction_move(&event);
        let quantities = lock_move_lots(&mut tx, farm_id, &[reversal]).await?;

        let updated =
            check_moves(&quantities, &[reversal]).map_err(|v| AppError::RetractionWouldUnderflow {
                shortfall_kg: -v.resulting_kg,
            })?;

        write_quantities(&mut tx, &quantities, &updated).await?;

        sqlx::query("DELETE FROM ledger_events WHERE id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        let new_quantity = updated
            .get(&event.lot_id)
            .copied()
            .unwrap_or(Decimal::ZERO);

        tx.commit().await?;

        tracing::info!(event_id = %event_id, lot_id = %event.lot_id, "ledger event retracted");

        Ok(new_quantity)
    }

    /// List ledger events for a farm, newest first, one page at a time
    pub async fn list_events(
        &self,
        farm_id: Uuid,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<LedgerEvent>> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ledger_events WHERE farm_id = $1")
                .bind(farm_id)
                .fetch_one(&self.db)
                .await?;

        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, farm_id, lot_id, kind, quantity_kg, unit_cost, batch_id,
                   event_date, created_at
            FROM ledger_events
            WHERE farm_id = $1
            ORDER BY event_date DESC, created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(farm_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let data = rows
            .into_iter()
            .map(|r| r.into_event())
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta {
                page: pagination.page,
                per_page: pagination.per_page,
                total: total as u64,
            },
        })
    }

    /// Get events for a lot
    pub async fn get_lot_events(&self, farm_id: Uuid, lot_id: Uuid) -> AppResult<Vec<LedgerEvent>> {
        let lot_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM feed_lots WHERE id = $1 AND farm_id = $2)",
        )
        .bind(lot_id)
        .bind(farm_id)
        .fetch_one(&self.db)
        .await?;

        if !lot_exists {
            return Err(AppError::NotFound("Lot".to_string()));
        }

        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, farm_id, lot_id, kind, quantity_kg, unit_cost, batch_id,
                   event_date, created_at
            FROM ledger_events
            WHERE lot_id = $1 AND farm_id = $2
            ORDER BY event_date DESC, created_at DESC
            "#,
        )
        .bind(lot_id)
        .bind(farm_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(|r| r.into_event()).collect()
    }
}

/// Merge an amendment input over the old event and validate the result.
///
/// Omitted fields keep the old event's values; the kind never changes.
fn merge_amendment(old: &LedgerEvent, input: &AmendEventInput) -> AppResult<AmendedEvent> {
    let amended = AmendedEvent {
        lot_id: input.lot_id.unwrap_or(old.lot_id),
        kind: old.kind,
        quantity_kg: input.quantity_kg.unwrap_or(old.quantity_kg),
        unit_cost: input.unit_cost.or(old.unit_cost),
        batch_id: input.batch_id.or(old.batch_id),
        event_date: input.event_date.unwrap_or(old.event_date),
    };

    validate_quantity(amended.quantity_kg).map_err(|msg| AppError::Validation {
        field: "quantity_kg".to_string(),
        message: msg.to_string(),
    })?;
    if let Some(cost) = amended.unit_cost {
        validate_unit_cost(cost).map_err(|msg| AppError::Validation {
            field: "unit_cost".to_string(),
            message: msg.to_string(),
        })?;
    }
    if amended.kind == EventKind::Consumption && amended.batch_id.is_none() {
        return Err(AppError::Validation {
            field: "batch_id".to_string(),
            message: "Consumption events require a batch".to_string(),
        });
    }

    Ok(amended)
}

/// Lock a lot row and return its current quantity
async fn lock_lot(
    tx: &mut Transaction<'_, Postgres>,
    farm_id: Uuid,
    lot_id: Uuid,
) -> AppResult<Decimal> {
    sqlx::query_scalar::<_, Decimal>(
        "SELECT quantity_kg FROM feed_lots WHERE id = $1 AND farm_id = $2 FOR UPDATE",
    )
    .bind(lot_id)
    .bind(farm_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Lot".to_string()))
}

/// Lock every lot a set of moves touches, in ascending id order to keep
/// concurrent cross-lot amendments deadlock-free
async fn lock_move_lots(
    tx: &mut Transaction<'_, Postgres>,
    farm_id: Uuid,
    moves: &[StockMove],
) -> AppResult<HashMap<Uuid, Decimal>> {
    let mut lot_ids: Vec<Uuid> = moves.iter().map(|m| m.lot_id).collect();
    lot_ids.sort();
    lot_ids.dedup();

    let mut quantities = HashMap::with_capacity(lot_ids.len());
    for lot_id in lot_ids {
        let quantity = lock_lot(tx, farm_id, lot_id).await?;
        quantities.insert(lot_id, quantity);
    }
    Ok(quantities)
}

/// Persist the changed quantities from a checked move plan
async fn write_quantities(
    tx: &mut Transaction<'_, Postgres>,
    before: &HashMap<Uuid, Decimal>,
    after: &HashMap<Uuid, Decimal>,
) -> AppResult<()> {
    for (lot_id, quantity) in after {
        if before.get(lot_id) != Some(quantity) {
            sqlx::query("UPDATE feed_lots SET quantity_kg = $1, updated_at = NOW() WHERE id = $2")
                .bind(quantity)
                .bind(lot_id)
                .execute(&mut **tx)
                .await?;
        }
    }
    Ok(())
}

/// Fetch an event scoped to a farm
async fn fetch_event(
    tx: &mut Transaction<'_, Postgres>,
    farm_id: Uuid,
    event_id: Uuid,
) -> AppResult<LedgerEvent> {
    sqlx::query_as::<_, EventRow>(
        r#"
        SELECT id, farm_id, lot_id, kind, quantity_kg, unit_cost, batch_id,
               event_date, created_at
        FROM ledger_events
        WHERE id = $1 AND farm_id = $2
        "#,
    )
    .bind(event_id)
    .bind(farm_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Ledger event".to_string()))?
    .into_event()
}

/// Validate a batch belongs to the farm
async fn batch_exists(
    tx: &mut Transaction<'_, Postgres>,
    farm_id: Uuid,
    batch_id: Uuid,
) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM batches WHERE id = $1 AND farm_id = $2)",
    )
    .bind(batch_id)
    .bind(farm_id)
    .fetch_one(&mut **tx)
    .await?;

    if !exists {
        return Err(AppError::NotFound("Batch".to_string()));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn insert_event(
    tx: &mut Transaction<'_, Postgres>,
    farm_id: Uuid,
    lot_id: Uuid,
    kind: EventKind,
    quantity_kg: Decimal,
    unit_cost: Option<Decimal>,
    batch_id: Option<Uuid>,
    event_date: NaiveDate,
) -> AppResult<LedgerEvent> {
    sqlx::query_as::<_, EventRow>(
        r#"
        INSERT INTO ledger_events (farm_id, lot_id, kind, quantity_kg, unit_cost, batch_id, event_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, farm_id, lot_id, kind, quantity_kg, unit_cost, batch_id,
                  event_date, created_at
        "#,
    )
    .bind(farm_id)
    .bind(lot_id)
    .bind(kind.as_str())
    .bind(quantity_kg)
    .bind(unit_cost)
    .bind(batch_id)
    .bind(event_date)
    .fetch_one(&mut **tx)
    .await?
    .into_event()
}

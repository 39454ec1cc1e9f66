//! Stock ledger event models and move planning
//!
//! A feed lot's quantity is a materialized projection of its ledger events.
//! Events are applied as deltas against the stored quantity rather than by
//! replaying the full history, so every amendment or retraction plans the
//! reverse delta first and the whole plan is checked against the stock floor
//! before anything is committed.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Kinds of stock-changing events
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Purchase,
    Consumption,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Purchase => "purchase",
            EventKind::Consumption => "consumption",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(EventKind::Purchase),
            "consumption" => Some(EventKind::Consumption),
            _ => None,
        }
    }
}

/// A recorded stock-changing transaction against a feed lot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub lot_id: Uuid,
    pub kind: EventKind,
    pub quantity_kg: Decimal,
    /// Price per kg paid (purchases) or carried from the lot (consumption)
    pub unit_cost: Option<Decimal>,
    /// Consuming batch, present for consumption events
    pub batch_id: Option<Uuid>,
    pub event_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl LedgerEvent {
    /// Signed contribution of this event to its lot's quantity
    pub fn net_delta(&self) -> Decimal {
        net_delta(self.kind, self.quantity_kg)
    }
}

/// Signed stock delta for an event kind and quantity
pub fn net_delta(kind: EventKind, quantity_kg: Decimal) -> Decimal {
    match kind {
        EventKind::Purchase => quantity_kg,
        EventKind::Consumption => -quantity_kg,
    }
}

/// Replacement values for an amended event
#[derive(Debug, Clone, Deserialize)]
pub struct AmendedEvent {
    pub lot_id: Uuid,
    pub kind: EventKind,
    pub quantity_kg: Decimal,
    pub unit_cost: Option<Decimal>,
    pub batch_id: Option<Uuid>,
    pub event_date: NaiveDate,
}

/// A single planned quantity adjustment against one lot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockMove {
    pub lot_id: Uuid,
    pub delta: Decimal,
}

/// Plan the moves for amending `old` into `amended`.
///
/// The old event's delta is reversed on its lot and the amended delta applied
/// to the (possibly different) target lot. Same-lot amendments collapse into
/// one net move so the stock floor is judged on the combined effect.
pub fn amendment_moves(old: &LedgerEvent, amended: &AmendedEvent) -> Vec<StockMove> {
    let reversal = -old.net_delta();
    let forward = net_delta(amended.kind, amended.quantity_kg);

    if old.lot_id == amended.lot_id {
        vec![StockMove {
            lot_id: old.lot_id,
            delta: reversal + forward,
        }]
    } else {
        vec![
            StockMove {
                lot_id: old.lot_id,
                delta: reversal,
            },
            StockMove {
                lot_id: amended.lot_id,
                delta: forward,
            },
        ]
    }
}

/// Plan the move that undoes an event entirely
pub fn retraction_move(event: &LedgerEvent) -> StockMove {
    StockMove {
        lot_id: event.lot_id,
        delta: -event.net_delta(),
    }
}

/// A planned move would drive a lot's quantity below zero
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("stock floor violated for lot {lot_id}: resulting quantity would be {resulting_kg}")]
pub struct StockFloorViolation {
    pub lot_id: Uuid,
    pub resulting_kg: Decimal,
}

/// Replay `moves` in order over the given lot quantities.
///
/// Returns the updated quantities, or the first stock-floor violation. The
/// input map is untouched on failure, which gives amendments their
/// all-or-nothing semantics: callers commit the returned quantities or
/// nothing at all.
pub fn check_moves(
    quantities: &HashMap<Uuid, Decimal>,
    moves: &[StockMove],
) -> Result<HashMap<Uuid, Decimal>, StockFloorViolation> {
    let mut updated = quantities.clone();
    for m in moves {
        let entry = updated.entry(m.lot_id).or_insert(Decimal::ZERO);
        let resulting = *entry + m.delta;
        if resulting < Decimal::ZERO {
            return Err(StockFloorViolation {
                lot_id: m.lot_id,
                resulting_kg: resulting,
            });
        }
        *entry = resulting;
    }
    Ok(updated)
}

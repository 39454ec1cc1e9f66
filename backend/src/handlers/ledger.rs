//! HTTP handlers for stock ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ledger::{
    AmendEventInput, AppliedEvent, LedgerService, RecordConsumptionInput, RecordPurchaseInput,
};
use crate::AppState;
use shared::models::LedgerEvent;
use shared::types::{PaginatedResponse, Pagination};

/// Record a feed purchase
pub async fn record_purchase(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordPurchaseInput>,
) -> AppResult<Json<AppliedEvent>> {
    let service = LedgerService::new(state.db);
    let applied = service
        .record_purchase(current_user.0.farm_id, input)
        .await?;
    Ok(Json(applied))
}

/// Record feed consumption by a batch
pub async fn record_consumption(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordConsumptionInput>,
) -> AppResult<Json<AppliedEvent>> {
    let service = LedgerService::new(state.db);
    let applied = service
        .record_consumption(current_user.0.farm_id, input)
        .await?;
    Ok(Json(applied))
}

/// Amend an existing ledger event
pub async fn amend_event(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(event_id): Path<Uuid>,
    Json(input): Json<AmendEventInput>,
) -> AppResult<Json<AppliedEvent>> {
    let service = LedgerService::new(state.db);
    let applied = service
        .amend_event(current_user.0.farm_id, event_id, input)
        .await?;
    Ok(Json(applied))
}

/// Retract (delete with compensation) a ledger event
pub async fn retract_event(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(event_id): Path<Uuid>,
) -> AppResult<Json<RetractionResponse>> {
    let service = LedgerService::new(state.db);
    let lot_quantity_kg = service
        .retract_event(current_user.0.farm_id, event_id)
        .await?;
    Ok(Json(RetractionResponse { lot_quantity_kg }))
}

/// List ledger events for the farm, paginated
pub async fn list_events(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<LedgerEvent>>> {
    let service = LedgerService::new(state.db);
    let events = service
        .list_events(current_user.0.farm_id, pagination)
        .await?;
    Ok(Json(events))
}

/// Response for a retraction: the lot quantity after compensation
#[derive(Debug, serde::Serialize)]
pub struct RetractionResponse {
    pub lot_quantity_kg: Decimal,
}

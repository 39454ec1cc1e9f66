//! HTTP handlers for feed lot endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ledger::LedgerService;
use crate::services::lot::{CreateLotInput, LotService, UpdateLotInput};
use crate::AppState;
use shared::models::{FeedLot, LedgerEvent};

/// Create a feed lot
pub async fn create_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateLotInput>,
) -> AppResult<Json<FeedLot>> {
    let service = LotService::new(state.db);
    let lot = service.create_lot(current_user.0.farm_id, input).await?;
    Ok(Json(lot))
}

/// Get a feed lot
pub async fn get_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<Uuid>,
) -> AppResult<Json<FeedLot>> {
    let service = LotService::new(state.db);
    let lot = service.get_lot(current_user.0.farm_id, lot_id).await?;
    Ok(Json(lot))
}

/// List all feed lots
pub async fn list_lots(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<FeedLot>>> {
    let service = LotService::new(state.db);
    let lots = service.list_lots(current_user.0.farm_id).await?;
    Ok(Json(lots))
}

/// List lots at or below their reorder threshold
pub async fn list_low_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<FeedLot>>> {
    let service = LotService::new(state.db);
    let lots = service.list_low_stock(current_user.0.farm_id).await?;
    Ok(Json(lots))
}

/// Update a feed lot's descriptive fields
pub async fn update_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<Uuid>,
    Json(input): Json<UpdateLotInput>,
) -> AppResult<Json<FeedLot>> {
    let service = LotService::new(state.db);
    let lot = service
        .update_lot(current_user.0.farm_id, lot_id, input)
        .await?;
    Ok(Json(lot))
}

/// Deactivate a feed lot
pub async fn deactivate_lot(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = LotService::new(state.db);
    service
        .deactivate_lot(current_user.0.farm_id, lot_id)
        .await?;
    Ok(Json(()))
}

/// Get ledger events for a lot
pub async fn get_lot_events(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(lot_id): Path<Uuid>,
) -> AppResult<Json<Vec<LedgerEvent>>> {
    let service = LedgerService::new(state.db);
    let events = service
        .get_lot_events(current_user.0.farm_id, lot_id)
        .await?;
    Ok(Json(events))
}

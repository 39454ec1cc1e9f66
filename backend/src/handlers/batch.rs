//! HTTP handlers for batch endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::batch::{BatchService, CreateBatchInput, RecordMortalityInput};
use crate::AppState;
use shared::models::Batch;

/// Create a rearing batch
pub async fn create_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateBatchInput>,
) -> AppResult<Json<Batch>> {
    let service = BatchService::new(state.db);
    let batch = service.create_batch(current_user.0.farm_id, input).await?;
    Ok(Json(batch))
}

/// Get a batch
pub async fn get_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<Batch>> {
    let service = BatchService::new(state.db);
    let batch = service.get_batch(current_user.0.farm_id, batch_id).await?;
    Ok(Json(batch))
}

/// List all batches
pub async fn list_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Batch>>> {
    let service = BatchService::new(state.db);
    let batches = service.list_batches(current_user.0.farm_id).await?;
    Ok(Json(batches))
}

/// Record mortality against a batch
pub async fn record_mortality(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<RecordMortalityInput>,
) -> AppResult<Json<Batch>> {
    let service = BatchService::new(state.db);
    let batch = service
        .record_mortality(current_user.0.farm_id, batch_id, input)
        .await?;
    Ok(Json(batch))
}

/// Close out a batch
pub async fn deactivate_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = BatchService::new(state.db);
    service
        .deactivate_batch(current_user.0.farm_id, batch_id)
        .await?;
    Ok(Json(()))
}

//! HTTP handlers for weight sampling endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::weight::{RecordSampleInput, WeightService};
use crate::AppState;
use shared::models::WeightSample;

/// Record a weight sample for a batch
pub async fn record_weight_sample(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<RecordSampleInput>,
) -> AppResult<Json<WeightSample>> {
    let service = WeightService::new(state.db);
    let sample = service
        .record_sample(current_user.0.farm_id, batch_id, input)
        .await?;
    Ok(Json(sample))
}

/// Get weight samples for a batch
pub async fn get_weight_samples(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<Vec<WeightSample>>> {
    let service = WeightService::new(state.db);
    let samples = service
        .get_batch_samples(current_user.0.farm_id, batch_id)
        .await?;
    Ok(Json(samples))
}

/// Delete a weight sample
pub async fn delete_weight_sample(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(sample_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = WeightService::new(state.db);
    service
        .delete_sample(current_user.0.farm_id, sample_id)
        .await?;
    Ok(Json(()))
}

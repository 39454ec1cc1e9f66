//! HTTP handlers for feed efficiency analytics

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::AnalyticsService;
use crate::AppState;
use shared::models::FcrReport;

/// Query parameters for an FCR report
#[derive(Debug, Deserialize)]
pub struct FcrReportParams {
    pub as_of: Option<NaiveDate>,
}

/// Compute the FCR report for a batch
pub async fn get_fcr_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Query(params): Query<FcrReportParams>,
) -> AppResult<Json<FcrReport>> {
    let service = AnalyticsService::new(state.db, state.config.fcr.clone());
    let report = service
        .get_fcr_report(current_user.0.farm_id, batch_id, params.as_of)
        .await?;
    Ok(Json(report))
}

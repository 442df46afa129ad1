//! Activity trail handlers

use axum::{
    extract::{Query, State},
    Json,
};

use shared::models::ActivityLog;
use shared::types::{PaginatedResponse, Pagination};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ActivityService;
use crate::AppState;

/// List activity, newest first
pub async fn list_activity(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<ActivityLog>>> {
    let service = ActivityService::new(state.store);
    Ok(Json(service.list(&pagination).await?))
}

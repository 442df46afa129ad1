//! HTTP handlers for stock movements

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use uuid::Uuid;

use shared::models::{MovementRequest, Transaction};

use crate::error::AppResult;
use crate::handlers::snapshot_event;
use crate::middleware::CurrentUser;
use crate::services::movement::MovementListQuery;
use crate::services::MovementService;
use crate::AppState;

/// Record a stock in or stock out
pub async fn record_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<MovementRequest>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let service = MovementService::new(state.store);
    let transaction = service
        .apply_movement(request, Some(current_user.0.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Recent ledger entries, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<MovementListQuery>,
) -> AppResult<Json<Vec<Transaction>>> {
    let service = MovementService::new(state.store);
    Ok(Json(service.recent_movements(query).await?))
}

/// Delete a ledger entry without touching stock
pub async fn delete_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(transaction_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = MovementService::new(state.store);
    service
        .delete_movement(transaction_id, Some(current_user.0.user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Live recent-ledger snapshots as Server-Sent Events
pub async fn stream_movements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let stream = state
        .store
        .subscribe_transactions()
        .await?
        .into_stream()
        .map(|transactions| snapshot_event("transactions", &transactions));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

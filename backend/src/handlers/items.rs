//! HTTP handlers for catalogue endpoints

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{Category, CreateItemInput, InventoryItem, ItemFilter, UpdateItemInput};

use crate::error::{AppError, AppResult};
use crate::handlers::snapshot_event;
use crate::middleware::CurrentUser;
use crate::services::ItemService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ItemListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub low_stock: Option<bool>,
}

impl ItemListQuery {
    fn into_filter(self) -> AppResult<ItemFilter> {
        let category = match self.category.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => Some(
                label
                    .parse::<Category>()
                    .map_err(|m| AppError::validation("category", m))?,
            ),
            _ => None,
        };
        Ok(ItemFilter {
            search: self.search,
            category,
            low_stock: self.low_stock.unwrap_or(false),
        })
    }
}

/// List or search the catalogue
pub async fn list_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ItemListQuery>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let service = ItemService::new(state.store);
    let items = service.list(&query.into_filter()?).await?;
    Ok(Json(items))
}

/// Get one item
pub async fn get_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<InventoryItem>> {
    let service = ItemService::new(state.store);
    Ok(Json(service.get(item_id).await?))
}

/// Items at or below their minimum quantity
pub async fn list_low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let service = ItemService::new(state.store);
    Ok(Json(service.low_stock().await?))
}

/// Add an item to the catalogue (admin only)
pub async fn create_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateItemInput>,
) -> AppResult<(StatusCode, Json<InventoryItem>)> {
    current_user.0.require_admin()?;
    let service = ItemService::new(state.store);
    let item = service.create(input, Some(current_user.0.user_id)).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Edit an item (admin only)
pub async fn update_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(input): Json<UpdateItemInput>,
) -> AppResult<Json<InventoryItem>> {
    current_user.0.require_admin()?;
    let service = ItemService::new(state.store);
    let item = service
        .update(item_id, input, Some(current_user.0.user_id))
        .await?;
    Ok(Json(item))
}

/// Remove an item (admin only)
pub async fn delete_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    current_user.0.require_admin()?;
    let service = ItemService::new(state.store);
    service.delete(item_id, Some(current_user.0.user_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Live catalogue snapshots as Server-Sent Events
pub async fn stream_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let stream = state
        .store
        .subscribe_items()
        .await?
        .into_stream()
        .map(|items| snapshot_event("items", &items));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

//! Route definitions for the Hardware Inventory Platform

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - catalogue and stock movements
        .nest("/inventory", inventory_routes(state.clone()))
        // Protected routes - reports
        .nest("/reports", report_routes(state.clone()))
        // Protected routes - activity trail
        .nest("/activity", activity_routes(state))
}

/// Inventory routes (protected)
fn inventory_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route("/items/low-stock", get(handlers::list_low_stock))
        .route("/items/stream", get(handlers::stream_items))
        .route(
            "/items/:item_id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route(
            "/movements",
            get(handlers::list_movements).post(handlers::record_movement),
        )
        .route("/movements/stream", get(handlers::stream_movements))
        .route(
            "/movements/:transaction_id",
            delete(handlers::delete_movement),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Reporting routes (protected)
fn report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/sales", get(handlers::get_sales_report))
        .route("/inventory", get(handlers::get_inventory_report))
        .route("/dashboard", get(handlers::get_dashboard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Activity routes (protected)
fn activity_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_activity))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

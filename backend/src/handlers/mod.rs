//! HTTP handlers

pub mod activity;
pub mod health;
pub mod items;
pub mod movements;
pub mod reporting;

pub use activity::*;
pub use health::*;
pub use items::*;
pub use movements::*;
pub use reporting::*;

use std::convert::Infallible;

use axum::response::sse::Event;
use serde::Serialize;

/// Render one live snapshot as a named SSE event
pub(crate) fn snapshot_event<T: Serialize>(
    name: &'static str,
    snapshot: &T,
) -> Result<Event, Infallible> {
    Ok(Event::default()
        .event(name)
        .json_data(snapshot)
        .unwrap_or_else(|e| {
            tracing::error!("Failed to encode {} snapshot: {}", name, e);
            Event::default().event("error").data("snapshot encoding failed")
        }))
}

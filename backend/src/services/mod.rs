//! Business logic services for the Hardware Inventory Platform

pub mod activity;
pub mod items;
pub mod movement;
pub mod reporting;

pub use activity::ActivityService;
pub use items::ItemService;
pub use movement::MovementService;
pub use reporting::ReportingService;

use crate::error::AppError;
use crate::store::StoreError;

/// Convert a store failure that happened after an earlier write of the same
/// operation already landed. The records are left as written.
pub(crate) fn partial_write(operation: &str, written: &str, err: StoreError) -> AppError {
    tracing::warn!(
        operation,
        written,
        error = %err,
        "Partial write: earlier records were kept"
    );
    AppError::StoreUnavailable(format!("{} partially applied: {}", operation, err))
}

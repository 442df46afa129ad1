//! Domain models for the Hardware Inventory platform

mod activity;
mod item;
mod report;
mod transaction;

pub use activity::*;
pub use item::*;
pub use report::*;
pub use transaction::*;

//! Shared types and models for the Hardware Inventory platform
//!
//! This crate contains the domain model and the pure inventory rules
//! (stock arithmetic, low-stock derivation, report reductions) shared
//! between the backend, the browser (via WASM), and tests.

pub mod lenient;
pub mod low_stock;
pub mod models;
pub mod reporting;
pub mod stock;
pub mod types;
pub mod validation;

pub use low_stock::*;
pub use models::*;
pub use reporting::*;
pub use stock::*;
pub use types::*;
pub use validation::*;

//! WebAssembly module for the Hardware Inventory platform
//!
//! Provides client-side computation for:
//! - Low-stock derivation over live inventory snapshots
//! - Inventory and sales summaries
//! - Stock movement form validation

use chrono::{FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

fn to_js(err: String) -> JsValue {
    JsValue::from_str(&err)
}

fn parse_items(items_json: &str) -> Result<Vec<InventoryItem>, String> {
    serde_json::from_str(items_json).map_err(|e| format!("Invalid items JSON: {}", e))
}

fn low_stock_json(items_json: &str) -> Result<String, String> {
    let items = parse_items(items_json)?;
    let low: Vec<LowStockEntry> = shared::derive_low_stock(&items)
        .into_iter()
        .map(LowStockEntry::from)
        .collect();
    serde_json::to_string(&low).map_err(|e| e.to_string())
}

fn inventory_summary_json(items_json: &str) -> Result<String, String> {
    let items = parse_items(items_json)?;
    serde_json::to_string(&shared::compute_inventory_summary(&items)).map_err(|e| e.to_string())
}

fn sales_summary_json(
    transactions_json: &str,
    start: &str,
    end: &str,
    utc_offset_minutes: i32,
) -> Result<String, String> {
    let transactions: Vec<Transaction> = serde_json::from_str(transactions_json)
        .map_err(|e| format!("Invalid transactions JSON: {}", e))?;
    let parse_date = |s: &str| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date {}: {}", s, e))
    };
    let range = DateRange::new(parse_date(start)?, parse_date(end)?).map_err(str::to_string)?;
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
        .ok_or_else(|| format!("Invalid UTC offset: {} minutes", utc_offset_minutes))?;
    serde_json::to_string(&shared::compute_sales_summary(&transactions, &range, offset))
        .map_err(|e| e.to_string())
}

fn quantity_from_text(input: &str) -> Result<i64, String> {
    QuantityInput::Text(input.to_string())
        .parse()
        .map_err(|e| e.to_string())
}

/// Low-stock entries for a JSON array of inventory items
#[wasm_bindgen]
pub fn derive_low_stock(items_json: &str) -> Result<String, JsValue> {
    low_stock_json(items_json).map_err(to_js)
}

/// Inventory summary for a JSON array of inventory items
#[wasm_bindgen]
pub fn summarize_inventory(items_json: &str) -> Result<String, JsValue> {
    inventory_summary_json(items_json).map_err(to_js)
}

/// Sales summary for a JSON array of transactions over `start..=end` (YYYY-MM-DD)
#[wasm_bindgen]
pub fn summarize_sales(
    transactions_json: &str,
    start: &str,
    end: &str,
    utc_offset_minutes: i32,
) -> Result<String, JsValue> {
    sales_summary_json(transactions_json, start, end, utc_offset_minutes).map_err(to_js)
}

/// Validate a quantity typed into a stock movement form
#[wasm_bindgen]
pub fn validate_quantity(input: &str) -> Result<f64, JsValue> {
    quantity_from_text(input).map(|q| q as f64).map_err(to_js)
}

/// Whether a stock-out of `quantity` can be fulfilled from `current_stock`
#[wasm_bindgen]
pub fn can_fulfil_stock_out(current_stock: f64, quantity: f64) -> bool {
    quantity > 0.0 && quantity.fract() == 0.0 && quantity <= current_stock
}

fn line_total(quantity: f64, unit_value: f64) -> Result<f64, String> {
    let decimal = |v: f64| Decimal::try_from(v).map_err(|_| format!("Invalid amount: {}", v));
    decimal(quantity)?
        .checked_mul(decimal(unit_value)?)
        .ok_or_else(|| "Line total is too large".to_string())?
        .to_string()
        .parse()
        .map_err(|e: std::num::ParseFloatError| e.to_string())
}

/// Line total shown on the movement form
#[wasm_bindgen]
pub fn movement_total(quantity: f64, unit_value: f64) -> Result<f64, JsValue> {
    line_total(quantity, unit_value).map_err(to_js)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_tolerates_malformed_records() {
        let json = r#"[
            {"name": "Wire", "current_stock": "n/a", "min_quantity": 1},
            {"name": "Pipe", "current_stock": 40, "min_quantity": 10},
            {"name": "Brush"}
        ]"#;
        let low: Vec<LowStockEntry> = serde_json::from_str(&low_stock_json(json).unwrap()).unwrap();
        let names: Vec<&str> = low.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Wire", "Brush"]);
    }

    #[test]
    fn test_inventory_summary_categories() {
        let json = r#"[{"category": "Paint"}, {"category": "Paint"}, {}]"#;
        let summary: InventorySummary =
            serde_json::from_str(&inventory_summary_json(json).unwrap()).unwrap();
        assert_eq!(summary.category_breakdown["Paint"], 2);
        assert_eq!(summary.category_breakdown["Uncategorized"], 1);
    }

    #[test]
    fn test_sales_summary_rejects_reversed_range() {
        assert!(sales_summary_json("[]", "2024-03-02", "2024-03-01", 480).is_err());
        assert!(sales_summary_json("[]", "2024-03-01", "2024-03-31", 480).is_ok());
    }

    #[test]
    fn test_quantity_validation() {
        assert_eq!(quantity_from_text("4"), Ok(4));
        assert!(quantity_from_text("0").is_err());
        assert!(quantity_from_text("1.5").is_err());
    }

    #[test]
    fn test_stock_out_check() {
        assert!(can_fulfil_stock_out(15.0, 15.0));
        assert!(!can_fulfil_stock_out(15.0, 20.0));
        assert!(!can_fulfil_stock_out(15.0, 0.0));
    }

    #[test]
    fn test_movement_total() {
        assert!((line_total(3.0, 2.5).unwrap() - 7.5).abs() < 0.001);
        assert!(line_total(1e18, 1e11).is_err());
        assert!(line_total(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_inventory_summary_with_extreme_record() {
        let json = r#"[{"current_stock": 1000000000000000000, "price": "100000000000"}]"#;
        let summary: InventorySummary =
            serde_json::from_str(&inventory_summary_json(json).unwrap()).unwrap();
        assert_eq!(summary.total_value, Decimal::MAX);
    }
}

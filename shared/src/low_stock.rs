//! Low-stock derivation
//!
//! Low stock is never stored on an item; it is recomputed from the current
//! snapshot on every read.

use crate::models::{InventoryItem, LowStockEntry};

/// An item is low on stock when `current_stock <= min_quantity` (inclusive).
pub fn is_low_stock(item: &InventoryItem) -> bool {
    item.current_stock <= item.min_quantity
}

/// Select the low-stock items, preserving input order.
pub fn derive_low_stock(items: &[InventoryItem]) -> Vec<&InventoryItem> {
    let low: Vec<&InventoryItem> = items.iter().filter(|item| is_low_stock(item)).collect();
    tracing::debug!(
        scanned = items.len(),
        low_stock = low.len(),
        "derived low-stock items"
    );
    low
}

impl From<&InventoryItem> for LowStockEntry {
    fn from(item: &InventoryItem) -> Self {
        Self {
            item_id: item.id,
            product_code: item.product_code.clone(),
            name: item.name.clone(),
            current_stock: item.current_stock,
            min_quantity: item.min_quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> InventoryItem {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn threshold_is_inclusive() {
        let at = item(json!({"name": "at", "current_stock": 5, "min_quantity": 5}));
        let above = item(json!({"name": "above", "current_stock": 6, "min_quantity": 5}));
        assert!(is_low_stock(&at));
        assert!(!is_low_stock(&above));
    }

    #[test]
    fn preserves_input_order() {
        let items = vec![
            item(json!({"name": "a", "current_stock": 1, "min_quantity": 3})),
            item(json!({"name": "b", "current_stock": 9, "min_quantity": 3})),
            item(json!({"name": "c", "current_stock": 0, "min_quantity": 0})),
        ];
        let names: Vec<&str> = derive_low_stock(&items)
            .into_iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn malformed_records_are_evaluated_at_zero() {
        let items = vec![
            item(json!({"name": "missing"})),
            item(json!({"name": "garbage", "current_stock": "lots", "min_quantity": 2})),
            item(json!({"name": "no-min", "current_stock": 3})),
        ];
        let names: Vec<&str> = derive_low_stock(&items)
            .into_iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names, vec!["missing", "garbage"]);
    }
}

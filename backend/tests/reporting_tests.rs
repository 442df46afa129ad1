//! Reporting and low-stock tests
//!
//! Tests for aggregate reports including:
//! - sales summaries over local calendar days
//! - inventory summaries and category breakdown
//! - low-stock derivation on well-formed and malformed records

mod common;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use common::{dec, dyn_store, item_input};
use inventory_backend::error::AppError;
use inventory_backend::services::ReportingService;
use inventory_backend::store::{InventoryStore, MemoryStore};
use shared::low_stock::derive_low_stock;
use shared::models::{Category, InventoryItem, MovementDirection, Transaction};
use shared::reporting::{compute_inventory_summary, compute_sales_summary, UNCATEGORIZED};
use shared::types::DateRange;

fn manila() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

fn ledger_entry(
    direction: MovementDirection,
    date: DateTime<Utc>,
    quantity: i64,
    unit: &str,
) -> Transaction {
    let unit_value = dec(unit);
    Transaction {
        id: Uuid::new_v4(),
        direction,
        item_id: Uuid::new_v4(),
        item_name: "Pipe Wrench".to_string(),
        item_code: "PLB-010".to_string(),
        quantity,
        unit_value,
        total: Decimal::from(quantity) * unit_value,
        previous_stock: 100,
        new_stock: 100 - quantity,
        reference_number: String::new(),
        notes: String::new(),
        supplier: None,
        date,
        created_by: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_sales_summary_reads_only_stock_out_in_range() {
        let store = MemoryStore::new();
        // 2024-05-01 00:30 local
        store
            .seed_transaction(ledger_entry(
                MovementDirection::Out,
                Utc.with_ymd_and_hms(2024, 4, 30, 16, 30, 0).unwrap(),
                2,
                "150",
            ))
            .await;
        // 2024-05-31 23:59 local
        store
            .seed_transaction(ledger_entry(
                MovementDirection::Out,
                Utc.with_ymd_and_hms(2024, 5, 31, 15, 59, 0).unwrap(),
                1,
                "99.99",
            ))
            .await;
        // 2024-06-01 00:00 local, outside
        store
            .seed_transaction(ledger_entry(
                MovementDirection::Out,
                Utc.with_ymd_and_hms(2024, 5, 31, 16, 0, 0).unwrap(),
                7,
                "10",
            ))
            .await;
        store
            .seed_transaction(ledger_entry(
                MovementDirection::In,
                Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap(),
                50,
                "80",
            ))
            .await;

        let service = ReportingService::new(dyn_store(&store), manila());
        let range = DateRange::new(date(2024, 5, 1), date(2024, 5, 31)).unwrap();
        let summary = service.sales_summary(&range).await.unwrap();

        assert_eq!(summary.total_revenue, dec("399.99"));
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.daily_sales.len(), 2);
        assert_eq!(summary.daily_sales[&date(2024, 5, 1)], dec("300"));
        assert_eq!(summary.average_daily, dec("399.99") / Decimal::from(2));
    }

    #[tokio::test]
    async fn test_range_defaults_to_current_month() {
        let service = ReportingService::new(dyn_store(&MemoryStore::new()), manila());
        // 2024-02-29 18:00 UTC is March 1st in Manila
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 18, 0, 0).unwrap();

        let range = service.resolve_range(None, None, now).unwrap();
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(range.end, date(2024, 3, 31));

        let range = service
            .resolve_range(Some(date(2024, 3, 10)), None, now)
            .unwrap();
        assert_eq!(range.start, date(2024, 3, 10));
        assert_eq!(range.end, date(2024, 3, 31));
    }

    #[tokio::test]
    async fn test_inverted_range_is_rejected() {
        let service = ReportingService::new(dyn_store(&MemoryStore::new()), manila());
        let err = service
            .resolve_range(Some(date(2024, 3, 10)), Some(date(2024, 3, 9)), Utc::now())
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_inventory_summary_and_dashboard() {
        let store = MemoryStore::new();
        let mut paint = item_input("PNT-001", 10, 5, "100");
        paint.category = Some(Category::Paint);
        let mut primer = item_input("PNT-002", 5, 5, "50");
        primer.category = Some(Category::Paint);
        let mut misc = item_input("MSC-001", 1, 0, "2.50");
        misc.category = None;
        for input in [paint, primer, misc] {
            store.insert_item(input, Utc::now()).await.unwrap();
        }

        let now = Utc::now();
        store
            .seed_transaction(ledger_entry(MovementDirection::Out, now, 1, "100"))
            .await;
        store
            .seed_transaction(ledger_entry(
                MovementDirection::In,
                now - Duration::days(400),
                1,
                "100",
            ))
            .await;

        let service = ReportingService::new(dyn_store(&store), manila());
        let summary = service.inventory_summary().await.unwrap();
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_value, dec("1252.50"));
        assert_eq!(summary.category_breakdown["Paint"], 2);
        assert_eq!(summary.category_breakdown[UNCATEGORIZED], 1);
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.low_stock_items[0].product_code, "PNT-002");

        let stats = service.dashboard(now).await.unwrap();
        assert_eq!(stats.total_items, 3);
        assert_eq!(stats.low_stock_count, 1);
        assert_eq!(stats.total_value, dec("1252.50"));
        assert_eq!(stats.monthly_transactions, 1);
    }

    #[test]
    fn test_low_stock_boundary() {
        let at_min: InventoryItem =
            serde_json::from_value(json!({"current_stock": 5, "min_quantity": 5})).unwrap();
        let above: InventoryItem =
            serde_json::from_value(json!({"current_stock": 6, "min_quantity": 5})).unwrap();
        let items = vec![at_min, above];
        let low = derive_low_stock(&items);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].current_stock, 5);
    }

    #[test]
    fn test_csv_export_of_daily_rows() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        let txs = vec![ledger_entry(
            MovementDirection::Out,
            Utc.with_ymd_and_hms(2024, 3, 4, 3, 0, 0).unwrap(),
            2,
            "12.50",
        )];
        let summary = compute_sales_summary(&txs, &range, manila());
        let csv = ReportingService::export_to_csv(&summary.daily_rows()).unwrap();
        assert_eq!(csv, "date,revenue\n2024-03-04,25.00\n");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn entry_strategy() -> impl Strategy<Value = Transaction> {
        (
            any::<bool>(),
            0i64..(60 * 24 * 60), // minutes into a 60-day window
            1i64..=20,
            1i64..=100_000, // unit value in cents
        )
            .prop_map(|(is_out, minutes, quantity, cents)| {
                let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
                let direction = if is_out {
                    MovementDirection::Out
                } else {
                    MovementDirection::In
                };
                let at = base + Duration::minutes(minutes);
                let mut t = ledger_entry(direction, at, quantity, "0");
                t.unit_value = Decimal::new(cents, 2);
                t.total = Decimal::from(quantity) * t.unit_value;
                t
            })
    }

    /// A raw record that may be missing or carry garbage in any field
    fn raw_item_strategy() -> impl Strategy<Value = serde_json::Value> {
        let count = prop_oneof![
            (-5i64..50).prop_map(|n| json!(n)),
            Just(json!("abc")),
            Just(json!(null)),
            Just(json!(2.7)),
            (0i64..50).prop_map(|n| json!(n.to_string())),
        ];
        (count.clone(), count).prop_map(|(stock, min)| {
            json!({"name": "x", "current_stock": stock, "min_quantity": min})
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The sales summary does not depend on ledger order
        #[test]
        fn prop_sales_summary_order_independent(
            entries in prop::collection::vec(entry_strategy(), 0..40),
            seed in any::<u64>()
        ) {
            let mut entries = entries;
            let range = DateRange::new(date(2024, 3, 10), date(2024, 4, 5)).unwrap();
            let forward = compute_sales_summary(&entries, &range, manila());

            entries.reverse();
            let reversed = compute_sales_summary(&entries, &range, manila());
            prop_assert_eq!(&forward, &reversed);

            let len = entries.len().max(1);
            entries.rotate_left((seed as usize) % len);
            let rotated = compute_sales_summary(&entries, &range, manila());
            prop_assert_eq!(&forward, &rotated);

            let expected: Decimal = entries
                .iter()
                .filter(|t| t.direction == MovementDirection::Out)
                .filter(|t| range.contains(t.date, manila()))
                .map(|t| t.total)
                .sum();
            prop_assert_eq!(forward.total_revenue, expected);
        }

        /// Low-stock derivation is total on malformed records and idempotent
        #[test]
        fn prop_low_stock_total_and_idempotent(
            raw in prop::collection::vec(raw_item_strategy(), 0..30)
        ) {
            let items: Vec<InventoryItem> = raw
                .into_iter()
                .map(|v| serde_json::from_value(v).unwrap())
                .collect();

            let once: Vec<InventoryItem> = derive_low_stock(&items).into_iter().cloned().collect();
            let twice: Vec<InventoryItem> = derive_low_stock(&once).into_iter().cloned().collect();
            prop_assert_eq!(&once, &twice);

            for item in &once {
                prop_assert!(item.current_stock <= item.min_quantity);
            }

            let summary = compute_inventory_summary(&items);
            prop_assert_eq!(summary.low_stock_count as usize, once.len());
        }
    }
}

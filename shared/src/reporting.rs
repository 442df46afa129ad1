//! Report reductions over inventory and ledger snapshots
//!
//! Every function here is a pure function of its inputs. Sums use exact
//! decimal arithmetic, so results do not depend on input order. Sums that
//! leave the decimal range saturate instead of failing.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use rust_decimal::Decimal;

use crate::low_stock::{derive_low_stock, is_low_stock};
use crate::models::{
    DashboardStats, InventoryItem, InventorySummary, LowStockEntry, MovementDirection,
    SalesSummary, Transaction,
};
use crate::types::{local_date, local_midnight_utc, DateRange};

/// Group label for items without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Summarize stock-out movements falling on the range's local calendar days.
///
/// Stock-in movements and entries outside the range are ignored, whatever
/// the caller passed in.
pub fn compute_sales_summary(
    transactions: &[Transaction],
    range: &DateRange,
    offset: FixedOffset,
) -> SalesSummary {
    let mut daily_sales: BTreeMap<_, Decimal> = BTreeMap::new();
    let mut total_revenue = Decimal::ZERO;
    let mut total_items = 0i64;

    for t in transactions
        .iter()
        .filter(|t| t.direction == MovementDirection::Out && range.contains(t.date, offset))
    {
        let day = daily_sales.entry(local_date(t.date, offset)).or_default();
        *day = day.saturating_add(t.total);
        total_revenue = total_revenue.saturating_add(t.total);
        total_items = total_items.saturating_add(t.quantity);
    }

    let days_with_sales = daily_sales.len();
    let average_daily = if days_with_sales == 0 {
        Decimal::ZERO
    } else {
        total_revenue / Decimal::from(days_with_sales as u64)
    };

    SalesSummary {
        start_date: range.start,
        end_date: range.end,
        total_revenue,
        total_items,
        average_daily,
        daily_sales,
    }
}

/// Summarize the whole catalogue
pub fn compute_inventory_summary(items: &[InventoryItem]) -> InventorySummary {
    let mut category_breakdown: BTreeMap<String, i64> = BTreeMap::new();
    for item in items {
        *category_breakdown
            .entry(item.category_label().to_string())
            .or_default() += 1;
    }

    let low_stock_items: Vec<LowStockEntry> = derive_low_stock(items)
        .into_iter()
        .map(LowStockEntry::from)
        .collect();

    InventorySummary {
        total_items: items.len() as i64,
        total_value: total_stock_value(items),
        low_stock_count: low_stock_items.len() as i64,
        category_breakdown,
        low_stock_items,
    }
}

/// `Σ current_stock × price`
pub fn total_stock_value(items: &[InventoryItem]) -> Decimal {
    items
        .iter()
        .map(InventoryItem::stock_value)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Dashboard headline numbers. `since` bounds the transaction count (inclusive).
pub fn compute_dashboard_stats(
    items: &[InventoryItem],
    transactions: &[Transaction],
    since: DateTime<Utc>,
) -> DashboardStats {
    DashboardStats {
        total_items: items.len() as i64,
        low_stock_count: items.iter().filter(|i| is_low_stock(i)).count() as i64,
        total_value: total_stock_value(items),
        monthly_transactions: transactions.iter().filter(|t| t.date >= since).count() as i64,
    }
}

/// First instant of the local calendar month containing `now`
pub fn month_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let today = local_date(now, offset);
    let first = today.with_day(1).unwrap_or(today);
    local_midnight_utc(first, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;
    use uuid::Uuid;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn sale(
        date: DateTime<Utc>,
        quantity: i64,
        total: i64,
        direction: MovementDirection,
    ) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            direction,
            item_id: Uuid::nil(),
            item_name: "Paint Roller".into(),
            item_code: "TL-9".into(),
            quantity,
            unit_value: Decimal::from(total) / Decimal::from(quantity),
            total: Decimal::from(total),
            previous_stock: 100,
            new_stock: 100 - quantity,
            reference_number: String::new(),
            notes: String::new(),
            supplier: None,
            date,
            created_by: None,
        }
    }

    fn march() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn sales_summary_buckets_by_local_day() {
        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap();
        let txs = vec![
            sale(at(1, 2), 2, 200, MovementDirection::Out),
            sale(at(1, 5), 1, 100, MovementDirection::Out),
            // Mar 3 local, Mar 2 UTC
            sale(at(2, 20), 3, 300, MovementDirection::Out),
            // stock in is not a sale
            sale(at(2, 1), 9, 900, MovementDirection::In),
            // outside the range
            sale(
                Utc.with_ymd_and_hms(2024, 4, 2, 1, 0, 0).unwrap(),
                9,
                900,
                MovementDirection::Out,
            ),
        ];

        let summary = compute_sales_summary(&txs, &march(), offset());
        assert_eq!(summary.total_revenue, Decimal::from(600));
        assert_eq!(summary.total_items, 6);
        assert_eq!(summary.daily_sales.len(), 2);
        assert_eq!(
            summary.daily_sales[&NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()],
            Decimal::from(300)
        );
        assert_eq!(summary.average_daily, Decimal::from(300));
        assert_eq!(summary.daily_rows().len(), 2);
    }

    #[test]
    fn sales_summary_without_sales_averages_zero() {
        let summary = compute_sales_summary(&[], &march(), offset());
        assert_eq!(summary.total_revenue, Decimal::ZERO);
        assert_eq!(summary.average_daily, Decimal::ZERO);
        assert!(summary.daily_sales.is_empty());
    }

    #[test]
    fn category_breakdown_groups_missing_as_uncategorized() {
        let paint = json!({"category": "Paint", "current_stock": 10, "min_quantity": 1});
        let items: Vec<InventoryItem> = vec![
            serde_json::from_value(paint.clone()).unwrap(),
            serde_json::from_value(paint).unwrap(),
            serde_json::from_value(json!({})).unwrap(),
        ];
        let summary = compute_inventory_summary(&items);
        assert_eq!(summary.category_breakdown.len(), 2);
        assert_eq!(summary.category_breakdown["Paint"], 2);
        assert_eq!(summary.category_breakdown[UNCATEGORIZED], 1);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.low_stock_count, 1);
    }

    #[test]
    fn inventory_value_is_stock_times_price() {
        let items: Vec<InventoryItem> = vec![
            serde_json::from_value(json!({"current_stock": 10, "price": "100"})).unwrap(),
            serde_json::from_value(json!({"current_stock": 3, "price": "2.50"})).unwrap(),
        ];
        assert_eq!(total_stock_value(&items), Decimal::new(100750, 2));
    }

    #[test]
    fn extreme_records_saturate_instead_of_failing() {
        let huge = json!({"current_stock": 1_000_000_000_000_000_000i64, "price": "100000000000"});
        let items: Vec<InventoryItem> = vec![
            serde_json::from_value(huge).unwrap(),
            serde_json::from_value(json!({"current_stock": 5, "price": "1"})).unwrap(),
        ];
        let summary = compute_inventory_summary(&items);
        assert_eq!(summary.total_value, Decimal::MAX);
        assert_eq!(summary.total_items, 2);

        let stats = compute_dashboard_stats(&items, &[], Utc::now());
        assert_eq!(stats.total_value, Decimal::MAX);

        let mut big = sale(
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap(),
            1,
            1,
            MovementDirection::Out,
        );
        big.total = Decimal::MAX;
        let sales = compute_sales_summary(&[big.clone(), big], &march(), offset());
        assert_eq!(sales.total_revenue, Decimal::MAX);
        assert_eq!(sales.total_items, 2);
    }

    #[test]
    fn month_start_is_local_first_day() {
        // 2024-03-31 20:00 UTC is already April 1st in UTC+8
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 20, 0, 0).unwrap();
        assert_eq!(
            month_start(now, offset()),
            Utc.with_ymd_and_hms(2024, 3, 31, 16, 0, 0).unwrap()
        );
    }

    #[test]
    fn dashboard_counts_transactions_since_month_start() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let feb_28 = Utc.with_ymd_and_hms(2024, 2, 28, 0, 0, 0).unwrap();
        let mar_5 = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let txs = vec![
            sale(feb_28, 1, 1, MovementDirection::Out),
            sale(since, 1, 1, MovementDirection::In),
            sale(mar_5, 1, 1, MovementDirection::Out),
        ];
        let stats = compute_dashboard_stats(&[], &txs, since);
        assert_eq!(stats.monthly_transactions, 2);
        assert_eq!(stats.total_items, 0);
    }
}

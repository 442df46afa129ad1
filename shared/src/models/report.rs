//! Report and dashboard models

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sales over a date range, built from stock-out movements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_revenue: Decimal,
    pub total_items: i64,
    /// `total_revenue / days with at least one sale`, 0 when there were none
    pub average_daily: Decimal,
    /// Revenue per local calendar day; only days with sales appear
    pub daily_sales: BTreeMap<NaiveDate, Decimal>,
}

impl SalesSummary {
    /// Daily rows in date order, for tabular export
    pub fn daily_rows(&self) -> Vec<DailySales> {
        self.daily_sales
            .iter()
            .map(|(date, revenue)| DailySales {
                date: *date,
                revenue: *revenue,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

/// Snapshot statistics over the whole catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_items: i64,
    pub total_value: Decimal,
    pub low_stock_count: i64,
    pub category_breakdown: BTreeMap<String, i64>,
    pub low_stock_items: Vec<LowStockEntry>,
}

/// An item at or below its minimum quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockEntry {
    pub item_id: Uuid,
    pub product_code: String,
    pub name: String,
    pub current_stock: i64,
    pub min_quantity: i64,
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_items: i64,
    pub low_stock_count: i64,
    pub total_value: Decimal,
    pub monthly_transactions: i64,
}

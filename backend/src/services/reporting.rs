//! Reporting service for sales and stock analytics and data export

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use shared::models::{
    DashboardStats, InventorySummary, ItemFilter, MovementDirection, SalesSummary,
    TransactionQuery,
};
use shared::reporting::{
    compute_dashboard_stats, compute_inventory_summary, compute_sales_summary, month_start,
};
use shared::types::{local_date, DateRange};

use crate::error::{AppError, AppResult};
use crate::store::DynStore;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    store: DynStore,
    offset: FixedOffset,
}

impl ReportingService {
    /// `offset` is the local calendar used to bucket days
    pub fn new(store: DynStore, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    /// Resolve an optional range, defaulting each missing end to the current
    /// local month
    pub fn resolve_range(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> AppResult<DateRange> {
        let month = DateRange::month_of(local_date(now, self.offset));
        DateRange::new(start.unwrap_or(month.start), end.unwrap_or(month.end))
            .map_err(|m| AppError::ValidationError(m.to_string()))
    }

    /// Stock-out revenue over the range's local calendar days
    pub async fn sales_summary(&self, range: &DateRange) -> AppResult<SalesSummary> {
        let (from, until) = range.utc_bounds(self.offset);
        let transactions = self
            .store
            .query_transactions(&TransactionQuery {
                direction: Some(MovementDirection::Out),
                from: Some(from),
                until: Some(until),
                ..TransactionQuery::default()
            })
            .await?;

        tracing::debug!(
            start = %range.start,
            end = %range.end,
            transactions = transactions.len(),
            "Computing sales summary"
        );

        Ok(compute_sales_summary(&transactions, range, self.offset))
    }

    pub async fn inventory_summary(&self) -> AppResult<InventorySummary> {
        let items = self.store.query_items(&ItemFilter::default()).await?;
        Ok(compute_inventory_summary(&items))
    }

    /// Headline numbers; transactions are counted from the start of the local month
    pub async fn dashboard(&self, now: DateTime<Utc>) -> AppResult<DashboardStats> {
        let since = month_start(now, self.offset);
        let items = self.store.query_items(&ItemFilter::default()).await?;
        let transactions = self
            .store
            .query_transactions(&TransactionQuery {
                from: Some(since),
                ..TransactionQuery::default()
            })
            .await?;

        Ok(compute_dashboard_stats(&items, &transactions, since))
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

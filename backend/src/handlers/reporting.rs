//! Reporting handlers for analytics and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use shared::models::{DashboardStats, InventorySummary};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::ReportingService;
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub format: Option<String>, // "json" or "csv"
}

/// A report tagged with the currency its amounts are in
#[derive(Serialize)]
pub struct Report<T> {
    pub currency: String,
    #[serde(flatten)]
    pub report: T,
}

fn parse_date(field: &str, value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|_| AppError::validation(field, "Dates must be formatted YYYY-MM-DD")),
        _ => Ok(None),
    }
}

fn reporting_service(state: &AppState) -> AppResult<ReportingService> {
    Ok(ReportingService::new(
        state.store.clone(),
        state.config.utc_offset()?,
    ))
}

/// Sales summary over a date range, as JSON or daily CSV rows
pub async fn get_sales_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let service = reporting_service(&state)?;

    let range = service.resolve_range(
        parse_date("start_date", query.start_date.as_deref())?,
        parse_date("end_date", query.end_date.as_deref())?,
        Utc::now(),
    )?;
    let summary = service.sales_summary(&range).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&summary.daily_rows())?;
        let disposition = format!(
            "attachment; filename=\"sales_{}_{}.csv\"",
            range.start, range.end
        );
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(Report {
            currency: state.config.reporting.currency.clone(),
            report: summary,
        })
        .into_response())
    }
}

/// Catalogue totals, category breakdown and low-stock list
pub async fn get_inventory_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Report<InventorySummary>>> {
    let service = reporting_service(&state)?;
    let summary = service.inventory_summary().await?;
    Ok(Json(Report {
        currency: state.config.reporting.currency.clone(),
        report: summary,
    }))
}

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Report<DashboardStats>>> {
    let service = reporting_service(&state)?;
    let stats = service.dashboard(Utc::now()).await?;
    Ok(Json(Report {
        currency: state.config.reporting.currency.clone(),
        report: stats,
    }))
}

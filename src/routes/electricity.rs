//! Electricity HTTP endpoints.
//!
//! - GET /api/electricity?page&limit&sortBy&sortOrder&startDate&endDate
//! - GET /api/electricity/:date

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::{IntoParams, ToSchema};

use crate::db::models::HourlyRecord;
use crate::db::queries::{SortKey, SortOrder};
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::{dec_to_f64, opt_dec_to_f64};
use crate::services::daily::{self, ListRequest};
use crate::services::stats::{DataQuality, DaySummary, DivergenceHour, PricedHour};

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Page and limit arrive as strings so that non-numeric values can fall
/// back to defaults instead of failing extraction with a 400.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DailyListQuery {
    /// 1-based page number; non-numeric or < 1 falls back to 1
    pub page: Option<String>,
    /// Page size; non-numeric or < 1 falls back to 10
    pub limit: Option<String>,
    /// Sort key: date | totalProduction | totalConsumption | avgPrice
    /// (anything else sorts by date)
    pub sort_by: Option<String>,
    /// ASC or DESC (anything else sorts ascending)
    pub sort_order: Option<String>,
    /// Inclusive lower date bound (YYYY-MM-DD)
    pub start_date: Option<String>,
    /// Inclusive upper date bound (YYYY-MM-DD)
    pub end_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One row of the paginated daily list view.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyListItem {
    /// Calendar date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Total production over the day in MWh
    pub total_production_mwh: f64,
    /// Total consumption over the day in kWh
    pub total_consumption_kwh: f64,
    /// Average of non-null hourly prices, rounded to 2 decimals
    pub avg_price: f64,
    /// Number of hourly rows contributing to this day
    pub hours_count: i64,
    /// Longest run of consecutive hours with a negative price
    pub longest_negative_streak: u32,
    /// Data-quality diagnostic for the day's hourly rows
    pub quality: DataQuality,
}

impl From<daily::DailyListEntry> for DailyListItem {
    fn from(e: daily::DailyListEntry) -> Self {
        Self {
            date: e.date,
            total_production_mwh: dec_to_f64(e.total_production_mwh),
            total_consumption_kwh: dec_to_f64(e.total_consumption_kwh),
            avg_price: dec_to_f64(e.avg_price),
            hours_count: e.hours_count,
            longest_negative_streak: e.longest_negative_streak,
            quality: e.quality,
        }
    }
}

/// Pagination metadata for the daily list view.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    /// Resolved 1-based page number
    pub page: i64,
    /// Resolved page size
    pub limit: i64,
    /// Total number of pages for the (filtered) result set
    pub total_pages: i64,
}

impl From<daily::ListMeta> for ListMeta {
    fn from(m: daily::ListMeta) -> Self {
        Self {
            page: m.page,
            limit: m.limit,
            total_pages: m.total_pages,
        }
    }
}

/// Response type for GET /api/electricity.
#[derive(Debug, Serialize, ToSchema)]
pub struct DailyListResponse {
    pub data: Vec<DailyListItem>,
    pub meta: ListMeta,
}

/// An hour with its price, for the cheapest/most-expensive lists.
#[derive(Debug, Serialize, ToSchema)]
pub struct PricedHourDto {
    /// Hour start time in ISO 8601 / RFC 3339 format
    pub time: String,
    /// Price for the hour (cents per kWh)
    pub price: f64,
}

impl From<PricedHour> for PricedHourDto {
    fn from(h: PricedHour) -> Self {
        Self {
            time: h.time.to_rfc3339(),
            price: dec_to_f64(h.price),
        }
    }
}

/// The hour where consumption most exceeds production.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaxDiffHourDto {
    /// Hour start time in ISO 8601 / RFC 3339 format
    pub time: String,
    /// Deficit for that hour in kWh (consumption − production)
    pub value_kwh: f64,
}

impl From<DivergenceHour> for MaxDiffHourDto {
    fn from(h: DivergenceHour) -> Self {
        Self {
            time: h.time.to_rfc3339(),
            value_kwh: dec_to_f64(h.value_kwh),
        }
    }
}

/// Summary block of the single-day detail view.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySummaryDto {
    /// Total production over the day in MWh
    pub total_production_mwh: f64,
    /// Total consumption over the day in kWh
    pub total_consumption_kwh: f64,
    /// Average of non-null hourly prices, rounded to 2 decimals
    pub avg_price: f64,
    /// Hour furthest into deficit on a common kWh basis
    pub max_diff_hour: MaxDiffHourDto,
    /// Up to 3 lowest-priced hours, cheapest first
    pub cheapest_hours: Vec<PricedHourDto>,
    /// Up to 3 highest-priced hours, most expensive first
    pub most_expensive_hours: Vec<PricedHourDto>,
}

impl From<DaySummary> for DaySummaryDto {
    fn from(s: DaySummary) -> Self {
        Self {
            total_production_mwh: dec_to_f64(s.total_production_mwh),
            total_consumption_kwh: dec_to_f64(s.total_consumption_kwh),
            avg_price: dec_to_f64(s.avg_price),
            max_diff_hour: s.max_diff_hour.into(),
            cheapest_hours: s.cheapest_hours.into_iter().map(Into::into).collect(),
            most_expensive_hours: s
                .most_expensive_hours
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// One raw hourly record in the detail view.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HourlyRecordDto {
    pub id: i64,
    /// Calendar date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Hour start time in ISO 8601 / RFC 3339 format
    pub starttime: String,
    /// Production in MWh; null when the reading is missing
    pub production_mwh: Option<f64>,
    /// Consumption in kWh; null when the reading is missing
    pub consumption_kwh: Option<f64>,
    /// Price for the hour; null when no price was recorded
    pub hourly_price: Option<f64>,
}

impl From<HourlyRecord> for HourlyRecordDto {
    fn from(r: HourlyRecord) -> Self {
        Self {
            id: r.id,
            date: r.date,
            starttime: r.starttime.to_rfc3339(),
            production_mwh: opt_dec_to_f64(r.production_mwh),
            consumption_kwh: opt_dec_to_f64(r.consumption_kwh),
            hourly_price: opt_dec_to_f64(r.hourly_price),
        }
    }
}

/// Response type for GET /api/electricity/:date.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SingleDayResponse {
    /// The requested date
    pub date: NaiveDate,
    pub summary: DaySummaryDto,
    pub quality: DataQuality,
    /// All hourly rows for the day, ordered by starttime
    pub hourly_data: Vec<HourlyRecordDto>,
}

impl From<daily::SingleDay> for SingleDayResponse {
    fn from(d: daily::SingleDay) -> Self {
        Self {
            date: d.date,
            summary: d.summary.into(),
            quality: d.quality,
            hourly_data: d.hourly.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Paginated daily list with per-day enrichment.
#[utoipa::path(
    get,
    path = "/api/electricity",
    tag = "Electricity",
    params(DailyListQuery),
    responses(
        (status = 200, description = "One page of enriched daily summaries", body = DailyListResponse),
        (status = 400, description = "Malformed or inverted date bounds", body = ErrorResponse),
    )
)]
pub async fn list_daily(
    State(pool): State<PgPool>,
    Query(q): Query<DailyListQuery>,
) -> Result<Json<DailyListResponse>, AppError> {
    let start_date = q
        .start_date
        .as_deref()
        .map(|s| daily::parse_date_param(s, "startDate"))
        .transpose()?;
    let end_date = q
        .end_date
        .as_deref()
        .map(|s| daily::parse_date_param(s, "endDate"))
        .transpose()?;

    let req = ListRequest {
        page: daily::resolve_page(q.page.as_deref()),
        limit: daily::resolve_limit(q.limit.as_deref()),
        sort_key: SortKey::parse(q.sort_by.as_deref()),
        sort_order: SortOrder::parse(q.sort_order.as_deref()),
        start_date,
        end_date,
    };

    let (items, meta) = daily::list_daily(&pool, req).await?;

    Ok(Json(DailyListResponse {
        data: items.into_iter().map(DailyListItem::from).collect(),
        meta: meta.into(),
    }))
}

/// Full detail for one date: summary analytics, data quality, and the
/// raw hourly rows.
#[utoipa::path(
    get,
    path = "/api/electricity/{date}",
    tag = "Electricity",
    params(
        ("date" = String, Path, description = "Calendar date (YYYY-MM-DD)"),
    ),
    responses(
        (status = 200, description = "Single-day statistics", body = SingleDayResponse),
        (status = 400, description = "Malformed date", body = ErrorResponse),
        (status = 404, description = "No data for this date", body = ErrorResponse),
    )
)]
pub async fn get_single_day(
    State(pool): State<PgPool>,
    Path(date): Path<String>,
) -> Result<Json<SingleDayResponse>, AppError> {
    let date = daily::parse_date_param(&date, "date")?;
    let day = daily::get_single_day(&pool, date).await?;
    Ok(Json(day.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_hourly_record_dto_preserves_nulls() {
        let record = HourlyRecord {
            id: 7,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            starttime: Utc.with_ymd_and_hms(2024, 1, 15, 3, 0, 0).unwrap(),
            production_mwh: None,
            consumption_kwh: Some(Decimal::from_str("0").unwrap()),
            hourly_price: None,
        };
        let dto = HourlyRecordDto::from(record);
        assert_eq!(dto.production_mwh, None);
        // A reading of 0 is a value, not "missing".
        assert_eq!(dto.consumption_kwh, Some(0.0));
        assert_eq!(dto.hourly_price, None);
        assert!(dto.starttime.starts_with("2024-01-15T03:00:00"));
    }

    #[test]
    fn test_daily_list_item_serializes_camel_case() {
        let item = DailyListItem {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            total_production_mwh: 12.5,
            total_consumption_kwh: 9800.0,
            avg_price: 2.33,
            hours_count: 20,
            longest_negative_streak: 2,
            quality: DataQuality {
                is_valid: false,
                missing_rows: 4,
                issues: vec!["Missing 4 hourly data entries.".to_string()],
            },
        };
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["date"], "2024-01-15");
        assert_eq!(v["totalProductionMwh"], 12.5);
        assert_eq!(v["totalConsumptionKwh"], 9800.0);
        assert_eq!(v["avgPrice"], 2.33);
        assert_eq!(v["hoursCount"], 20);
        assert_eq!(v["longestNegativeStreak"], 2);
        assert_eq!(v["quality"]["isValid"], false);
        assert_eq!(v["quality"]["missingRows"], 4);
    }
}

//! Aggregation orchestrator.
//!
//! Combines paginated daily summaries from the store with enrichment
//! computed by the statistics engine. Per list request the cost is a
//! fixed number of queries regardless of page size: one summary page,
//! one distinct-day count, and ONE batched hourly fetch covering the
//! union of the page's dates — never one fetch per row.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::db::models::HourlyRecord;
use crate::db::queries::{self, SortKey, SortOrder};
use crate::errors::AppError;
use crate::helpers::round_price;
use crate::services::stats::{self, DataQuality, DaySummary, StatsError};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Resolved parameters for a daily list request.
#[derive(Debug)]
pub struct ListRequest {
    pub page: i64,
    pub limit: i64,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One enriched row of the daily list view.
#[derive(Debug)]
pub struct DailyListEntry {
    pub date: NaiveDate,
    pub total_production_mwh: Decimal,
    pub total_consumption_kwh: Decimal,
    /// Rounded to 2 decimals.
    pub avg_price: Decimal,
    /// Number of hourly rows contributing to this day.
    pub hours_count: i64,
    pub longest_negative_streak: u32,
    pub quality: DataQuality,
}

#[derive(Debug)]
pub struct ListMeta {
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// Full detail for one date.
#[derive(Debug)]
pub struct SingleDay {
    pub date: NaiveDate,
    pub summary: DaySummary,
    pub quality: DataQuality,
    pub hourly: Vec<HourlyRecord>,
}

/// Resolve a page parameter leniently: non-numeric or < 1 falls back to
/// the default instead of failing.
pub fn resolve_page(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(DEFAULT_PAGE)
}

/// Resolve a limit parameter leniently: non-numeric or < 1 falls back to
/// the default instead of failing.
pub fn resolve_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_LIMIT)
}

/// Parse a date parameter strictly. Unlike page/limit there is no sane
/// fallback for a malformed date, so this rejects.
pub fn parse_date_param(raw: &str, name: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid {name}. Expected YYYY-MM-DD.")))
}

/// Reject an inverted date range. Bounds are optional and inclusive.
pub fn validate_date_range(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(AppError::BadRequest(
                "startDate must not be after endDate.".to_string(),
            ));
        }
    }
    Ok(())
}

/// Build one page of enriched daily list items.
///
/// Items come back in the same order the store returned summaries; no
/// re-sorting happens here.
pub async fn list_daily(
    pool: &PgPool,
    req: ListRequest,
) -> Result<(Vec<DailyListEntry>, ListMeta), AppError> {
    validate_date_range(req.start_date, req.end_date)?;

    let page = queries::fetch_daily_summaries(
        pool,
        req.page,
        req.limit,
        req.sort_key,
        req.sort_order,
        req.start_date,
        req.end_date,
    )
    .await?;

    let dates: Vec<NaiveDate> = page.rows.iter().map(|r| r.date).collect();
    let hourly = queries::fetch_hourly_for_dates(pool, &dates).await?;

    let items = page
        .rows
        .iter()
        .map(|summary| {
            let day_rows: Vec<HourlyRecord> = hourly
                .iter()
                .filter(|h| h.date == summary.date)
                .cloned()
                .collect();

            DailyListEntry {
                date: summary.date,
                total_production_mwh: summary.total_production_mwh.unwrap_or(Decimal::ZERO),
                total_consumption_kwh: summary.total_consumption_kwh.unwrap_or(Decimal::ZERO),
                avg_price: round_price(summary.avg_price.unwrap_or(Decimal::ZERO)),
                hours_count: summary.hours_count,
                longest_negative_streak: stats::longest_negative_streak(&day_rows),
                quality: stats::analyze_data_quality(&day_rows),
            }
        })
        .collect();

    Ok((
        items,
        ListMeta {
            page: req.page,
            limit: req.limit,
            total_pages: page.total_pages,
        },
    ))
}

/// Assemble the full detail view for one date.
pub async fn get_single_day(pool: &PgPool, date: NaiveDate) -> Result<SingleDay, AppError> {
    let rows = queries::fetch_hourly_for_date(pool, date).await?;

    let summary = stats::single_day_analytics(&rows)
        .map_err(|StatsError::NoData| AppError::NotFound(format!("No data found for date: {date}")))?;
    let quality = stats::analyze_data_quality(&rows);

    Ok(SingleDay {
        date,
        summary,
        quality,
        hourly: rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_page_defaults() {
        assert_eq!(resolve_page(None), 1);
        assert_eq!(resolve_page(Some("")), 1);
        assert_eq!(resolve_page(Some("abc")), 1);
        assert_eq!(resolve_page(Some("0")), 1);
        assert_eq!(resolve_page(Some("-3")), 1);
        assert_eq!(resolve_page(Some("2.5")), 1);
    }

    #[test]
    fn test_resolve_page_valid() {
        assert_eq!(resolve_page(Some("1")), 1);
        assert_eq!(resolve_page(Some("42")), 42);
        assert_eq!(resolve_page(Some(" 7 ")), 7);
    }

    #[test]
    fn test_resolve_limit_defaults() {
        assert_eq!(resolve_limit(None), 10);
        assert_eq!(resolve_limit(Some("zero")), 10);
        assert_eq!(resolve_limit(Some("0")), 10);
        assert_eq!(resolve_limit(Some("-1")), 10);
    }

    #[test]
    fn test_resolve_limit_valid() {
        assert_eq!(resolve_limit(Some("25")), 25);
        assert_eq!(resolve_limit(Some("1")), 1);
    }

    #[test]
    fn test_parse_date_param_valid() {
        let d = parse_date_param("2024-01-15", "date").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_param_rejects_garbage() {
        for raw in ["", "15-01-2024", "2024/01/15", "yesterday", "2024-02-30"] {
            let err = parse_date_param(raw, "startDate").unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_parse_date_param_names_the_parameter() {
        let err = parse_date_param("nope", "endDate").unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.contains("endDate")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_date_range_accepts_open_bounds() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(validate_date_range(None, None).is_ok());
        assert!(validate_date_range(Some(d), None).is_ok());
        assert!(validate_date_range(None, Some(d)).is_ok());
        assert!(validate_date_range(Some(d), Some(d)).is_ok());
    }

    #[test]
    fn test_validate_date_range_rejects_inverted() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = validate_date_range(Some(start), Some(end)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}

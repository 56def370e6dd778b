use chrono::NaiveDate;
use sqlx::PgPool;

use super::models::{DailySummaryRow, HourlyRecord};

/// Allowed sort keys for the daily summary list.
///
/// An enumerated type with an exhaustive column mapping, so an
/// unrecognised key can only exist as a request string — it degrades to
/// `Date` during parsing and never reaches the SQL layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    TotalProduction,
    TotalConsumption,
    AvgPrice,
}

impl SortKey {
    /// Parse a request parameter; anything outside the allow-list falls
    /// back to sorting by date.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("totalProduction") => Self::TotalProduction,
            Some("totalConsumption") => Self::TotalConsumption,
            Some("avgPrice") => Self::AvgPrice,
            _ => Self::Date,
        }
    }

    /// The ORDER BY target. These are the output-column aliases of the
    /// summary query, never user input.
    fn order_by_column(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::TotalProduction => "total_production_mwh",
            Self::TotalConsumption => "total_consumption_kwh",
            Self::AvgPrice => "avg_price",
        }
    }
}

/// Sort direction; anything other than "DESC" falls back to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("DESC") => Self::Desc,
            _ => Self::Asc,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One page of daily summaries plus the total page count for the
/// (possibly date-filtered) result set.
#[derive(Debug)]
pub struct DailySummaryPage {
    pub rows: Vec<DailySummaryRow>,
    pub total_pages: i64,
}

/// OFFSET for a 1-based page. Saturating: an absurdly large page number
/// must not overflow, it just lands past the end and yields an empty page.
fn page_offset(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(limit)
}

/// Fetch one page of daily summaries, grouped and sorted in SQL.
///
/// The optional date bounds are inclusive and apply to both the page
/// query and the distinct-day count that backs `total_pages`.
pub async fn fetch_daily_summaries(
    pool: &PgPool,
    page: i64,
    limit: i64,
    sort_key: SortKey,
    sort_order: SortOrder,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<DailySummaryPage, sqlx::Error> {
    let offset = page_offset(page, limit);

    // sort_key/sort_order interpolate enum-derived constants only.
    let query = format!(
        "SELECT date,
                SUM(productionamount)  AS total_production_mwh,
                SUM(consumptionamount) AS total_consumption_kwh,
                AVG(hourlyprice)       AS avg_price,
                COUNT(id)              AS hours_count
         FROM electricitydata
         WHERE ($1::date IS NULL OR date >= $1)
           AND ($2::date IS NULL OR date <= $2)
         GROUP BY date
         ORDER BY {} {}
         LIMIT $3 OFFSET $4",
        sort_key.order_by_column(),
        sort_order.sql(),
    );

    let rows = sqlx::query_as::<_, DailySummaryRow>(&query)
        .bind(start_date)
        .bind(end_date)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total_days: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT date)
         FROM electricitydata
         WHERE ($1::date IS NULL OR date >= $1)
           AND ($2::date IS NULL OR date <= $2)",
    )
    .bind(start_date)
    .bind(end_date)
    .fetch_one(pool)
    .await?;

    let total_pages = (total_days + limit - 1) / limit;

    Ok(DailySummaryPage { rows, total_pages })
}

/// Batch-fetch hourly records for a set of dates in one query,
/// ordered by (date, starttime) ascending.
///
/// An empty date set short-circuits without touching the pool.
pub async fn fetch_hourly_for_dates(
    pool: &PgPool,
    dates: &[NaiveDate],
) -> Result<Vec<HourlyRecord>, sqlx::Error> {
    if dates.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, HourlyRecord>(
        "SELECT id, date, starttime,
                productionamount  AS production_mwh,
                consumptionamount AS consumption_kwh,
                hourlyprice       AS hourly_price
         FROM electricitydata
         WHERE date = ANY($1)
         ORDER BY date ASC, starttime ASC",
    )
    .bind(dates)
    .fetch_all(pool)
    .await
}

/// Fetch all hourly records for a single date, ordered by starttime.
pub async fn fetch_hourly_for_date(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Vec<HourlyRecord>, sqlx::Error> {
    sqlx::query_as::<_, HourlyRecord>(
        "SELECT id, date, starttime,
                productionamount  AS production_mwh,
                consumptionamount AS consumption_kwh,
                hourlyprice       AS hourly_price
         FROM electricitydata
         WHERE date = $1
         ORDER BY starttime ASC",
    )
    .bind(date)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parse_allow_list() {
        assert_eq!(SortKey::parse(Some("date")), SortKey::Date);
        assert_eq!(
            SortKey::parse(Some("totalProduction")),
            SortKey::TotalProduction
        );
        assert_eq!(
            SortKey::parse(Some("totalConsumption")),
            SortKey::TotalConsumption
        );
        assert_eq!(SortKey::parse(Some("avgPrice")), SortKey::AvgPrice);
    }

    #[test]
    fn test_sort_key_parse_fallback() {
        assert_eq!(SortKey::parse(None), SortKey::Date);
        assert_eq!(SortKey::parse(Some("")), SortKey::Date);
        assert_eq!(SortKey::parse(Some("hourlyprice")), SortKey::Date);
        // Injection attempts never reach SQL — they parse to Date.
        assert_eq!(SortKey::parse(Some("date; DROP TABLE")), SortKey::Date);
    }

    #[test]
    fn test_sort_key_column_mapping() {
        assert_eq!(SortKey::Date.order_by_column(), "date");
        assert_eq!(
            SortKey::TotalProduction.order_by_column(),
            "total_production_mwh"
        );
        assert_eq!(
            SortKey::TotalConsumption.order_by_column(),
            "total_consumption_kwh"
        );
        assert_eq!(SortKey::AvgPrice.order_by_column(), "avg_price");
    }

    #[test]
    fn test_page_offset_normal() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(2, 25), 25);
    }

    #[test]
    fn test_page_offset_extreme_page_saturates() {
        // A client can legitimately send page=9223372036854775807 through
        // the lenient page filter; the offset must not overflow or go
        // negative, it just points past the end of the result set.
        let offset = page_offset(i64::MAX, 10);
        assert_eq!(offset, i64::MAX);
        assert!(page_offset(i64::MAX, i64::MAX) >= 0);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("desc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(None), SortOrder::Asc);
    }
}

//! Pure per-day statistics over hourly electricity records.
//!
//! Everything in this module operates on in-memory slices already
//! fetched by the orchestrator; no I/O. Callers guarantee rows arrive
//! in starttime-ascending order (the queries order them) — none of
//! these functions re-sort the input.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::models::HourlyRecord;
use crate::helpers::round_price;

/// Expected number of hourly rows per calendar day.
const HOURS_PER_DAY: i64 = 24;

/// How many cheapest / most expensive hours to report.
const TOP_HOURS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// No hourly rows exist for the requested day. The orchestrator
    /// translates this into a not-found response.
    #[error("no hourly rows to analyze")]
    NoData,
}

/// Data-quality diagnostic for one day's hourly rows.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    /// True when no issues were detected.
    pub is_valid: bool,
    /// 24 minus the actual row count. Deliberately unclamped: a negative
    /// value means the day has duplicate/overlapping hours, which is a
    /// data-integrity signal in its own right.
    pub missing_rows: i64,
    /// One human-readable diagnostic per detected anomaly class.
    pub issues: Vec<String>,
}

/// An hour paired with its (non-null) price.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedHour {
    pub time: DateTime<Utc>,
    pub price: Decimal,
}

/// The hour furthest into deficit: consumption most exceeds production
/// on a common kWh basis.
#[derive(Debug, Clone, PartialEq)]
pub struct DivergenceHour {
    pub time: DateTime<Utc>,
    pub value_kwh: Decimal,
}

/// Summary block for a single day's detail view.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub total_production_mwh: Decimal,
    pub total_consumption_kwh: Decimal,
    /// Mean of non-null prices, rounded to 2 decimals; 0 by contract
    /// when the day has no non-null prices.
    pub avg_price: Decimal,
    pub max_diff_hour: DivergenceHour,
    /// Up to 3 lowest non-null prices, ascending, stable on ties.
    pub cheapest_hours: Vec<PricedHour>,
    /// Up to 3 highest non-null prices, descending (most expensive
    /// first), stable on ties by chronological order.
    pub most_expensive_hours: Vec<PricedHour>,
}

/// Diagnose missing hours and null readings for one day's rows.
pub fn analyze_data_quality(rows: &[HourlyRecord]) -> DataQuality {
    let missing_rows = HOURS_PER_DAY - rows.len() as i64;
    let mut issues = Vec::new();

    if missing_rows > 0 {
        issues.push(format!("Missing {} hourly data entries.", missing_rows));
    }

    let null_prices = rows.iter().filter(|r| r.hourly_price.is_none()).count();
    let null_prods = rows.iter().filter(|r| r.production_mwh.is_none()).count();
    let null_cons = rows.iter().filter(|r| r.consumption_kwh.is_none()).count();

    if null_prices > 0 {
        issues.push(format!("Found {} entries with null price.", null_prices));
    }
    if null_prods > 0 {
        issues.push(format!("Found {} entries with null production.", null_prods));
    }
    if null_cons > 0 {
        issues.push(format!("Found {} entries with null consumption.", null_cons));
    }

    DataQuality {
        is_valid: issues.is_empty(),
        missing_rows,
        issues,
    }
}

/// Longest run of consecutive hours with a negative price.
///
/// A null price breaks a run exactly like a non-negative price does.
/// The final fold-in after the loop catches a run that reaches the end
/// of the day.
pub fn longest_negative_streak(rows: &[HourlyRecord]) -> u32 {
    let mut max = 0u32;
    let mut current = 0u32;

    for row in rows {
        match row.hourly_price {
            Some(price) if price < Decimal::ZERO => current += 1,
            _ => {
                max = max.max(current);
                current = 0;
            }
        }
    }

    max.max(current)
}

/// This hour's deficit in kWh: consumption minus production, with
/// production converted from MWh. Null readings count as 0 here; the
/// data-quality diagnostic still flags them separately.
fn deficit_kwh(row: &HourlyRecord) -> Decimal {
    let production_kwh = row.production_mwh.unwrap_or(Decimal::ZERO) * Decimal::ONE_THOUSAND;
    row.consumption_kwh.unwrap_or(Decimal::ZERO) - production_kwh
}

/// Compute the full summary block for one day's rows.
///
/// Fails with [`StatsError::NoData`] on empty input — the one condition
/// callers surface as "resource not found".
pub fn single_day_analytics(rows: &[HourlyRecord]) -> Result<DaySummary, StatsError> {
    if rows.is_empty() {
        return Err(StatsError::NoData);
    }

    let mut total_production = Decimal::ZERO;
    let mut total_consumption = Decimal::ZERO;
    let mut price_sum = Decimal::ZERO;
    let mut price_count: u32 = 0;

    for row in rows {
        total_production += row.production_mwh.unwrap_or(Decimal::ZERO);
        total_consumption += row.consumption_kwh.unwrap_or(Decimal::ZERO);
        if let Some(price) = row.hourly_price {
            price_sum += price;
            price_count += 1;
        }
    }

    let avg_price = if price_count > 0 {
        round_price(price_sum / Decimal::from(price_count))
    } else {
        Decimal::ZERO
    };

    // Strict > keeps the first-encountered hour on ties.
    let mut max_diff_hour = DivergenceHour {
        time: rows[0].starttime,
        value_kwh: deficit_kwh(&rows[0]),
    };
    for row in &rows[1..] {
        let diff = deficit_kwh(row);
        if diff > max_diff_hour.value_kwh {
            max_diff_hour = DivergenceHour {
                time: row.starttime,
                value_kwh: diff,
            };
        }
    }

    let priced: Vec<PricedHour> = rows
        .iter()
        .filter_map(|r| {
            r.hourly_price.map(|price| PricedHour {
                time: r.starttime,
                price,
            })
        })
        .collect();

    // Both sorts are stable, so equal prices keep chronological order.
    let mut cheapest_hours = priced.clone();
    cheapest_hours.sort_by(|a, b| a.price.cmp(&b.price));
    cheapest_hours.truncate(TOP_HOURS);

    let mut most_expensive_hours = priced;
    most_expensive_hours.sort_by(|a, b| b.price.cmp(&a.price));
    most_expensive_hours.truncate(TOP_HOURS);

    Ok(DaySummary {
        total_production_mwh: total_production,
        total_consumption_kwh: total_consumption,
        avg_price,
        max_diff_hour,
        cheapest_hours,
        most_expensive_hours,
    })
}

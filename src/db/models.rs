use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// One measured hour of electricity data.
///
/// Units are mixed at the source: production is MWh, consumption is kWh.
/// Normalisation to a common kWh basis happens only where values are
/// compared (the divergence calculation), never in storage.
///
/// All three measurement columns are nullable in the source data; a
/// missing reading is distinct from a reading of 0, so they are modelled
/// as `Option<Decimal>` rather than coerced to zero.
#[derive(Debug, Clone, FromRow)]
pub struct HourlyRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub starttime: DateTime<Utc>,
    /// Production during this hour in MWh.
    pub production_mwh: Option<Decimal>,
    /// Consumption during this hour in kWh.
    pub consumption_kwh: Option<Decimal>,
    /// Spot price for this hour (cents per kWh).
    pub hourly_price: Option<Decimal>,
}

/// Aggregate over all hourly records sharing one calendar date.
/// Derived per query via GROUP BY, never stored.
#[derive(Debug, Clone, FromRow)]
pub struct DailySummaryRow {
    pub date: NaiveDate,
    /// SUM of production; NULL when every contributing row is NULL.
    pub total_production_mwh: Option<Decimal>,
    /// SUM of consumption; NULL when every contributing row is NULL.
    pub total_consumption_kwh: Option<Decimal>,
    /// AVG over non-NULL prices; NULL when every price is NULL.
    pub avg_price: Option<Decimal>,
    /// Number of hourly rows contributing to this day.
    pub hours_count: i64,
}

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An open opportunity joined with its market.
///
/// `deviation_percent` is `(1 - total_price) * 100`; its sign matters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OpenOpportunity {
    pub id: i64,
    pub market_id: String,
    pub question: String,
    pub category: Option<String>,
    pub yes_price: Decimal,
    pub no_price: Decimal,
    pub total_price: Decimal,
    pub deviation_percent: Decimal,
    pub detected_at: DateTime<Utc>,
}

/// Per-day opportunity counts for the analytics chart.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyOpportunityStats {
    pub day: NaiveDate,
    pub opportunity_count: i64,
    pub avg_deviation_percent: Option<Decimal>,
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database row for price_snapshots table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceSnapshot {
    pub market_id: String,
    pub yes_price: Decimal,
    pub no_price: Decimal,
    pub yes_liquidity: Option<Decimal>,
    pub no_liquidity: Option<Decimal>,
    pub volume_24h: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}

/// An active market joined with its most recent price snapshot.
///
/// Snapshot columns are `None` when the ingester has not priced the market yet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MarketOverview {
    pub id: String,
    pub question: String,
    pub category: Option<String>,
    pub resolution_time: Option<DateTime<Utc>>,
    pub yes_price: Option<Decimal>,
    pub no_price: Option<Decimal>,
    pub yes_liquidity: Option<Decimal>,
    pub no_liquidity: Option<Decimal>,
    pub volume_24h: Option<Decimal>,
    pub snapshot_at: Option<DateTime<Utc>>,
}

impl MarketOverview {
    /// Latest YES/NO prices, if the market has been priced.
    pub fn prices(&self) -> Option<(Decimal, Decimal)> {
        Some((self.yes_price?, self.no_price?))
    }

    pub fn total_liquidity(&self) -> Option<Decimal> {
        match (self.yes_liquidity, self.no_liquidity) {
            (None, None) => None,
            (yes, no) => Some(yes.unwrap_or_default() + no.unwrap_or_default()),
        }
    }
}

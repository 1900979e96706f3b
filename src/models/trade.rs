use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database row for trades table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trade {
    pub id: i64,
    pub market_id: String,
    pub side: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub pnl: Option<Decimal>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Trade {
    /// P&L is only final once the trade has settled.
    pub fn is_settled(&self) -> bool {
        self.status.eq_ignore_ascii_case("settled")
    }

    /// Realized P&L; `None` until settlement. A settled trade without a
    /// recorded P&L counts as break-even.
    pub fn realized_pnl(&self) -> Option<Decimal> {
        if self.is_settled() {
            Some(self.pnl.unwrap_or_default())
        } else {
            None
        }
    }
}

/// A trade joined with its market question, for the day's trade log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TradeWithMarket {
    pub id: i64,
    pub market_id: String,
    pub question: Option<String>,
    pub side: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub pnl: Option<Decimal>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

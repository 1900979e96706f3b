pub mod backtest;
pub mod market;
pub mod opportunity;
pub mod risk_log;
pub mod signal;
pub mod trade;

pub use backtest::{BacktestConfig, BacktestOptions, BacktestReport, BacktestResult, BacktestTrade};
pub use market::{MarketOverview, PriceSnapshot};
pub use opportunity::{DailyOpportunityStats, OpenOpportunity};
pub use risk_log::RiskLog;
pub use signal::{Signal, SignalLevel, SignalRow, SignalStatus};
pub use trade::{Trade, TradeWithMarket};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Outcome side of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Yes,
    No,
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One backtest run as written by the external backtest runner
/// (`backtest-*.json`). `result` is mandatory; `config` and `options`
/// fall back to empty sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    #[serde(default)]
    pub config: BacktestConfig,
    #[serde(default)]
    pub options: BacktestOptions,
    pub result: BacktestResult,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestConfig {
    /// Minimum YES+NO gap as a fraction (0.015 = 1.5%).
    pub min_arbitrage_gap: Option<Decimal>,
    pub initial_capital: Option<Decimal>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestOptions {
    pub days: Option<u32>,
    pub scenario: Option<String>,
    pub markets: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    pub total_trades: u32,
    #[serde(default)]
    pub winning_trades: u32,
    #[serde(default)]
    pub losing_trades: u32,
    /// Percentage, 0-100.
    pub win_rate: Decimal,
    #[serde(rename = "totalPnL")]
    pub total_pnl: Decimal,
    #[serde(rename = "totalPnLPercent")]
    pub total_pnl_percent: Decimal,
    #[serde(default)]
    pub avg_return: Decimal,
    /// Percentage, 0-100.
    pub max_drawdown: Decimal,
    pub sharpe_ratio: Decimal,
    #[serde(default)]
    pub trades: Vec<BacktestTrade>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestTrade {
    pub id: i64,
    #[serde(default)]
    pub market_name: String,
    pub side: String,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub pnl_percent: Option<Decimal>,
    pub exit_reason: Option<String>,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
}

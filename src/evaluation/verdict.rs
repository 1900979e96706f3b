use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::BacktestResult;

/// Qualitative grade of a backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Excellent,
    Good,
    Mediocre,
    Poor,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Excellent => "excellent",
            Verdict::Good => "good",
            Verdict::Mediocre => "mediocre",
            Verdict::Poor => "poor",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Verdict::Excellent => "ready for live small-scale testing",
            Verdict::Good => "test with small capital",
            Verdict::Mediocre => "profitable but needs parameter tuning",
            Verdict::Poor => "losing strategy, redesign needed",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four headline numbers a verdict is based on. All percentages are 0-100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub total_pnl_percent: Decimal,
    pub win_rate: Decimal,
    pub sharpe_ratio: Decimal,
    pub max_drawdown: Decimal,
}

impl From<&BacktestResult> for BacktestMetrics {
    fn from(result: &BacktestResult) -> Self {
        Self {
            total_pnl_percent: result.total_pnl_percent,
            win_rate: result.win_rate,
            sharpe_ratio: result.sharpe_ratio,
            max_drawdown: result.max_drawdown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub verdict: Verdict,
    pub advice: String,
}

/// Grade a run. Rules are checked in order and the first match wins:
///
/// 1. **Excellent**: P&L > 50%, win rate >= 60%, Sharpe > 1.5, drawdown < 10%.
/// 2. **Good**: P&L > 20%, win rate >= 55%, Sharpe > 1, drawdown < 15%.
/// 3. **Mediocre**: any positive P&L.
/// 4. **Poor**: everything else.
pub fn assess(metrics: &BacktestMetrics) -> Assessment {
    let verdict = if metrics.total_pnl_percent > Decimal::from(50)
        && metrics.win_rate >= Decimal::from(60)
        && metrics.sharpe_ratio > Decimal::new(15, 1)
        && metrics.max_drawdown < Decimal::from(10)
    {
        Verdict::Excellent
    } else if metrics.total_pnl_percent > Decimal::from(20)
        && metrics.win_rate >= Decimal::from(55)
        && metrics.sharpe_ratio > Decimal::ONE
        && metrics.max_drawdown < Decimal::from(15)
    {
        Verdict::Good
    } else if metrics.total_pnl_percent > Decimal::ZERO {
        Verdict::Mediocre
    } else {
        Verdict::Poor
    };

    Assessment {
        verdict,
        advice: verdict.advice().to_string(),
    }
}

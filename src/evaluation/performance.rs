use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::EvalError;
use crate::models::Trade;

/// Aggregated realized-P&L statistics. Every metric is `None` when there are
/// no settled trades: zero trades is not the same fact as zero loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percentage, 0-100.
    pub win_rate: Option<Decimal>,
    pub total_pnl: Option<Decimal>,
    pub average_pnl: Option<Decimal>,
    pub best_trade: Option<Decimal>,
    pub worst_trade: Option<Decimal>,
    /// Percentage, see [`max_drawdown`].
    pub max_drawdown: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub pnl: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnlPoint {
    pub date: NaiveDate,
    pub daily_pnl: Decimal,
    pub cumulative_pnl: Decimal,
    pub drawdown: Decimal,
}

/// Settled P&L grouped by UTC calendar day, ascending. Trades that have not
/// settled are ignored.
pub fn daily_pnl(trades: &[Trade]) -> Vec<DailyPnl> {
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for trade in trades {
        if let Some(pnl) = trade.realized_pnl() {
            *by_day.entry(trade.created_at.date_naive()).or_default() += pnl;
        }
    }
    by_day
        .into_iter()
        .map(|(date, pnl)| DailyPnl { date, pnl })
        .collect()
}

/// Running sum: `out[i] = daily[0] + ... + daily[i]`.
pub fn cumulative(daily: &[Decimal]) -> Vec<Decimal> {
    daily
        .iter()
        .scan(Decimal::ZERO, |acc, pnl| {
            *acc += *pnl;
            Some(*acc)
        })
        .collect()
}

/// Drawdown at every point of a cumulative P&L series, in percent:
/// `(peak - cum) / (initial_capital + peak) * 100`, with the peak starting at
/// the first point. Never negative. A non-positive capital base
/// (`initial_capital + peak <= 0`) counts as a full 100% drawdown.
pub fn drawdown_series(cumulative: &[Decimal], initial_capital: Decimal) -> Vec<Decimal> {
    let Some(first) = cumulative.first() else {
        return Vec::new();
    };

    let mut peak = *first;
    cumulative
        .iter()
        .map(|cum| {
            peak = peak.max(*cum);
            let base = initial_capital + peak;
            if base <= Decimal::ZERO {
                return Decimal::ONE_HUNDRED;
            }
            ((peak - *cum) / base * Decimal::ONE_HUNDRED).max(Decimal::ZERO)
        })
        .collect()
}

/// Largest drawdown over the series, `None` for an empty series.
pub fn max_drawdown(cumulative: &[Decimal], initial_capital: Decimal) -> Option<Decimal> {
    drawdown_series(cumulative, initial_capital).into_iter().max()
}

/// Chart series: one point per day with running totals and drawdown.
pub fn pnl_history(daily: &[DailyPnl], initial_capital: Decimal) -> Result<Vec<PnlPoint>, EvalError> {
    ensure_positive_capital(initial_capital)?;

    let values: Vec<Decimal> = daily.iter().map(|d| d.pnl).collect();
    let cum = cumulative(&values);
    let drawdowns = drawdown_series(&cum, initial_capital);

    Ok(daily
        .iter()
        .zip(cum)
        .zip(drawdowns)
        .map(|((day, cumulative_pnl), drawdown)| PnlPoint {
            date: day.date,
            daily_pnl: day.pnl,
            cumulative_pnl,
            drawdown,
        })
        .collect())
}

pub fn summarize(trades: &[Trade], initial_capital: Decimal) -> Result<PerformanceSummary, EvalError> {
    ensure_positive_capital(initial_capital)?;

    let pnls: Vec<Decimal> = trades.iter().filter_map(Trade::realized_pnl).collect();
    let total_trades = pnls.len();
    let winning_trades = pnls.iter().filter(|p| **p > Decimal::ZERO).count();
    let losing_trades = pnls.iter().filter(|p| **p < Decimal::ZERO).count();

    if total_trades == 0 {
        return Ok(PerformanceSummary {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate: None,
            total_pnl: None,
            average_pnl: None,
            best_trade: None,
            worst_trade: None,
            max_drawdown: None,
        });
    }

    let count = Decimal::from(total_trades as u64);
    let total_pnl = pnls.iter().copied().sum::<Decimal>();

    let daily: Vec<Decimal> = daily_pnl(trades).into_iter().map(|d| d.pnl).collect();

    Ok(PerformanceSummary {
        total_trades,
        winning_trades,
        losing_trades,
        win_rate: Some(Decimal::from(winning_trades as u64) / count * Decimal::ONE_HUNDRED),
        total_pnl: Some(total_pnl),
        average_pnl: Some(total_pnl / count),
        best_trade: pnls.iter().copied().max(),
        worst_trade: pnls.iter().copied().min(),
        max_drawdown: max_drawdown(&cumulative(&daily), initial_capital),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: Decimal,
    pub upper: Decimal,
    pub count: usize,
}

/// Equal-width histogram over `[min, max]`; the last bin is closed on both ends.
pub fn histogram(values: &[Decimal], bins: usize) -> Vec<HistogramBin> {
    let (Some(min), Some(max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin {
            lower: *min,
            upper: *max,
            count: values.len(),
        }];
    }

    let width = (*max - *min) / Decimal::from(bins as u64);
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: *min + width * Decimal::from(i as u64),
            upper: if i + 1 == bins {
                *max
            } else {
                *min + width * Decimal::from((i + 1) as u64)
            },
            count: 0,
        })
        .collect();

    for value in values {
        let idx = out
            .iter()
            .position(|b| *value < b.upper)
            .unwrap_or(bins - 1);
        out[idx].count += 1;
    }
    out
}

fn ensure_positive_capital(initial_capital: Decimal) -> Result<(), EvalError> {
    if initial_capital <= Decimal::ZERO {
        return Err(EvalError::InvalidConfiguration(format!(
            "initial capital must be positive, got {initial_capital}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::EvalError;

/// Configurable risk limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Capital base all fractions apply to (default 1000).
    pub total_capital: Decimal,
    /// Max daily loss as fraction of capital (default 5%).
    pub daily_loss_limit_fraction: Decimal,
    /// Max single trade as fraction of capital (default 20%).
    pub max_single_trade_fraction: Decimal,
    /// Max confirmed or executed signals per day (default 3).
    pub max_daily_trades: u32,
    /// Loss usage at which the status turns to a warning (default 80%).
    pub warning_fraction: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            total_capital: Decimal::from(1_000),
            daily_loss_limit_fraction: Decimal::new(5, 2),  // 0.05
            max_single_trade_fraction: Decimal::new(20, 2), // 0.20
            max_daily_trades: 3,
            warning_fraction: Decimal::new(80, 2),          // 0.80
        }
    }
}

impl RiskLimits {
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.total_capital <= Decimal::ZERO {
            return Err(EvalError::InvalidConfiguration(format!(
                "total capital must be positive, got {}",
                self.total_capital
            )));
        }
        if self.daily_loss_limit_fraction <= Decimal::ZERO {
            return Err(EvalError::InvalidConfiguration(format!(
                "daily loss limit fraction must be positive, got {}",
                self.daily_loss_limit_fraction
            )));
        }
        if self.daily_loss_limit() <= Decimal::ZERO {
            return Err(EvalError::InvalidConfiguration(format!(
                "daily loss limit rounds to zero ({} x {})",
                self.total_capital, self.daily_loss_limit_fraction
            )));
        }
        if self.max_single_trade_fraction <= Decimal::ZERO
            || self.max_single_trade_fraction > Decimal::ONE
        {
            return Err(EvalError::InvalidConfiguration(format!(
                "max single trade fraction must be in (0, 1], got {}",
                self.max_single_trade_fraction
            )));
        }
        if self.warning_fraction <= Decimal::ZERO || self.warning_fraction > Decimal::ONE {
            return Err(EvalError::InvalidConfiguration(format!(
                "warning fraction must be in (0, 1], got {}",
                self.warning_fraction
            )));
        }
        Ok(())
    }

    pub fn daily_loss_limit(&self) -> Decimal {
        self.total_capital * self.daily_loss_limit_fraction
    }

    pub fn single_trade_limit(&self) -> Decimal {
        self.total_capital * self.max_single_trade_fraction
    }
}

/// Today's aggregated activity, already fetched from the store.
#[derive(Debug, Clone, Default)]
pub struct DailyActivity {
    /// Sum of settled trade P&L for the current day.
    pub realized_pnl: Decimal,
    /// Signals confirmed or executed today.
    pub confirmed_or_executed_signals: u32,
    /// Amount tied up in today's pending/confirmed trades.
    pub current_exposure: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAlert {
    Ok,
    Warning,
    Tripped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskStatus {
    pub daily_loss: Decimal,
    pub daily_loss_limit: Decimal,
    /// Raw usage; >= 1 means the loss limit is breached.
    pub daily_loss_used_fraction: Decimal,
    /// Usage clamped to [0, 1] for progress bars.
    pub daily_loss_display_fraction: Decimal,
    pub trade_count: u32,
    pub max_daily_trades: u32,
    /// `None` when no daily trades are allowed at all.
    pub trade_count_used_fraction: Option<Decimal>,
    pub trades_remaining: u32,
    pub single_trade_limit: Decimal,
    pub current_exposure: Decimal,
    /// When set, no further trades should be proposed today.
    pub circuit_breaker_tripped: bool,
    pub alert: RiskAlert,
}

/// Risk limit violation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskViolation {
    #[error("trade amount {amount} exceeds single trade limit {max}")]
    SingleTradeTooLarge { amount: Decimal, max: Decimal },

    #[error("daily loss limit reached: loss {loss}, limit {limit}")]
    DailyLossExceeded { loss: Decimal, limit: Decimal },

    #[error("daily trade count exhausted: {count}/{max}")]
    DailyTradesExhausted { count: u32, max: u32 },
}

/// Evaluate today's activity against the limits. Advisory only: nothing is
/// blocked here, enforcement belongs to the trading bot.
pub fn evaluate_risk(limits: &RiskLimits, activity: &DailyActivity) -> Result<RiskStatus, EvalError> {
    limits.validate()?;

    let count = activity.confirmed_or_executed_signals;
    if limits.max_daily_trades == 0 && count > 0 {
        return Err(EvalError::InvalidConfiguration(format!(
            "max daily trades is 0 but {count} trades were recorded today"
        )));
    }

    let daily_loss = (-activity.realized_pnl).max(Decimal::ZERO);
    let daily_loss_limit = limits.daily_loss_limit();
    let daily_loss_used_fraction = daily_loss.checked_div(daily_loss_limit).ok_or_else(|| {
        EvalError::InvalidConfiguration(format!(
            "daily loss {daily_loss} cannot be measured against limit {daily_loss_limit}"
        ))
    })?;

    let trade_count_used_fraction = if limits.max_daily_trades == 0 {
        None
    } else {
        Some(Decimal::from(count) / Decimal::from(limits.max_daily_trades))
    };
    let trades_remaining = limits.max_daily_trades.saturating_sub(count);

    let circuit_breaker_tripped =
        daily_loss_used_fraction >= Decimal::ONE || count >= limits.max_daily_trades;

    let alert = if circuit_breaker_tripped {
        RiskAlert::Tripped
    } else if daily_loss_used_fraction >= limits.warning_fraction || trades_remaining <= 1 {
        RiskAlert::Warning
    } else {
        RiskAlert::Ok
    };

    Ok(RiskStatus {
        daily_loss,
        daily_loss_limit,
        daily_loss_used_fraction,
        daily_loss_display_fraction: daily_loss_used_fraction.min(Decimal::ONE),
        trade_count: count,
        max_daily_trades: limits.max_daily_trades,
        trade_count_used_fraction,
        trades_remaining,
        single_trade_limit: limits.single_trade_limit(),
        current_exposure: activity.current_exposure,
        circuit_breaker_tripped,
        alert,
    })
}

impl RiskStatus {
    /// Limits currently breached.
    pub fn violations(&self) -> Vec<RiskViolation> {
        let mut out = Vec::new();
        if self.daily_loss_used_fraction >= Decimal::ONE {
            out.push(RiskViolation::DailyLossExceeded {
                loss: self.daily_loss,
                limit: self.daily_loss_limit,
            });
        }
        if self.trade_count >= self.max_daily_trades {
            out.push(RiskViolation::DailyTradesExhausted {
                count: self.trade_count,
                max: self.max_daily_trades,
            });
        }
        out
    }
}

/// Check a proposed trade amount against the single trade limit.
pub fn check_single_trade(amount: Decimal, limits: &RiskLimits) -> Result<(), RiskViolation> {
    let max = limits.single_trade_limit();
    if amount > max {
        return Err(RiskViolation::SingleTradeTooLarge { amount, max });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

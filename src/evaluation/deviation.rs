use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::EvalError;
use crate::models::{MarketOverview, Side, SignalLevel};

/// Deviation tiers, in percent. Bounds are inclusive-lower, exclusive-upper:
/// `[min, conservative_upper)` is conservative, `[conservative_upper,
/// aggressive_upper)` aggressive, `[aggressive_upper, ∞)` risky.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviationThresholds {
    pub min_deviation: Decimal,
    pub conservative_upper: Decimal,
    pub aggressive_upper: Decimal,
    pub conservative_validity_minutes: u32,
    pub aggressive_validity_minutes: u32,
    pub risky_validity_minutes: u32,
}

impl Default for DeviationThresholds {
    fn default() -> Self {
        Self {
            min_deviation: Decimal::new(15, 1), // 1.5
            conservative_upper: Decimal::from(3),
            aggressive_upper: Decimal::from(5),
            conservative_validity_minutes: 3,
            aggressive_validity_minutes: 5,
            risky_validity_minutes: 10,
        }
    }
}

impl DeviationThresholds {
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.min_deviation <= Decimal::ZERO {
            return Err(EvalError::InvalidConfiguration(format!(
                "min deviation threshold must be positive, got {}",
                self.min_deviation
            )));
        }
        if self.min_deviation > self.conservative_upper
            || self.conservative_upper > self.aggressive_upper
        {
            return Err(EvalError::InvalidConfiguration(format!(
                "deviation thresholds must be ordered: {} <= {} <= {}",
                self.min_deviation, self.conservative_upper, self.aggressive_upper
            )));
        }
        if !(self.conservative_validity_minutes < self.aggressive_validity_minutes
            && self.aggressive_validity_minutes < self.risky_validity_minutes)
        {
            return Err(EvalError::InvalidConfiguration(
                "validity windows must grow with severity".into(),
            ));
        }
        Ok(())
    }
}

/// Severity of a price deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviationLevel {
    /// Below the actionable threshold.
    None,
    Conservative,
    Aggressive,
    Risky,
}

impl DeviationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviationLevel::None => "NONE",
            DeviationLevel::Conservative => "CONSERVATIVE",
            DeviationLevel::Aggressive => "AGGRESSIVE",
            DeviationLevel::Risky => "RISKY",
        }
    }

    /// The signal tier this level would be issued at, if any.
    pub fn signal_level(&self) -> Option<SignalLevel> {
        match self {
            DeviationLevel::None => None,
            DeviationLevel::Conservative => Some(SignalLevel::Conservative),
            DeviationLevel::Aggressive => Some(SignalLevel::Aggressive),
            DeviationLevel::Risky => Some(SignalLevel::Risky),
        }
    }

    pub fn is_actionable(&self) -> bool {
        *self != DeviationLevel::None
    }
}

impl fmt::Display for DeviationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub level: DeviationLevel,
    /// How long a signal at this level stays valid; `None` for `NONE`.
    pub validity_minutes: Option<u32>,
}

/// Classify a signed deviation percentage. Negative deviations (YES + NO
/// above 1) fall below every threshold and classify as `NONE`.
pub fn classify(deviation_pct: Decimal, thresholds: &DeviationThresholds) -> Classification {
    let (level, validity_minutes) = if deviation_pct < thresholds.min_deviation {
        (DeviationLevel::None, None)
    } else if deviation_pct < thresholds.conservative_upper {
        (
            DeviationLevel::Conservative,
            Some(thresholds.conservative_validity_minutes),
        )
    } else if deviation_pct < thresholds.aggressive_upper {
        (
            DeviationLevel::Aggressive,
            Some(thresholds.aggressive_validity_minutes),
        )
    } else {
        (DeviationLevel::Risky, Some(thresholds.risky_validity_minutes))
    };

    Classification {
        level,
        validity_minutes,
    }
}

/// `(1 - (yes + no)) * 100`. Positive when both sides can be bought for less than 1.
pub fn deviation_percent(yes_price: Decimal, no_price: Decimal) -> Decimal {
    (Decimal::ONE - (yes_price + no_price)) * Decimal::ONE_HUNDRED
}

/// Buy the cheaper side.
pub fn recommend_side(yes_price: Decimal, no_price: Decimal) -> Side {
    if yes_price < no_price {
        Side::Yes
    } else {
        Side::No
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatedReturn {
    /// Expected return as a fraction of the stake, after fees.
    pub return_fraction: Decimal,
    pub stake: Decimal,
    pub expected_profit: Decimal,
}

/// Rough return if the deviation closes fully: `deviation / 100 - fee`.
pub fn estimated_return(deviation_pct: Decimal, fee_fraction: Decimal, stake: Decimal) -> EstimatedReturn {
    let return_fraction = deviation_pct / Decimal::ONE_HUNDRED - fee_fraction;
    EstimatedReturn {
        return_fraction,
        stake,
        expected_profit: return_fraction * stake,
    }
}

/// Return on `stake` for an actionable market, `None` otherwise.
pub fn actionable_return(
    assessment: &MarketAssessment,
    fee_fraction: Decimal,
    stake: Decimal,
) -> Option<EstimatedReturn> {
    let actionable = assessment
        .classification
        .is_some_and(|c| c.level.is_actionable());
    match assessment.deviation_percent {
        Some(deviation) if actionable && deviation > Decimal::ZERO => {
            Some(estimated_return(deviation, fee_fraction, stake))
        }
        _ => None,
    }
}

/// Deviation and tier for one market, absent when it has no snapshot yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketAssessment {
    pub price_sum: Option<Decimal>,
    pub deviation_percent: Option<Decimal>,
    pub classification: Option<Classification>,
}

pub fn assess_market(market: &MarketOverview, thresholds: &DeviationThresholds) -> MarketAssessment {
    match market.prices() {
        Some((yes, no)) => {
            let deviation = deviation_percent(yes, no);
            MarketAssessment {
                price_sum: Some(yes + no),
                deviation_percent: Some(deviation),
                classification: Some(classify(deviation, thresholds)),
            }
        }
        None => MarketAssessment {
            price_sum: None,
            deviation_percent: None,
            classification: None,
        },
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketStats {
    pub market_count: usize,
    pub priced_count: usize,
    pub average_deviation: Option<Decimal>,
    pub max_deviation: Option<Decimal>,
    pub actionable_count: usize,
}

pub fn summarize_markets(assessments: &[MarketAssessment]) -> MarketStats {
    let deviations: Vec<Decimal> = assessments
        .iter()
        .filter_map(|a| a.deviation_percent)
        .collect();

    let average_deviation = if deviations.is_empty() {
        None
    } else {
        Some(deviations.iter().copied().sum::<Decimal>() / Decimal::from(deviations.len() as i64))
    };

    let actionable_count = assessments
        .iter()
        .filter_map(|a| a.classification)
        .filter(|c| c.level.is_actionable())
        .count();

    MarketStats {
        market_count: assessments.len(),
        priced_count: deviations.len(),
        average_deviation,
        max_deviation: deviations.iter().copied().max(),
        actionable_count,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

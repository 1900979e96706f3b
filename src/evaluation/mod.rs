//! Pure evaluation core. Nothing in here performs I/O: callers hand in
//! records that were already fetched and get plain structured results back.

pub mod deviation;
pub mod performance;
pub mod risk_limits;
pub mod signals;
pub mod verdict;

pub use deviation::{classify, Classification, DeviationLevel, DeviationThresholds};
pub use risk_limits::{evaluate_risk, DailyActivity, RiskAlert, RiskLimits, RiskStatus};
pub use verdict::{assess, Assessment, BacktestMetrics, Verdict};

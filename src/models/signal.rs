use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::EvalError;

/// Lifecycle of a signal. The external bot moves `pending` to
/// `confirmed`/`rejected`/`expired`, and `confirmed` to `executed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStatus {
    Pending,
    Confirmed,
    Rejected,
    Executed,
    Expired,
}

impl SignalStatus {
    pub const ALL: [SignalStatus; 5] = [
        SignalStatus::Pending,
        SignalStatus::Confirmed,
        SignalStatus::Rejected,
        SignalStatus::Executed,
        SignalStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::Pending => "pending",
            SignalStatus::Confirmed => "confirmed",
            SignalStatus::Rejected => "rejected",
            SignalStatus::Executed => "executed",
            SignalStatus::Expired => "expired",
        }
    }

    /// Statuses that consume one of the day's trade slots.
    pub fn counts_toward_daily_trades(&self) -> bool {
        matches!(self, SignalStatus::Confirmed | SignalStatus::Executed)
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalStatus {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(SignalStatus::Pending),
            "confirmed" => Ok(SignalStatus::Confirmed),
            "rejected" => Ok(SignalStatus::Rejected),
            "executed" => Ok(SignalStatus::Executed),
            "expired" => Ok(SignalStatus::Expired),
            other => Err(EvalError::MalformedRecord(format!(
                "unknown signal status {other:?}"
            ))),
        }
    }
}

/// Severity tier a signal was issued at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalLevel {
    Conservative,
    Aggressive,
    Risky,
}

impl SignalLevel {
    pub const ALL: [SignalLevel; 3] = [
        SignalLevel::Conservative,
        SignalLevel::Aggressive,
        SignalLevel::Risky,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalLevel::Conservative => "CONSERVATIVE",
            SignalLevel::Aggressive => "AGGRESSIVE",
            SignalLevel::Risky => "RISKY",
        }
    }
}

impl fmt::Display for SignalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalLevel {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CONSERVATIVE" => Ok(SignalLevel::Conservative),
            "AGGRESSIVE" => Ok(SignalLevel::Aggressive),
            "RISKY" => Ok(SignalLevel::Risky),
            other => Err(EvalError::MalformedRecord(format!(
                "unknown signal level {other:?}"
            ))),
        }
    }
}

/// Database row for signals table joined with the market question.
#[derive(Debug, Clone, FromRow)]
pub struct SignalRow {
    pub id: i64,
    pub market_id: String,
    pub question: Option<String>,
    pub signal_type: String,
    pub confidence: Decimal,
    pub suggested_amount: Option<Decimal>,
    pub reason: Option<String>,
    pub status: String,
    pub level: Option<String>,
    pub expiry_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
}

/// A validated signal record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: i64,
    pub market_id: String,
    pub question: Option<String>,
    pub signal_type: String,
    /// Confidence in [0, 1].
    pub confidence: Decimal,
    pub suggested_amount: Option<Decimal>,
    pub reason: Option<String>,
    pub status: SignalStatus,
    pub level: Option<SignalLevel>,
    pub expiry_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub executed_at: Option<DateTime<Utc>>,
}

impl TryFrom<SignalRow> for Signal {
    type Error = EvalError;

    fn try_from(row: SignalRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e: EvalError| {
            EvalError::MalformedRecord(format!("signal {}: {e}", row.id))
        })?;
        let level = match row.level.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse().map_err(|e: EvalError| {
                EvalError::MalformedRecord(format!("signal {}: {e}", row.id))
            })?),
        };
        if row.confidence < Decimal::ZERO || row.confidence > Decimal::ONE {
            return Err(EvalError::MalformedRecord(format!(
                "signal {}: confidence {} outside [0, 1]",
                row.id, row.confidence
            )));
        }

        Ok(Signal {
            id: row.id,
            market_id: row.market_id,
            question: row.question,
            signal_type: row.signal_type,
            confidence: row.confidence,
            suggested_amount: row.suggested_amount,
            reason: row.reason,
            status,
            level,
            expiry_minutes: row.expiry_minutes,
            created_at: row.created_at,
            confirmed_at: row.confirmed_at,
            executed_at: row.executed_at,
        })
    }
}

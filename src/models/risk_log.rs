use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database row for the append-only risk_logs table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RiskLog {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub log_type: String,
    pub message: String,
    pub current_exposure: Option<Decimal>,
    pub limit_value: Option<Decimal>,
}

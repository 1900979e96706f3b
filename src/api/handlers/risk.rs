use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{ApiResponse, ApiResult, LimitQuery};
use crate::db::{day_bounds, risk_log_repo, trade_repo};
use crate::evaluation::{DeviationThresholds, RiskLimits, RiskStatus};
use crate::models::{RiskLog, TradeWithMarket};
use crate::services::risk_monitor::load_risk_status;
use crate::AppState;

#[derive(Serialize)]
pub struct RiskStatusView {
    #[serde(flatten)]
    pub status: RiskStatus,
    pub violations: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
}

pub async fn status(State(state): State<AppState>) -> ApiResult<RiskStatusView> {
    let now = Utc::now();
    let status = load_risk_status(&state.db, &state.config.risk_limits, now).await?;

    Ok(ApiResponse::ok(RiskStatusView {
        violations: status.violations().iter().map(ToString::to_string).collect(),
        status,
        evaluated_at: now,
    }))
}

pub async fn logs(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<RiskLog>> {
    let limit = query.limit(20, 200)?;
    let logs = risk_log_repo::get_recent_logs(&state.db, limit).await?;
    Ok(ApiResponse::ok(logs))
}

#[derive(Serialize)]
pub struct TradesToday {
    pub trades: Vec<TradeWithMarket>,
    /// Settled P&L only.
    pub total_pnl: Decimal,
}

pub async fn trades_today(State(state): State<AppState>) -> ApiResult<TradesToday> {
    let (start, end) = day_bounds(Utc::now().date_naive());
    let trades = trade_repo::get_trades_between(&state.db, start, end).await?;

    let total_pnl = trades
        .iter()
        .filter(|t| t.status.eq_ignore_ascii_case("settled"))
        .filter_map(|t| t.pnl)
        .sum();

    Ok(ApiResponse::ok(TradesToday { trades, total_pnl }))
}

#[derive(Serialize)]
pub struct RiskRules {
    pub limits: RiskLimits,
    pub daily_loss_limit: Decimal,
    pub single_trade_limit: Decimal,
    pub deviation_thresholds: DeviationThresholds,
    pub estimated_fee_fraction: Decimal,
}

/// Configured limits and deviation tiers, as the evaluators apply them.
pub async fn rules(State(state): State<AppState>) -> ApiResult<RiskRules> {
    let config = &state.config;
    Ok(ApiResponse::ok(RiskRules {
        limits: config.risk_limits.clone(),
        daily_loss_limit: config.risk_limits.daily_loss_limit(),
        single_trade_limit: config.risk_limits.single_trade_limit(),
        deviation_thresholds: config.deviation_thresholds.clone(),
        estimated_fee_fraction: config.estimated_fee_fraction,
    }))
}

use axum::extract::State;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{ApiResponse, ApiResult};
use crate::db::signal_repo;
use crate::evaluation::{evaluate_risk, RiskStatus};
use crate::models::Signal;
use crate::services::risk_monitor::load_daily_activity;
use crate::AppState;

#[derive(Serialize)]
pub struct DashboardSummary {
    pub today_pnl: Decimal,
    /// Today's realized P&L as a percentage of total capital.
    pub today_pnl_percent: Decimal,
    pub pending_signals: i64,
    pub trades_today: u32,
    pub trades_remaining: u32,
    pub risk: RiskStatus,
    pub recent_signals: Vec<Signal>,
}

pub async fn summary(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let limits = &state.config.risk_limits;

    let activity = load_daily_activity(&state.db, Utc::now()).await?;
    let pending_signals = signal_repo::count_pending(&state.db).await?;
    let recent_signals = signal_repo::get_recent_signals(&state.db, 5).await?;
    let risk = evaluate_risk(limits, &activity)?;

    Ok(ApiResponse::ok(DashboardSummary {
        today_pnl: activity.realized_pnl,
        today_pnl_percent: activity.realized_pnl / limits.total_capital * Decimal::ONE_HUNDRED,
        pending_signals,
        trades_today: risk.trade_count,
        trades_remaining: risk.trades_remaining,
        risk,
        recent_signals,
    }))
}

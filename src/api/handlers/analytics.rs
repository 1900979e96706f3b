use axum::extract::{Query, State};
use chrono::Utc;

use super::{ApiResponse, ApiResult, DaysQuery};
use crate::db::{opportunity_repo, trade_repo, window_start};
use crate::evaluation::performance::{self, PerformanceSummary, PnlPoint};
use crate::models::DailyOpportunityStats;
use crate::AppState;

/// Daily, cumulative and drawdown series for the P&L chart.
pub async fn pnl_history(
    State(state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> ApiResult<Vec<PnlPoint>> {
    let since = window_start(Utc::now(), query.days()?);
    let trades = trade_repo::get_settled_trades_since(&state.db, since).await?;

    let daily = performance::daily_pnl(&trades);
    let points = performance::pnl_history(&daily, state.config.risk_limits.total_capital)?;
    Ok(ApiResponse::ok(points))
}

pub async fn performance(
    State(state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> ApiResult<PerformanceSummary> {
    let since = window_start(Utc::now(), query.days()?);
    let trades = trade_repo::get_settled_trades_since(&state.db, since).await?;

    let summary = performance::summarize(&trades, state.config.risk_limits.total_capital)?;
    Ok(ApiResponse::ok(summary))
}

/// Opportunity count and mean deviation per day.
pub async fn opportunities(
    State(state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> ApiResult<Vec<DailyOpportunityStats>> {
    let since = window_start(Utc::now(), query.days()?);
    let stats = opportunity_repo::get_daily_stats_since(&state.db, since).await?;
    Ok(ApiResponse::ok(stats))
}

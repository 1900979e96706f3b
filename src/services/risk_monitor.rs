use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use rust_decimal::prelude::ToPrimitive;
use sqlx::PgPool;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration};

use crate::api::ws_types::WsMessage;
use crate::db::{day_bounds, signal_repo, trade_repo};
use crate::errors::AppError;
use crate::evaluation::{evaluate_risk, DailyActivity, RiskLimits, RiskStatus};

/// Today's (UTC) activity as the risk evaluator sees it.
pub async fn load_daily_activity(pool: &PgPool, now: DateTime<Utc>) -> anyhow::Result<DailyActivity> {
    let (start, end) = day_bounds(now.date_naive());

    let realized_pnl = trade_repo::get_realized_pnl_between(pool, start, end).await?;
    let slots = signal_repo::count_trade_slots_used(pool, start, end).await?;
    let current_exposure = trade_repo::get_open_exposure_between(pool, start, end).await?;

    Ok(DailyActivity {
        realized_pnl,
        confirmed_or_executed_signals: u32::try_from(slots).unwrap_or(u32::MAX),
        current_exposure,
    })
}

/// Load today's activity and evaluate it. Shared by the API and the monitor
/// loop so both report the same numbers.
pub async fn load_risk_status(
    pool: &PgPool,
    limits: &RiskLimits,
    now: DateTime<Utc>,
) -> Result<RiskStatus, AppError> {
    let activity = load_daily_activity(pool, now).await?;
    let status = evaluate_risk(limits, &activity)?;

    counter!("risk_evaluations_total").increment(1);
    gauge!("circuit_breaker_tripped").set(if status.circuit_breaker_tripped { 1.0 } else { 0.0 });
    gauge!("daily_loss_used_fraction").set(status.daily_loss_used_fraction.to_f64().unwrap_or(0.0));

    Ok(status)
}

/// Periodically re-evaluate today's risk and push the result to dashboard
/// WebSocket clients. Logs circuit breaker transitions.
pub async fn run_risk_monitor(
    pool: PgPool,
    limits: RiskLimits,
    ws_tx: broadcast::Sender<WsMessage>,
    interval_secs: u64,
) {
    let mut ticker = interval(Duration::from_secs(interval_secs));
    let mut last_tripped: Option<bool> = None;

    loop {
        ticker.tick().await;

        let status = match load_risk_status(&pool, &limits, Utc::now()).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Risk monitor: evaluation failed");
                continue;
            }
        };

        match (last_tripped, status.circuit_breaker_tripped) {
            (Some(false) | None, true) => {
                tracing::warn!(
                    daily_loss = %status.daily_loss,
                    daily_loss_limit = %status.daily_loss_limit,
                    trade_count = status.trade_count,
                    max_daily_trades = status.max_daily_trades,
                    "Circuit breaker tripped"
                );
            }
            (Some(true), false) => {
                tracing::info!("Circuit breaker cleared");
            }
            _ => {
                tracing::debug!(alert = ?status.alert, "Risk status unchanged");
            }
        }
        last_tripped = Some(status.circuit_breaker_tripped);

        // Err only means no dashboard is connected
        if ws_tx.send(WsMessage::RiskUpdate(status)).is_err() {
            tracing::trace!("No WebSocket subscribers for risk update");
        }
    }
}

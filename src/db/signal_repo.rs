use std::time::Instant;

use chrono::{DateTime, Utc};
use metrics::counter;
use sqlx::PgPool;

use crate::models::{Signal, SignalRow};

use super::observe_query;

const SIGNAL_SELECT: &str = r#"
    SELECT s.id, s.market_id, m.question, s.signal_type, s.confidence,
           s.suggested_amount, s.reason, s.status, s.level, s.expiry_minutes,
           s.created_at, s.confirmed_at, s.executed_at
    FROM signals s
    LEFT JOIN markets m ON m.id = s.market_id
"#;

/// Convert raw rows, dropping the ones with an unknown status/level or an
/// out-of-range confidence. One bad row never hides the rest.
pub fn into_signals(rows: Vec<SignalRow>) -> Vec<Signal> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match Signal::try_from(row) {
                Ok(signal) => Some(signal),
                Err(e) => {
                    tracing::warn!(signal_id = id, error = %e, "Skipping malformed signal row");
                    counter!("malformed_records_total").increment(1);
                    None
                }
            }
        })
        .collect()
}

/// Signals created at or after `since`, newest first.
pub async fn get_signals_since(pool: &PgPool, since: DateTime<Utc>) -> anyhow::Result<Vec<Signal>> {
    let started = Instant::now();
    let sql = format!("{SIGNAL_SELECT} WHERE s.created_at >= $1 ORDER BY s.created_at DESC, s.id");
    let rows = sqlx::query_as::<_, SignalRow>(&sql)
        .bind(since)
        .fetch_all(pool)
        .await?;

    observe_query("signals_since", started);
    Ok(into_signals(rows))
}

pub async fn get_recent_signals(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<Signal>> {
    let sql = format!("{SIGNAL_SELECT} ORDER BY s.created_at DESC, s.id LIMIT $1");
    let rows = sqlx::query_as::<_, SignalRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(into_signals(rows))
}

pub async fn count_pending(pool: &PgPool) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM signals WHERE status = 'pending'")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

/// Signals in `[start, end)` that used up one of the day's trade slots.
pub async fn count_trade_slots_used(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM signals
        WHERE status IN ('confirmed', 'executed')
          AND created_at >= $1 AND created_at < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

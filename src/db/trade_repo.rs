use std::time::Instant;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::{Trade, TradeWithMarket};

use super::observe_query;

/// Sum of settled P&L for trades created in `[start, end)`.
pub async fn get_realized_pnl_between(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> anyhow::Result<Decimal> {
    let row: (Option<Decimal>,) = sqlx::query_as(
        r#"
        SELECT SUM(pnl) FROM trades
        WHERE status = 'settled' AND pnl IS NOT NULL
          AND created_at >= $1 AND created_at < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(row.0.unwrap_or(Decimal::ZERO))
}

/// Capital committed to trades in `[start, end)` that have not settled yet.
pub async fn get_open_exposure_between(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> anyhow::Result<Decimal> {
    let row: (Option<Decimal>,) = sqlx::query_as(
        r#"
        SELECT SUM(amount) FROM trades
        WHERE status IN ('pending', 'confirmed')
          AND created_at >= $1 AND created_at < $2
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok(row.0.unwrap_or(Decimal::ZERO))
}

/// Settled trades created at or after `since`, oldest first.
pub async fn get_settled_trades_since(pool: &PgPool, since: DateTime<Utc>) -> anyhow::Result<Vec<Trade>> {
    let started = Instant::now();
    let trades = sqlx::query_as::<_, Trade>(
        r#"
        SELECT id, market_id, side, amount, price, pnl, status, created_at
        FROM trades
        WHERE status = 'settled' AND created_at >= $1
        ORDER BY created_at, id
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    observe_query("settled_trades_since", started);
    Ok(trades)
}

/// Every trade in `[start, end)` with its market question, newest first.
pub async fn get_trades_between(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> anyhow::Result<Vec<TradeWithMarket>> {
    let trades = sqlx::query_as::<_, TradeWithMarket>(
        r#"
        SELECT t.id, t.market_id, m.question, t.side, t.amount, t.price,
               t.pnl, t.status, t.created_at
        FROM trades t
        LEFT JOIN markets m ON m.id = t.market_id
        WHERE t.created_at >= $1 AND t.created_at < $2
        ORDER BY t.created_at DESC, t.id
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(trades)
}

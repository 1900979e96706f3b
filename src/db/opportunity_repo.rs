use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::{DailyOpportunityStats, OpenOpportunity};

/// Most recently detected opportunities that are still open.
pub async fn get_open_opportunities(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<OpenOpportunity>> {
    let rows = sqlx::query_as::<_, OpenOpportunity>(
        r#"
        SELECT o.id, o.market_id, m.question, m.category,
               o.yes_price, o.no_price, o.total_price, o.deviation_percent, o.detected_at
        FROM arbitrage_opportunities o
        JOIN markets m ON m.id = o.market_id
        WHERE o.status = 'open'
        ORDER BY o.detected_at DESC, o.id
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Opportunity count and mean deviation per UTC day since `since`.
pub async fn get_daily_stats_since(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> anyhow::Result<Vec<DailyOpportunityStats>> {
    let rows = sqlx::query_as::<_, DailyOpportunityStats>(
        r#"
        SELECT (detected_at AT TIME ZONE 'UTC')::date AS day,
               COUNT(*) AS opportunity_count,
               AVG(deviation_percent) AS avg_deviation_percent
        FROM arbitrage_opportunities
        WHERE detected_at >= $1
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

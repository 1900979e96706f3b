use std::time::Instant;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::models::{MarketOverview, PriceSnapshot};

use super::observe_query;

/// Sort order for the market overview. Each variant maps to a fixed
/// ORDER BY clause; user input never reaches the SQL text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketSort {
    #[default]
    Deviation,
    Volume,
    Liquidity,
    Updated,
}

impl MarketSort {
    fn order_by(&self) -> &'static str {
        match self {
            MarketSort::Deviation => "(1 - (p.yes_price + p.no_price)) DESC NULLS LAST",
            MarketSort::Volume => "p.volume_24h DESC NULLS LAST",
            MarketSort::Liquidity => {
                "(COALESCE(p.yes_liquidity, 0) + COALESCE(p.no_liquidity, 0)) DESC"
            }
            MarketSort::Updated => "p.timestamp DESC NULLS LAST",
        }
    }
}

/// Filters for the market overview. Also the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MarketFilter {
    pub category: Option<String>,
    /// Minimum deviation, in percent.
    pub min_deviation: Option<Decimal>,
    pub min_volume: Option<Decimal>,
    pub sort: MarketSort,
}

const OVERVIEW_SELECT: &str = r#"
    SELECT m.id, m.question, m.category, m.resolution_time,
           p.yes_price, p.no_price, p.yes_liquidity, p.no_liquidity, p.volume_24h,
           p.timestamp AS snapshot_at
    FROM markets m
    LEFT JOIN LATERAL (
        SELECT ps.yes_price, ps.no_price, ps.yes_liquidity, ps.no_liquidity,
               ps.volume_24h, ps.timestamp
        FROM price_snapshots ps
        WHERE ps.market_id = m.id
        ORDER BY ps.timestamp DESC
        LIMIT 1
    ) p ON TRUE
"#;

/// Active, unresolved markets joined with their latest price snapshot.
pub async fn get_active_overview(
    pool: &PgPool,
    filter: &MarketFilter,
) -> anyhow::Result<Vec<MarketOverview>> {
    let started = Instant::now();
    let sql = format!(
        r#"{OVERVIEW_SELECT}
        WHERE m.active = TRUE AND m.resolved = FALSE
          AND ($1::TEXT IS NULL OR m.category = $1)
          AND ($2::NUMERIC IS NULL OR (1 - (p.yes_price + p.no_price)) * 100 >= $2)
          AND ($3::NUMERIC IS NULL OR p.volume_24h >= $3)
        ORDER BY {}, m.id
        "#,
        filter.sort.order_by()
    );

    let rows = sqlx::query_as::<_, MarketOverview>(&sql)
        .bind(filter.category.as_deref())
        .bind(filter.min_deviation)
        .bind(filter.min_volume)
        .fetch_all(pool)
        .await?;

    observe_query("market_overview", started);
    Ok(rows)
}

/// One market with its latest snapshot, active or not.
pub async fn get_overview(pool: &PgPool, market_id: &str) -> anyhow::Result<Option<MarketOverview>> {
    let sql = format!("{OVERVIEW_SELECT} WHERE m.id = $1");
    let row = sqlx::query_as::<_, MarketOverview>(&sql)
        .bind(market_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Distinct categories of active markets, alphabetically.
pub async fn get_categories(pool: &PgPool) -> anyhow::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT DISTINCT category
        FROM markets
        WHERE active = TRUE AND resolved = FALSE AND category IS NOT NULL
        ORDER BY category
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}

/// Latest snapshots for one market, newest first.
pub async fn get_recent_snapshots(
    pool: &PgPool,
    market_id: &str,
    limit: i64,
) -> anyhow::Result<Vec<PriceSnapshot>> {
    let rows = sqlx::query_as::<_, PriceSnapshot>(
        r#"
        SELECT market_id, yes_price, no_price, yes_liquidity, no_liquidity, volume_24h, timestamp
        FROM price_snapshots
        WHERE market_id = $1
        ORDER BY timestamp DESC
        LIMIT $2
        "#,
    )
    .bind(market_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

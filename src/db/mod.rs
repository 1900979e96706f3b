pub mod market_repo;
pub mod opportunity_repo;
pub mod risk_log_repo;
pub mod signal_repo;
pub mod trade_repo;

use std::time::Instant;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use metrics::histogram;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn init_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

/// `[start, end)` of a UTC calendar day.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Start of the window covering today and the previous `days - 1` days.
pub fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    let first_day = now.date_naive() - Duration::days(i64::from(days.max(1)) - 1);
    day_bounds(first_day).0
}

pub(crate) fn observe_query(query: &'static str, started: Instant) {
    histogram!("store_query_seconds", "query" => query).record(started.elapsed().as_secs_f64());
}

use sqlx::PgPool;

use crate::models::RiskLog;

pub async fn get_recent_logs(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<RiskLog>> {
    let logs = sqlx::query_as::<_, RiskLog>(
        "SELECT * FROM risk_logs ORDER BY created_at DESC, id DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

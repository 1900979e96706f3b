mod common;

use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tower::ServiceExt;

use arbwatch::api::router::create_router;
use arbwatch::config::AppConfig;
use arbwatch::AppState;

const REPORT: &str = r#"{
    "options": {"days": 30, "scenario": "normal"},
    "result": {
        "totalTrades": 10, "winningTrades": 6, "losingTrades": 4,
        "winRate": 60, "totalPnL": 250, "totalPnLPercent": 25,
        "maxDrawdown": 12, "sharpeRatio": 1.2,
        "trades": [
            {"id": 1, "marketName": "A", "side": "YES", "entryPrice": 0.45, "pnl": 12, "pnlPercent": 4.5}
        ]
    }
}"#;

fn build_app(config: AppConfig, pool: sqlx::PgPool) -> axum::Router {
    let metrics_handle = arbwatch::metrics::init_metrics();
    create_router(AppState::new(pool, config, metrics_handle))
}

/// App whose database is unreachable; enough for every route that fails
/// validation or reads only reports/config.
fn offline_app(reports_dir: &Path) -> axum::Router {
    build_app(
        common::test_config(reports_dir.to_path_buf()),
        common::unreachable_pool(),
    )
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn decimal(value: &serde_json::Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_health_reports_unreachable_db() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, json) = get(offline_app(tmp.path()), "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["reports_dir"], "available");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let tmp = tempfile::tempdir().unwrap();
    let resp = offline_app(tmp.path())
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_backtest_list_and_detail() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("backtest-2024-05-01.json"), REPORT).unwrap();
    std::fs::write(tmp.path().join("backtest-broken.json"), "{}").unwrap();

    let (status, json) = get(offline_app(tmp.path()), "/api/backtests").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let reports = json["data"].as_array().unwrap();
    assert_eq!(reports.len(), 2);
    let good = reports
        .iter()
        .find(|r| r["name"] == "backtest-2024-05-01.json")
        .unwrap();
    assert_eq!(good["assessment"]["verdict"], "good");
    let broken = reports.iter().find(|r| r["name"] == "backtest-broken.json").unwrap();
    assert!(broken["error"].is_string());

    let (status, json) = get(offline_app(tmp.path()), "/api/backtests/backtest-2024-05-01.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["assessment"]["advice"], "test with small capital");
    assert_eq!(json["data"]["winning_trades"], 6);
}

#[tokio::test]
async fn test_backtest_detail_errors() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("backtest-broken.json"), "{}").unwrap();

    let (status, json) = get(offline_app(tmp.path()), "/api/backtests/backtest-nope.json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);

    let (status, _) = get(offline_app(tmp.path()), "/api/backtests/notes.json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(offline_app(tmp.path()), "/api/backtests/backtest-broken.json").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_missing_reports_dir_is_empty_list() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, json) = get(offline_app(&tmp.path().join("absent")), "/api/backtests").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_query_validation_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();

    for uri in [
        "/api/signals?status=bogus",
        "/api/signals/summary?level=EXTREME",
        "/api/analytics/pnl-history?days=0",
        "/api/analytics/performance?days=400",
        "/api/markets?sort=alphabetical",
        "/api/markets?min_deviation=-1",
        "/api/risk/logs?limit=0",
    ] {
        let (status, _) = get(offline_app(tmp.path()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_risk_rules_reflect_config() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, json) = get(offline_app(tmp.path()), "/api/risk/rules").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["limits"]["max_daily_trades"], 3);
    assert_eq!(decimal(&json["data"]["daily_loss_limit"]), dec!(50));
    assert_eq!(decimal(&json["data"]["single_trade_limit"]), dec!(200));
}

#[tokio::test]
async fn test_db_failure_is_internal_error() {
    let tmp = tempfile::tempdir().unwrap();
    let (status, json) = get(offline_app(tmp.path()), "/api/risk/status").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Internal server error");
}

#[tokio::test]
async fn test_bearer_token_required_when_configured() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = common::test_config(tmp.path().to_path_buf());
    config.api_token = Some("s3cret".into());
    let app = build_app(config, common::unreachable_pool());

    let (status, _) = get(app.clone(), "/api/risk/rules").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/risk/rules")
                .header("authorization", "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/risk/rules")
                .header("authorization", "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // health stays public
    let (status, _) = get(app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// ---- Database-backed ----

async fn seeded_app() -> axum::Router {
    let pool = common::setup_test_db().await;
    let now = Utc::now();

    common::seed_market(&pool, "m-calm", "politics", true).await;
    common::seed_market(&pool, "m-wide", "crypto", true).await;
    common::seed_market(&pool, "m-closed", "crypto", false).await;
    common::seed_snapshot(&pool, "m-calm", dec!(0.50), dec!(0.495), dec!(20000), now).await;
    common::seed_snapshot(&pool, "m-wide", dec!(0.46), dec!(0.50), dec!(5000), now).await;
    common::seed_snapshot(&pool, "m-closed", dec!(0.40), dec!(0.40), dec!(100), now).await;

    let tmp = std::env::temp_dir().join("arbwatch-api-tests");
    build_app(common::test_config(tmp), pool)
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_markets_classified_and_sorted() {
    let app = seeded_app().await;
    let (status, json) = get(app, "/api/markets").await;

    assert_eq!(status, StatusCode::OK);
    let markets = json["data"]["markets"].as_array().unwrap();
    assert_eq!(markets.len(), 2, "inactive market excluded");

    // 4% deviation sorts ahead of 0.5%
    assert_eq!(markets[0]["id"], "m-wide");
    assert_eq!(markets[0]["classification"]["level"], "AGGRESSIVE");
    assert_eq!(markets[1]["classification"]["level"], "NONE");
    assert_eq!(json["data"]["stats"]["actionable_count"], 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_market_detail_and_not_found() {
    let app = seeded_app().await;

    let (status, json) = get(app.clone(), "/api/markets/m-wide").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["recommended_side"], "YES");
    assert!(json["data"]["estimated_return"]["expected_profit"].is_string());

    let (status, _) = get(app, "/api/markets/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_risk_status_trips_on_daily_loss() {
    let pool = common::setup_test_db().await;
    let now = Utc::now();
    common::seed_market(&pool, "m-risk", "crypto", true).await;
    common::seed_trade(&pool, "m-risk", dec!(100), Some(dec!(-60)), "settled", now).await;
    // older losses don't count toward today
    common::seed_trade(&pool, "m-risk", dec!(100), Some(dec!(-500)), "settled", now - Duration::days(2)).await;

    let tmp = tempfile::tempdir().unwrap();
    let app = build_app(common::test_config(tmp.path().to_path_buf()), pool);
    let (status, json) = get(app, "/api/risk/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&json["data"]["daily_loss_used_fraction"]), dec!(1.2));
    assert_eq!(json["data"]["circuit_breaker_tripped"], true);
    assert_eq!(json["data"]["alert"], "tripped");
}

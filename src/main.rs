use arbwatch::api::router::create_router;
use arbwatch::config::AppConfig;
use arbwatch::services::risk_monitor::run_risk_monitor;
use arbwatch::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    let metrics_handle = metrics::init_metrics();

    tracing::info!(
        total_capital = %config.risk_limits.total_capital,
        max_daily_trades = config.risk_limits.max_daily_trades,
        reports_dir = %config.reports_dir.display(),
        auth = config.api_token.is_some(),
        "Configuration loaded"
    );

    let state = AppState::new(pool, config, metrics_handle);

    // --- Risk monitor: periodic evaluation pushed over /ws ---
    {
        let pool = state.db.clone();
        let limits = state.config.risk_limits.clone();
        let ws_tx = state.ws_tx.clone();
        let interval_secs = state.config.risk_refresh_interval_secs;
        tokio::spawn(async move {
            run_risk_monitor(pool, limits, ws_tx, interval_secs).await;
        });
        tracing::info!(interval_secs, "Risk monitor spawned");
    }

    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// `RUST_LOG` picks the filter, `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

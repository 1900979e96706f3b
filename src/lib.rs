pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod evaluation;
pub mod metrics;
pub mod models;
pub mod reports;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::api::ws_types::WsMessage;
use crate::cache::TtlCache;
use crate::config::AppConfig;
use crate::db::market_repo::MarketFilter;
use crate::models::MarketOverview;
use crate::reports::ReportStore;

pub type MarketCache = TtlCache<MarketFilter, Vec<MarketOverview>>;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub ws_tx: broadcast::Sender<WsMessage>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub market_cache: Arc<MarketCache>,
    pub reports: ReportStore,
}

impl AppState {
    pub fn new(
        db: sqlx::PgPool,
        config: AppConfig,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        let (ws_tx, _) = broadcast::channel::<WsMessage>(64);
        let market_cache = Arc::new(TtlCache::new(Duration::from_secs(
            config.market_cache_ttl_secs,
        )));
        let reports = ReportStore::new(config.reports_dir.clone());

        Self {
            db,
            config,
            ws_tx,
            metrics_handle,
            market_cache,
            reports,
        }
    }
}

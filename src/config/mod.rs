use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::evaluation::{DeviationThresholds, RiskLimits};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Backtest reports written by the external runner
    pub reports_dir: PathBuf,

    // Market overview read cache
    pub market_cache_ttl_secs: u64,

    // Risk monitor push interval
    pub risk_refresh_interval_secs: u64,

    /// Bearer token for `/api/*` and `/ws`; auth is off when unset.
    pub api_token: Option<String>,

    pub risk_limits: RiskLimits,
    pub deviation_thresholds: DeviationThresholds,
    /// Fee deducted when estimating a market's return (0.005 = 0.5%).
    pub estimated_fee_fraction: Decimal,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = DeviationThresholds::default();
        let limits = RiskLimits::default();

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("PORT", 8080)?,

            reports_dir: env::var("REPORTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./reports")),

            market_cache_ttl_secs: parse_var("MARKET_CACHE_TTL_SECS", 60)?,
            risk_refresh_interval_secs: parse_var("RISK_REFRESH_INTERVAL_SECS", 30)?,

            api_token: env::var("API_TOKEN")
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),

            risk_limits: RiskLimits {
                total_capital: parse_var("TOTAL_CAPITAL", limits.total_capital)?,
                daily_loss_limit_fraction: parse_var(
                    "DAILY_LOSS_LIMIT_FRACTION",
                    limits.daily_loss_limit_fraction,
                )?,
                max_single_trade_fraction: parse_var(
                    "MAX_SINGLE_TRADE_FRACTION",
                    limits.max_single_trade_fraction,
                )?,
                max_daily_trades: parse_var("MAX_DAILY_TRADES", limits.max_daily_trades)?,
                warning_fraction: parse_var("RISK_WARNING_FRACTION", limits.warning_fraction)?,
            },
            deviation_thresholds: DeviationThresholds {
                min_deviation: parse_var("MIN_DEVIATION_THRESHOLD", defaults.min_deviation)?,
                conservative_upper: parse_var("CONSERVATIVE_UPPER", defaults.conservative_upper)?,
                aggressive_upper: parse_var("AGGRESSIVE_UPPER", defaults.aggressive_upper)?,
                ..defaults
            },
            estimated_fee_fraction: parse_var("ESTIMATED_FEE_FRACTION", Decimal::new(5, 3))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject limits the evaluators would refuse anyway, so a bad deploy
    /// fails at startup instead of on every request.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.risk_limits.validate()?;
        self.deviation_thresholds.validate()?;
        if self.market_cache_ttl_secs == 0 {
            anyhow::bail!("MARKET_CACHE_TTL_SECS must be positive");
        }
        if self.risk_refresh_interval_secs == 0 {
            anyhow::bail!("RISK_REFRESH_INTERVAL_SECS must be positive");
        }
        Ok(())
    }
}

/// Read an optional variable. Unset or blank falls back to `default`; a value
/// that does not parse is an error.
fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
        _ => Ok(default),
    }
}

//! Backtest reports written by the external runner as `backtest-*.json`
//! files. The store only ever reads them.

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::fs;

use crate::errors::EvalError;
use crate::evaluation::performance::{histogram, HistogramBin};
use crate::evaluation::{assess, Assessment, BacktestMetrics};
use crate::models::BacktestReport;

pub const REPORT_PREFIX: &str = "backtest-";
pub const REPORT_SUFFIX: &str = ".json";
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report {0} not found")]
    NotFound(String),

    #[error("invalid report name {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Malformed(#[from] EvalError),

    #[error("report i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A report file on disk.
#[derive(Debug, Clone, Serialize)]
pub struct ReportFile {
    pub name: String,
    pub modified: Option<DateTime<Utc>>,
    pub size_bytes: u64,
}

/// Headline numbers shown in the report list.
#[derive(Debug, Clone, Serialize)]
pub struct ReportHeadline {
    pub scenario: Option<String>,
    pub days: Option<u32>,
    pub total_trades: u32,
    pub win_rate: Decimal,
    pub total_pnl: Decimal,
    pub total_pnl_percent: Decimal,
    pub sharpe_ratio: Decimal,
    pub max_drawdown: Decimal,
}

/// One entry of the report list. A file that failed to parse carries
/// `error` instead of a headline and assessment.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    #[serde(flatten)]
    pub file: ReportFile,
    pub headline: Option<ReportHeadline>,
    pub assessment: Option<Assessment>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub file: ReportFile,
    pub report: BacktestReport,
    pub assessment: Assessment,
    pub winning_trades: u32,
    pub losing_trades: u32,
    /// Distribution of per-trade `pnlPercent`.
    pub return_distribution: Vec<HistogramBin>,
}

/// `backtest-<anything>.json`, a bare file name with no path components.
pub fn is_report_name(name: &str) -> bool {
    name.len() > REPORT_PREFIX.len() + REPORT_SUFFIX.len()
        && name.starts_with(REPORT_PREFIX)
        && name.ends_with(REPORT_SUFFIX)
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

pub fn parse_report(bytes: &[u8]) -> Result<BacktestReport, EvalError> {
    serde_json::from_slice(bytes).map_err(|e| EvalError::MalformedRecord(e.to_string()))
}

fn headline(report: &BacktestReport) -> ReportHeadline {
    let result = &report.result;
    ReportHeadline {
        scenario: report.options.scenario.clone(),
        days: report.options.days,
        total_trades: result.total_trades,
        win_rate: result.win_rate,
        total_pnl: result.total_pnl,
        total_pnl_percent: result.total_pnl_percent,
        sharpe_ratio: result.sharpe_ratio,
        max_drawdown: result.max_drawdown,
    }
}

/// Win/loss counts. Older reports omit the counters, so fall back to the
/// per-trade list when both are zero.
fn win_loss_counts(report: &BacktestReport) -> (u32, u32) {
    let result = &report.result;
    if result.winning_trades + result.losing_trades > 0 || result.trades.is_empty() {
        return (result.winning_trades, result.losing_trades);
    }
    result.trades.iter().fold((0, 0), |(wins, losses), t| match t.pnl {
        Some(p) if p > Decimal::ZERO => (wins + 1, losses),
        Some(p) if p < Decimal::ZERO => (wins, losses + 1),
        _ => (wins, losses),
    })
}

#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn is_available(&self) -> bool {
        fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Report files, newest first. A missing directory means no reports yet.
    pub async fn list(&self) -> Result<Vec<ReportFile>, ReportError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(dir = %self.dir.display(), "Reports directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_report_name(&name) {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            files.push(ReportFile {
                name,
                modified: meta.modified().ok().map(DateTime::<Utc>::from),
                size_bytes: meta.len(),
            });
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(files)
    }

    async fn read(&self, name: &str) -> Result<(ReportFile, BacktestReport), ReportError> {
        if !is_report_name(name) {
            return Err(ReportError::InvalidName(name.to_string()));
        }

        let path = self.dir.join(name);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ReportError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let meta = fs::metadata(&path).await?;

        let file = ReportFile {
            name: name.to_string(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            size_bytes: meta.len(),
        };
        Ok((file, parse_report(&bytes)?))
    }

    pub async fn load(&self, name: &str) -> Result<BacktestReport, ReportError> {
        self.read(name).await.map(|(_, report)| report)
    }

    /// Full report with its verdict and return distribution.
    pub async fn detail(&self, name: &str) -> Result<ReportDetail, ReportError> {
        let (file, report) = self.read(name).await?;

        let assessment = assess(&BacktestMetrics::from(&report.result));
        let (winning_trades, losing_trades) = win_loss_counts(&report);
        let returns: Vec<Decimal> = report
            .result
            .trades
            .iter()
            .filter_map(|t| t.pnl_percent)
            .collect();

        Ok(ReportDetail {
            file,
            assessment,
            winning_trades,
            losing_trades,
            return_distribution: histogram(&returns, DEFAULT_HISTOGRAM_BINS),
            report,
        })
    }

    /// Judge every report independently. A file that cannot be read or
    /// parsed produces an error entry; the rest are unaffected.
    pub async fn evaluate_all(&self) -> Result<Vec<ReportSummary>, ReportError> {
        let files = self.list().await?;
        let mut summaries = Vec::with_capacity(files.len());

        for file in files {
            match self.load(&file.name).await {
                Ok(report) => summaries.push(ReportSummary {
                    headline: Some(headline(&report)),
                    assessment: Some(assess(&BacktestMetrics::from(&report.result))),
                    error: None,
                    file,
                }),
                Err(e) => {
                    tracing::warn!(report = %file.name, error = %e, "Skipping unreadable backtest report");
                    counter!("malformed_records_total").increment(1);
                    summaries.push(ReportSummary {
                        headline: None,
                        assessment: None,
                        error: Some(e.to_string()),
                        file,
                    });
                }
            }
        }

        Ok(summaries)
    }
}

// ---- Tests ----

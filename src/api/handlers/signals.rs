use axum::extract::{Query, State};
use chrono::Utc;
use serde::Deserialize;

use super::{non_blank, parse_days, ApiResponse, ApiResult};
use crate::db::{signal_repo, window_start};
use crate::errors::AppError;
use crate::evaluation::signals::{self, SignalFilter, SignalSummary, TimeWindow};
use crate::models::{Signal, SignalLevel, SignalStatus};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SignalQuery {
    pub status: Option<String>,
    pub level: Option<String>,
    pub days: Option<u32>,
}

impl SignalQuery {
    fn filter(&self) -> Result<SignalFilter, AppError> {
        let status = non_blank(self.status.as_deref())
            .map(str::parse::<SignalStatus>)
            .transpose()
            .map_err(|e| AppError::BadRequest(format!("status: {e}")))?;
        let level = non_blank(self.level.as_deref())
            .map(str::parse::<SignalLevel>)
            .transpose()
            .map_err(|e| AppError::BadRequest(format!("level: {e}")))?;
        Ok(SignalFilter { status, level })
    }
}

async fn load_window(
    state: &AppState,
    query: &SignalQuery,
) -> Result<(Vec<Signal>, TimeWindow, SignalFilter), AppError> {
    let filter = query.filter()?;
    let days = parse_days(query.days)?;

    let now = Utc::now();
    let window = TimeWindow {
        start: window_start(now, days),
        end: now,
    };
    let rows = signal_repo::get_signals_since(&state.db, window.start).await?;
    Ok((rows, window, filter))
}

/// Signal history, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SignalQuery>,
) -> ApiResult<Vec<Signal>> {
    let (rows, window, filter) = load_window(&state, &query).await?;

    let mut selected: Vec<Signal> = signals::select(&rows, &window, &filter)
        .into_iter()
        .cloned()
        .collect();
    signals::sort_for_display(&mut selected);

    Ok(ApiResponse::ok(selected))
}

/// Counts by status and level with per-level execution rates.
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SignalQuery>,
) -> ApiResult<SignalSummary> {
    let (rows, window, filter) = load_window(&state, &query).await?;
    Ok(ApiResponse::ok(signals::summarize(&rows, &window, &filter)))
}

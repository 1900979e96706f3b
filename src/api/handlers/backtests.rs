use axum::extract::{Path, State};

use super::{ApiResponse, ApiResult};
use crate::reports::{ReportDetail, ReportSummary};
use crate::AppState;

/// Every report, newest first, each with its own verdict or parse error.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ReportSummary>> {
    let summaries = state.reports.evaluate_all().await?;
    Ok(ApiResponse::ok(summaries))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<ReportDetail> {
    let detail = state.reports.detail(&name).await?;
    Ok(ApiResponse::ok(detail))
}

pub mod analytics;
pub mod backtests;
pub mod dashboard;
pub mod health;
pub mod markets;
pub mod risk;
pub mod signals;
pub mod ws;

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_DAYS: u32 = 7;
pub const MAX_DAYS: u32 = 365;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// `?days=` window, today included.
#[derive(Debug, Default, Deserialize)]
pub struct DaysQuery {
    pub days: Option<u32>,
}

impl DaysQuery {
    pub fn days(&self) -> Result<u32, AppError> {
        parse_days(self.days)
    }
}

pub fn parse_days(days: Option<u32>) -> Result<u32, AppError> {
    match days {
        None => Ok(DEFAULT_DAYS),
        Some(d) if (1..=MAX_DAYS).contains(&d) => Ok(d),
        Some(d) => Err(AppError::BadRequest(format!(
            "days must be between 1 and {MAX_DAYS}, got {d}"
        ))),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    pub fn limit(&self, default: i64, max: i64) -> Result<i64, AppError> {
        match self.limit {
            None => Ok(default),
            Some(l) if (1..=max).contains(&l) => Ok(l),
            Some(l) => Err(AppError::BadRequest(format!(
                "limit must be between 1 and {max}, got {l}"
            ))),
        }
    }
}

/// Query-string values arrive as `""` when a form field is left blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_bounds() {
        assert_eq!(parse_days(None).unwrap(), 7);
        assert_eq!(parse_days(Some(365)).unwrap(), 365);
        assert!(matches!(parse_days(Some(0)), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_days(Some(366)), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_limit_bounds() {
        let q = LimitQuery { limit: None };
        assert_eq!(q.limit(20, 100).unwrap(), 20);
        let q = LimitQuery { limit: Some(101) };
        assert!(q.limit(20, 100).is_err());
    }
}

use axum::extract::{Path, Query, State};
use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{non_blank, ApiResponse, ApiResult, LimitQuery};
use crate::db::market_repo::{self, MarketFilter, MarketSort};
use crate::db::opportunity_repo;
use crate::errors::AppError;
use crate::evaluation::deviation::{
    actionable_return, assess_market, recommend_side, summarize_markets, EstimatedReturn,
    MarketAssessment, MarketStats,
};
use crate::evaluation::{classify, Classification};
use crate::models::{MarketOverview, OpenOpportunity, PriceSnapshot, Side};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MarketQuery {
    pub category: Option<String>,
    pub min_deviation: Option<Decimal>,
    pub min_volume: Option<Decimal>,
    pub sort: Option<MarketSort>,
}

impl MarketQuery {
    fn into_filter(self) -> Result<MarketFilter, AppError> {
        if self.min_deviation.is_some_and(|d| d.is_sign_negative()) {
            return Err(AppError::BadRequest("min_deviation must not be negative".into()));
        }
        if self.min_volume.is_some_and(|v| v.is_sign_negative()) {
            return Err(AppError::BadRequest("min_volume must not be negative".into()));
        }
        Ok(MarketFilter {
            category: non_blank(self.category.as_deref()).map(str::to_string),
            min_deviation: self.min_deviation,
            min_volume: self.min_volume,
            sort: self.sort.unwrap_or_default(),
        })
    }
}

#[derive(Serialize)]
pub struct MarketView {
    #[serde(flatten)]
    pub market: MarketOverview,
    #[serde(flatten)]
    pub assessment: MarketAssessment,
}

#[derive(Serialize)]
pub struct MarketList {
    pub markets: Vec<MarketView>,
    pub stats: MarketStats,
}

/// Active markets with their latest prices, deviation and tier.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<MarketQuery>,
) -> ApiResult<MarketList> {
    let filter = query.into_filter()?;

    let markets = match state.market_cache.get(&filter).await {
        Some(cached) => {
            counter!("market_cache_hits_total").increment(1);
            cached
        }
        None => {
            counter!("market_cache_misses_total").increment(1);
            let fresh = market_repo::get_active_overview(&state.db, &filter).await?;
            state.market_cache.insert(filter, fresh.clone()).await;
            fresh
        }
    };

    let thresholds = &state.config.deviation_thresholds;
    let views: Vec<MarketView> = markets
        .into_iter()
        .map(|market| MarketView {
            assessment: assess_market(&market, thresholds),
            market,
        })
        .collect();
    let assessments: Vec<MarketAssessment> = views.iter().map(|v| v.assessment.clone()).collect();

    Ok(ApiResponse::ok(MarketList {
        stats: summarize_markets(&assessments),
        markets: views,
    }))
}

pub async fn categories(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let categories = market_repo::get_categories(&state.db).await?;
    Ok(ApiResponse::ok(categories))
}

#[derive(Serialize)]
pub struct MarketDetail {
    #[serde(flatten)]
    pub market: MarketOverview,
    #[serde(flatten)]
    pub assessment: MarketAssessment,
    pub total_liquidity: Option<Decimal>,
    pub recommended_side: Option<Side>,
    /// Projected on the single trade limit.
    pub estimated_return: Option<EstimatedReturn>,
    pub recent_snapshots: Vec<PriceSnapshot>,
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MarketDetail> {
    let market = market_repo::get_overview(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("market {id} not found")))?;
    let recent_snapshots = market_repo::get_recent_snapshots(&state.db, &id, 50).await?;

    let assessment = assess_market(&market, &state.config.deviation_thresholds);
    let recommended_side = market.prices().map(|(yes, no)| recommend_side(yes, no));
    let estimated_return = actionable_return(
        &assessment,
        state.config.estimated_fee_fraction,
        state.config.risk_limits.single_trade_limit(),
    );

    Ok(ApiResponse::ok(MarketDetail {
        total_liquidity: market.total_liquidity(),
        recommended_side,
        estimated_return,
        recent_snapshots,
        assessment,
        market,
    }))
}

#[derive(Serialize)]
pub struct ClassifiedOpportunity {
    #[serde(flatten)]
    pub opportunity: OpenOpportunity,
    pub classification: Classification,
}

/// Latest open opportunities, each tiered by the same classifier as markets.
pub async fn opportunities(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<ClassifiedOpportunity>> {
    let limit = query.limit(10, 100)?;
    let rows = opportunity_repo::get_open_opportunities(&state.db, limit).await?;

    let thresholds = &state.config.deviation_thresholds;
    let classified = rows
        .into_iter()
        .map(|opportunity| ClassifiedOpportunity {
            classification: classify(opportunity.deviation_percent, thresholds),
            opportunity,
        })
        .collect();

    Ok(ApiResponse::ok(classified))
}

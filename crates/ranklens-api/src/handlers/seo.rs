//! SEO data handlers, one per dimension.
//!
//! Handlers stay thin: parse parameters, call the engine, wrap the result
//! in the success envelope. All caching and fallback behavior lives in the
//! engine.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use ranklens_core::records::{
    CompetitorIntersection, CompetitorRecord, DomainOverview, KeywordRecord, PageRecord,
    RankHistoryPoint,
};
use ranklens_core::snapshot::Fetched;
use ranklens_core::{Error, WebsiteId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::middleware::Identity;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegionParams {
    pub region: Option<String>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub region: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct IntersectionParams {
    pub competitors: Option<String>,
    pub region: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// The success envelope every dimension endpoint returns.
#[derive(Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
    pub cached: bool,
}

impl<T> DataResponse<T> {
    fn from_fetched(fetched: Fetched<T>) -> Json<Self> {
        Json(Self {
            success: true,
            data: fetched.data,
            cached: fetched.cached,
        })
    }
}

fn parse_website_id(raw: &str) -> Result<WebsiteId, Error> {
    raw.parse()
        .map_err(|_| Error::InvalidRequest(format!("invalid website id '{raw}'")))
}

/// Split the comma-separated `competitors` parameter into raw entries.
/// Canonicalization happens in the engine.
fn split_competitors(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

pub async fn overview(
    State(state): State<Arc<AppState>>,
    Identity(caller): Identity,
    Path(website_id): Path<String>,
    Query(params): Query<RegionParams>,
) -> ApiResult<Json<DataResponse<DomainOverview>>> {
    let website_id = parse_website_id(&website_id)?;
    let fetched = state
        .engine
        .overview(caller, website_id, params.region.as_deref())
        .await?;
    Ok(DataResponse::from_fetched(fetched))
}

pub async fn keywords(
    State(state): State<Arc<AppState>>,
    Identity(caller): Identity,
    Path(website_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<DataResponse<Vec<KeywordRecord>>>> {
    let website_id = parse_website_id(&website_id)?;
    let fetched = state
        .engine
        .keywords(caller, website_id, params.region.as_deref(), params.limit)
        .await?;
    Ok(DataResponse::from_fetched(fetched))
}

pub async fn competitors(
    State(state): State<Arc<AppState>>,
    Identity(caller): Identity,
    Path(website_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<DataResponse<Vec<CompetitorRecord>>>> {
    let website_id = parse_website_id(&website_id)?;
    let fetched = state
        .engine
        .competitors(caller, website_id, params.region.as_deref(), params.limit)
        .await?;
    Ok(DataResponse::from_fetched(fetched))
}

pub async fn intersection(
    State(state): State<Arc<AppState>>,
    Identity(caller): Identity,
    Path(website_id): Path<String>,
    Query(params): Query<IntersectionParams>,
) -> ApiResult<Json<DataResponse<Vec<CompetitorIntersection>>>> {
    let website_id = parse_website_id(&website_id)?;
    let competitors = split_competitors(params.competitors.as_deref());
    let fetched = state
        .engine
        .intersection(
            caller,
            website_id,
            &competitors,
            params.region.as_deref(),
            params.limit,
        )
        .await?;
    Ok(DataResponse::from_fetched(fetched))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Identity(caller): Identity,
    Path(website_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<DataResponse<Vec<RankHistoryPoint>>>> {
    let website_id = parse_website_id(&website_id)?;
    let fetched = state
        .engine
        .history(
            caller,
            website_id,
            params.from.as_deref(),
            params.to.as_deref(),
        )
        .await?;
    Ok(DataResponse::from_fetched(fetched))
}

pub async fn pages(
    State(state): State<Arc<AppState>>,
    Identity(caller): Identity,
    Path(website_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<DataResponse<Vec<PageRecord>>>> {
    let website_id = parse_website_id(&website_id)?;
    let fetched = state
        .engine
        .pages(caller, website_id, params.region.as_deref(), params.limit)
        .await?;
    Ok(DataResponse::from_fetched(fetched))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_competitors() {
        assert_eq!(
            split_competitors(Some("rival.com, other.io ,,")),
            vec!["rival.com", "other.io"]
        );
        assert!(split_competitors(None).is_empty());
        assert!(split_competitors(Some("")).is_empty());
    }

    #[test]
    fn test_parse_website_id_rejects_garbage() {
        assert!(parse_website_id("not-a-uuid").is_err());
        let id = WebsiteId::new();
        assert_eq!(parse_website_id(&id.to_string()).unwrap(), id);
    }
}

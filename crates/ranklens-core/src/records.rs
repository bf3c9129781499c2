//! Payload record types, one family per data dimension.
//!
//! These are the shapes we persist inside snapshots and serve to API
//! callers, already reduced from the provider's raw wire format.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Headline metrics for a whole domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DomainOverview {
    pub organic_traffic: f64,
    pub organic_keywords: i64,
    pub domain_rank: i64,
}

/// One ranked keyword with its metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeywordRecord {
    pub keyword: String,
    pub search_volume: i64,
    pub rank_position: Option<i64>,
    pub previous_rank_position: Option<i64>,
    pub cpc: f64,
    pub competition: f64,
    pub difficulty: Option<i64>,
}

impl KeywordRecord {
    /// Handy in tests and fixtures; production records come off the wire.
    pub fn named(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            search_volume: 0,
            rank_position: None,
            previous_rank_position: None,
            cpc: 0.0,
            competition: 0.0,
            difficulty: None,
        }
    }
}

/// A domain competing for the same organic keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompetitorRecord {
    pub domain: String,
    pub avg_position: f64,
    pub common_keywords: i64,
    pub organic_traffic: f64,
}

/// A keyword both we and a given competitor rank for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IntersectionRecord {
    pub keyword: String,
    pub search_volume: i64,
    pub cpc: f64,
    pub our_position: Option<i64>,
    pub their_position: Option<i64>,
}

/// Domain rank metrics for one calendar month (`month` is `YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankHistoryPoint {
    pub month: String,
    pub organic_traffic: f64,
    pub organic_keywords: i64,
    pub top_3: i64,
    pub top_10: i64,
    pub top_100: i64,
}

/// A page on the tracked site ranked by organic value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageRecord {
    pub page: String,
    pub organic_traffic: f64,
    pub keyword_count: i64,
    pub top_10_keywords: i64,
}

/// Intersection results for one competitor, as returned by the fan-out
/// endpoint. Each competitor carries its own cache flag because entries
/// can resolve from different sources within a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompetitorIntersection {
    pub competitor: String,
    pub keywords: Vec<IntersectionRecord>,
    pub cached: bool,
}

//! DataForSEO Labs wire format.
//!
//! The envelope and item shapes exactly as the provider returns them, plus
//! the reduction into domain records. Nothing in here leaks past the
//! adapter boundary.

use ranklens_core::error::{ProviderError, ProviderResult};
use ranklens_core::records::{
    CompetitorRecord, DomainOverview, IntersectionRecord, KeywordRecord, PageRecord,
    RankHistoryPoint,
};
use serde::Deserialize;

/// Status code the provider uses for "ok" at both envelope and task level.
pub(crate) const STATUS_OK: i64 = 20000;

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub status_code: i64,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub tasks: Vec<TaskEnvelope<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskEnvelope<T> {
    pub status_code: i64,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub result: Option<Vec<TaskResult<T>>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskResult<T> {
    #[serde(default)]
    pub items: Option<Vec<T>>,
}

impl<T> Envelope<T> {
    /// Unwrap the envelope down to its items.
    ///
    /// A missing or null `result` is a legitimate empty answer, not an
    /// error; a non-ok status at either level is surfaced as `Upstream`.
    pub fn into_items(self) -> ProviderResult<Vec<T>> {
        if self.status_code != STATUS_OK {
            return Err(ProviderError::Upstream {
                code: self.status_code,
                message: self.status_message,
            });
        }
        let task = self
            .tasks
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Malformed("response contained no tasks".into()))?;
        if task.status_code != STATUS_OK {
            return Err(ProviderError::Upstream {
                code: task.status_code,
                message: task.status_message,
            });
        }
        Ok(task
            .result
            .unwrap_or_default()
            .into_iter()
            .flat_map(|r| r.items.unwrap_or_default())
            .collect())
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Metrics {
    #[serde(default)]
    pub organic: OrganicMetrics,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrganicMetrics {
    #[serde(default)]
    pub etv: f64,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub pos_1: i64,
    #[serde(default)]
    pub pos_2_3: i64,
    #[serde(default)]
    pub pos_4_10: i64,
}

impl OrganicMetrics {
    fn top_3(&self) -> i64 {
        self.pos_1 + self.pos_2_3
    }

    fn top_10(&self) -> i64 {
        self.top_3() + self.pos_4_10
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OverviewItem {
    #[serde(default)]
    pub metrics: Metrics,
}

impl OverviewItem {
    pub fn into_record(self) -> DomainOverview {
        let organic = self.metrics.organic;
        DomainOverview {
            organic_traffic: organic.etv,
            organic_keywords: organic.count,
            domain_rank: organic.rank,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct KeywordData {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub keyword_info: KeywordInfo,
    #[serde(default)]
    pub keyword_properties: KeywordProperties,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct KeywordInfo {
    #[serde(default)]
    pub search_volume: i64,
    #[serde(default)]
    pub cpc: Option<f64>,
    #[serde(default)]
    pub competition: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct KeywordProperties {
    #[serde(default)]
    pub keyword_difficulty: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SerpElement {
    #[serde(default)]
    pub serp_item: Option<SerpItem>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SerpItem {
    #[serde(default)]
    pub rank_absolute: Option<i64>,
    #[serde(default)]
    pub previous_rank_absolute: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RankedKeywordItem {
    #[serde(default)]
    pub keyword_data: KeywordData,
    #[serde(default)]
    pub ranked_serp_element: Option<SerpElement>,
}

impl RankedKeywordItem {
    pub fn into_record(self) -> KeywordRecord {
        let serp = self.ranked_serp_element.and_then(|e| e.serp_item);
        KeywordRecord {
            keyword: self.keyword_data.keyword,
            search_volume: self.keyword_data.keyword_info.search_volume,
            rank_position: serp.as_ref().and_then(|s| s.rank_absolute),
            previous_rank_position: serp.as_ref().and_then(|s| s.previous_rank_absolute),
            cpc: self.keyword_data.keyword_info.cpc.unwrap_or_default(),
            competition: self.keyword_data.keyword_info.competition.unwrap_or_default(),
            difficulty: self.keyword_data.keyword_properties.keyword_difficulty,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompetitorItem {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub avg_position: f64,
    #[serde(default)]
    pub intersections: i64,
    #[serde(default)]
    pub metrics: Metrics,
}

impl CompetitorItem {
    pub fn into_record(self) -> CompetitorRecord {
        CompetitorRecord {
            domain: self.domain,
            avg_position: self.avg_position,
            common_keywords: self.intersections,
            organic_traffic: self.metrics.organic.etv,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct IntersectionItem {
    #[serde(default)]
    pub keyword_data: KeywordData,
    #[serde(default)]
    pub first_domain_serp_element: Option<SerpItem>,
    #[serde(default)]
    pub second_domain_serp_element: Option<SerpItem>,
}

impl IntersectionItem {
    pub fn into_record(self) -> IntersectionRecord {
        IntersectionRecord {
            keyword: self.keyword_data.keyword,
            search_volume: self.keyword_data.keyword_info.search_volume,
            cpc: self.keyword_data.keyword_info.cpc.unwrap_or_default(),
            our_position: self
                .first_domain_serp_element
                .and_then(|s| s.rank_absolute),
            their_position: self
                .second_domain_serp_element
                .and_then(|s| s.rank_absolute),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryItem {
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub month: u32,
    #[serde(default)]
    pub metrics: Metrics,
}

impl HistoryItem {
    pub fn into_record(self) -> RankHistoryPoint {
        let organic = self.metrics.organic;
        RankHistoryPoint {
            month: format!("{:04}-{:02}", self.year, self.month),
            organic_traffic: organic.etv,
            organic_keywords: organic.count,
            top_3: organic.top_3(),
            top_10: organic.top_10(),
            top_100: organic.count,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageItem {
    #[serde(default)]
    pub page_address: String,
    #[serde(default)]
    pub metrics: Metrics,
}

impl PageItem {
    pub fn into_record(self) -> PageRecord {
        let organic = self.metrics.organic;
        PageRecord {
            page: self.page_address,
            organic_traffic: organic.etv,
            keyword_count: organic.count,
            top_10_keywords: organic.top_10(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_envelope_unwraps_items() {
        let json = serde_json::json!({
            "status_code": 20000,
            "status_message": "Ok.",
            "tasks": [{
                "status_code": 20000,
                "status_message": "Ok.",
                "result": [{
                    "items": [
                        {"page_address": "/pricing", "metrics": {"organic": {"etv": 91.5, "count": 12, "pos_1": 1, "pos_2_3": 2, "pos_4_10": 3}}}
                    ]
                }]
            }]
        });

        let envelope: Envelope<PageItem> = serde_json::from_value(json).unwrap();
        let items = envelope.into_items().unwrap();
        assert_eq!(items.len(), 1);

        let record = items.into_iter().next().unwrap().into_record();
        assert_eq!(record.page, "/pricing");
        assert_eq!(record.organic_traffic, 91.5);
        assert_eq!(record.keyword_count, 12);
        assert_eq!(record.top_10_keywords, 6);
    }

    #[test]
    fn test_envelope_null_result_is_empty_not_error() {
        let json = serde_json::json!({
            "status_code": 20000,
            "tasks": [{"status_code": 20000, "result": null}]
        });

        let envelope: Envelope<PageItem> = serde_json::from_value(json).unwrap();
        assert!(envelope.into_items().unwrap().is_empty());
    }

    #[test]
    fn test_envelope_task_failure_is_upstream_error() {
        let json = serde_json::json!({
            "status_code": 20000,
            "tasks": [{"status_code": 40501, "status_message": "Invalid Field."}]
        });

        let envelope: Envelope<PageItem> = serde_json::from_value(json).unwrap();
        let err = envelope.into_items().unwrap_err();
        assert!(matches!(err, ProviderError::Upstream { code: 40501, .. }));
    }

    #[test]
    fn test_envelope_without_tasks_is_malformed() {
        let json = serde_json::json!({"status_code": 20000, "tasks": []});
        let envelope: Envelope<PageItem> = serde_json::from_value(json).unwrap();
        assert!(matches!(
            envelope.into_items().unwrap_err(),
            ProviderError::Malformed(_)
        ));
    }

    #[test]
    fn test_ranked_keyword_item_mapping() {
        let json = serde_json::json!({
            "keyword_data": {
                "keyword": "running shoes",
                "keyword_info": {"search_volume": 74000, "cpc": 1.35, "competition": 0.81},
                "keyword_properties": {"keyword_difficulty": 62}
            },
            "ranked_serp_element": {
                "serp_item": {"rank_absolute": 4, "previous_rank_absolute": 7}
            }
        });

        let item: RankedKeywordItem = serde_json::from_value(json).unwrap();
        let record = item.into_record();
        assert_eq!(record.keyword, "running shoes");
        assert_eq!(record.search_volume, 74000);
        assert_eq!(record.rank_position, Some(4));
        assert_eq!(record.previous_rank_position, Some(7));
        assert_eq!(record.cpc, 1.35);
        assert_eq!(record.difficulty, Some(62));
    }

    #[test]
    fn test_keyword_item_with_null_metrics_defaults() {
        let json = serde_json::json!({
            "keyword_data": {
                "keyword": "obscure term",
                "keyword_info": {"search_volume": 10, "cpc": null, "competition": null}
            }
        });

        let item: RankedKeywordItem = serde_json::from_value(json).unwrap();
        let record = item.into_record();
        assert_eq!(record.cpc, 0.0);
        assert_eq!(record.competition, 0.0);
        assert_eq!(record.rank_position, None);
        assert_eq!(record.difficulty, None);
    }

    #[test]
    fn test_history_item_formats_month() {
        let json = serde_json::json!({
            "year": 2025,
            "month": 3,
            "metrics": {"organic": {"etv": 1500.0, "count": 200, "pos_1": 5, "pos_2_3": 10, "pos_4_10": 25}}
        });

        let item: HistoryItem = serde_json::from_value(json).unwrap();
        let point = item.into_record();
        assert_eq!(point.month, "2025-03");
        assert_eq!(point.top_3, 15);
        assert_eq!(point.top_10, 40);
        assert_eq!(point.top_100, 200);
    }
}

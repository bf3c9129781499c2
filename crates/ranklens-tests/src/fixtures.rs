//! Fixture builders for websites, payload records, and snapshots.

use chrono::{Duration, Utc};
use ranklens_core::ids::UserId;
use ranklens_core::records::{
    CompetitorRecord, DomainOverview, IntersectionRecord, KeywordRecord, PageRecord,
    RankHistoryPoint,
};
use ranklens_core::snapshot::{Snapshot, SnapshotKey};
use ranklens_core::website::Website;

/// Builds tracked websites.
pub struct WebsiteFixture;

impl WebsiteFixture {
    /// A US-market website owned by `user_id`.
    pub fn owned_by(user_id: UserId) -> Website {
        Website::new(user_id, "example.com").with_region("us")
    }
}

/// Builds provider payload records.
pub struct PayloadFixture;

impl PayloadFixture {
    pub fn overview() -> DomainOverview {
        DomainOverview {
            organic_traffic: 1200.0,
            organic_keywords: 340,
            domain_rank: 62,
        }
    }

    pub fn keyword(keyword: &str, search_volume: i64) -> KeywordRecord {
        KeywordRecord {
            keyword: keyword.into(),
            search_volume,
            rank_position: Some(4),
            previous_rank_position: Some(7),
            cpc: 1.35,
            competition: 0.81,
            difficulty: Some(62),
        }
    }

    pub fn keywords() -> Vec<KeywordRecord> {
        vec![
            Self::keyword("running shoes", 74000),
            Self::keyword("trail running shoes", 18100),
            Self::keyword("waterproof hiking boots", 9900),
        ]
    }

    /// Keyword payload polluted with import artifacts, stray numbering,
    /// a row that repairs into a duplicate, and numeric junk.
    pub fn dirty_keywords() -> Vec<KeywordRecord> {
        vec![
            Self::keyword("running shoes", 74000),
            Self::keyword("001-qk7yulqsx9esalil5mxjkg-3342555957 trail shoes", 18100),
            Self::keyword("051 winter boots", 9900),
            Self::keyword("02 running shoes", 100),
            Self::keyword("050", 500),
        ]
    }

    pub fn competitor(domain: &str, common_keywords: i64, organic_traffic: f64) -> CompetitorRecord {
        CompetitorRecord {
            domain: domain.into(),
            avg_position: 12.4,
            common_keywords,
            organic_traffic,
        }
    }

    pub fn competitors() -> Vec<CompetitorRecord> {
        vec![
            Self::competitor("rivals.com", 480, 3100.0),
            Self::competitor("challenger.io", 260, 900.0),
        ]
    }

    pub fn intersection(keyword: &str, search_volume: i64) -> IntersectionRecord {
        IntersectionRecord {
            keyword: keyword.into(),
            search_volume,
            cpc: 0.9,
            our_position: Some(6),
            their_position: Some(3),
        }
    }

    pub fn intersections() -> Vec<IntersectionRecord> {
        vec![
            Self::intersection("running shoes", 74000),
            Self::intersection("marathon training plan", 12100),
        ]
    }

    pub fn history_point(month: &str, organic_traffic: f64) -> RankHistoryPoint {
        RankHistoryPoint {
            month: month.into(),
            organic_traffic,
            organic_keywords: 300,
            top_3: 12,
            top_10: 40,
            top_100: 300,
        }
    }

    pub fn page(page: &str, organic_traffic: f64) -> PageRecord {
        PageRecord {
            page: page.into(),
            organic_traffic,
            keyword_count: 45,
            top_10_keywords: 9,
        }
    }

    pub fn pages() -> Vec<PageRecord> {
        vec![
            Self::page("/pricing", 640.0),
            Self::page("/blog/fit-guide", 210.0),
        ]
    }
}

/// Builds snapshots directly, for pre-seeding the store.
pub struct SnapshotFixture;

impl SnapshotFixture {
    /// A snapshot that is fresh right now.
    pub fn fresh<T: serde::Serialize>(key: SnapshotKey, payload: &T) -> Snapshot {
        Snapshot::build(
            key,
            serde_json::to_value(payload).expect("fixture payload should serialize"),
            Utc::now(),
        )
    }

    /// A snapshot well past its freshness boundary.
    pub fn stale<T: serde::Serialize>(key: SnapshotKey, payload: &T) -> Snapshot {
        let written = Utc::now() - Duration::days(30);
        Snapshot {
            key,
            payload: serde_json::to_value(payload).expect("fixture payload should serialize"),
            data_updated_at: written,
            expires_at: written + Duration::hours(24),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranklens_core::ids::WebsiteId;
    use ranklens_core::snapshot::Dimension;

    #[test]
    fn test_website_fixture_is_us_market() {
        let website = WebsiteFixture::owned_by(UserId::new());
        assert_eq!(website.domain, "example.com");
        assert_eq!(website.region.as_deref(), Some("us"));
    }

    #[test]
    fn test_fresh_snapshot_is_fresh() {
        let key = SnapshotKey::new(WebsiteId::new(), Dimension::Overview);
        let snapshot = SnapshotFixture::fresh(key, &PayloadFixture::overview());
        assert!(snapshot.is_fresh(Utc::now()));
    }

    #[test]
    fn test_stale_snapshot_is_not_fresh() {
        let key = SnapshotKey::new(WebsiteId::new(), Dimension::Overview);
        let snapshot = SnapshotFixture::stale(key, &PayloadFixture::overview());
        assert!(!snapshot.is_fresh(Utc::now()));
    }
}

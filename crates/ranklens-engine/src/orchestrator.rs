//! Fetch-or-refresh orchestration across the six SEO data dimensions.
//!
//! One generic algorithm serves every dimension: check for a fresh snapshot,
//! refresh from the provider on a miss, fall back to stale data when the
//! provider misbehaves, and hand back an empty payload when there is nothing
//! at all. Dimensions differ only in their key shape, provider call and
//! post-processing.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use ranklens_core::locations::{self, Location};
use ranklens_core::normalize;
use ranklens_core::ports::{KeywordRowStore, SeoProvider, SnapshotStore, WebsiteRepository};
use ranklens_core::records::{
    CompetitorIntersection, CompetitorRecord, DomainOverview, IntersectionRecord, KeywordRecord,
    PageRecord, RankHistoryPoint,
};
use ranklens_core::snapshot::{Dimension, Fetched, MonthRange, Snapshot, SnapshotKey};
use ranklens_core::website::Website;
use ranklens_core::{Error, ProviderError, ProviderResult, Result, UserId, WebsiteId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::guard::authorize_website;

/// How many records one provider refresh pulls, per dimension. The caller's
/// `limit` is applied on top of the stored list at serve time, so a single
/// cached payload covers every request size up to this depth.
const KEYWORD_FETCH_DEPTH: u32 = 100;
const COMPETITOR_FETCH_DEPTH: u32 = 25;
const INTERSECTION_FETCH_DEPTH: u32 = 50;
const PAGE_FETCH_DEPTH: u32 = 50;

/// Upper bound on the intersection fan-out; each competitor is one
/// provider call on a cold cache.
const MAX_INTERSECTION_COMPETITORS: usize = 10;

/// The service facade over websites, snapshots, keyword rows and the
/// upstream provider. Cloneable via the shared ports; all state lives
/// behind them.
pub struct SeoEngine {
    websites: Arc<dyn WebsiteRepository>,
    snapshots: Arc<dyn SnapshotStore>,
    keyword_rows: Arc<dyn KeywordRowStore>,
    provider: Arc<dyn SeoProvider>,
}

impl SeoEngine {
    pub fn new(
        websites: Arc<dyn WebsiteRepository>,
        snapshots: Arc<dyn SnapshotStore>,
        keyword_rows: Arc<dyn KeywordRowStore>,
        provider: Arc<dyn SeoProvider>,
    ) -> Self {
        Self {
            websites,
            snapshots,
            keyword_rows,
            provider,
        }
    }

    /// Headline metrics for the website's domain.
    pub async fn overview(
        &self,
        caller: UserId,
        website_id: WebsiteId,
        region: Option<&str>,
    ) -> Result<Fetched<DomainOverview>> {
        let website = authorize_website(self.websites.as_ref(), caller, website_id).await?;
        let location = market(&website, region);
        let key = SnapshotKey::new(website.id, Dimension::Overview);

        self.fetch_or_refresh(
            key,
            DomainOverview::default(),
            || self.provider.domain_overview(&website.domain, location),
            |data| data,
        )
        .await
    }

    /// Keywords the website ranks for, by search volume. A live refresh also
    /// rewrites the website's flattened keyword rows.
    pub async fn keywords(
        &self,
        caller: UserId,
        website_id: WebsiteId,
        region: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Fetched<Vec<KeywordRecord>>> {
        let website = authorize_website(self.websites.as_ref(), caller, website_id).await?;
        let limit = check_limit(limit)?;
        let location = market(&website, region);
        let key = SnapshotKey::new(website.id, Dimension::Keywords);

        let fetched = self
            .fetch_or_refresh(
                key,
                Vec::new(),
                || {
                    self.provider
                        .ranked_keywords(&website.domain, location, KEYWORD_FETCH_DEPTH)
                },
                tidy_keywords,
            )
            .await?;

        if !fetched.cached {
            self.keyword_rows.replace(website.id, &fetched.data).await?;
        }

        Ok(clip(fetched, limit))
    }

    /// Domains competing for the website's keywords.
    pub async fn competitors(
        &self,
        caller: UserId,
        website_id: WebsiteId,
        region: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Fetched<Vec<CompetitorRecord>>> {
        let website = authorize_website(self.websites.as_ref(), caller, website_id).await?;
        let limit = check_limit(limit)?;
        let location = market(&website, region);
        let key = SnapshotKey::new(website.id, Dimension::Competitors);

        let fetched = self
            .fetch_or_refresh(
                key,
                Vec::new(),
                || {
                    self.provider
                        .competitors(&website.domain, location, COMPETITOR_FETCH_DEPTH)
                },
                tidy_competitors,
            )
            .await?;

        Ok(clip(fetched, limit))
    }

    /// Shared keywords against each requested competitor, fanned out
    /// concurrently. Every competitor resolves through its own snapshot key,
    /// so entries in one response can mix live and cached data.
    pub async fn intersection(
        &self,
        caller: UserId,
        website_id: WebsiteId,
        competitors: &[String],
        region: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Fetched<Vec<CompetitorIntersection>>> {
        let website = authorize_website(self.websites.as_ref(), caller, website_id).await?;
        let limit = check_limit(limit)?;
        let targets = competitor_targets(competitors)?;
        let location = market(&website, region);

        let lookups = targets.into_iter().map(|competitor| {
            let key = SnapshotKey::scoped(website.id, Dimension::Intersection, competitor.clone());
            let domain = website.domain.clone();
            async move {
                let fetched = self
                    .fetch_or_refresh(
                        key,
                        Vec::new(),
                        || {
                            self.provider.domain_intersection(
                                &domain,
                                &competitor,
                                location,
                                INTERSECTION_FETCH_DEPTH,
                            )
                        },
                        tidy_intersections,
                    )
                    .await?;
                let fetched = clip(fetched, limit);
                Ok::<_, Error>(CompetitorIntersection {
                    competitor,
                    keywords: fetched.data,
                    cached: fetched.cached,
                })
            }
        });

        let entries = try_join_all(lookups).await?;
        let cached = entries.iter().all(|entry| entry.cached);
        Ok(Fetched { data: entries, cached })
    }

    /// Monthly rank distribution over an inclusive month range. The
    /// normalized range is the snapshot's secondary key, so distinct windows
    /// cache independently.
    pub async fn history(
        &self,
        caller: UserId,
        website_id: WebsiteId,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Fetched<Vec<RankHistoryPoint>>> {
        let website = authorize_website(self.websites.as_ref(), caller, website_id).await?;
        let range = MonthRange::resolve(from, to, Utc::now().date_naive())?;
        let location = market(&website, None);
        let key = SnapshotKey::scoped(website.id, Dimension::HistoricalRank, range.to_string());

        self.fetch_or_refresh(
            key,
            Vec::new(),
            || self.provider.rank_history(&website.domain, location, range),
            move |points| tidy_history(points, range),
        )
        .await
    }

    /// The website's strongest pages. Page sets differ sharply between
    /// markets, so the resolved location code is part of the snapshot key.
    pub async fn pages(
        &self,
        caller: UserId,
        website_id: WebsiteId,
        region: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Fetched<Vec<PageRecord>>> {
        let website = authorize_website(self.websites.as_ref(), caller, website_id).await?;
        let limit = check_limit(limit)?;
        let location = market(&website, region);
        let key = SnapshotKey::scoped(
            website.id,
            Dimension::RelevantPages,
            location.code.to_string(),
        );

        let fetched = self
            .fetch_or_refresh(
                key,
                Vec::new(),
                || {
                    self.provider
                        .relevant_pages(&website.domain, location, PAGE_FETCH_DEPTH)
                },
                tidy_pages,
            )
            .await?;

        Ok(clip(fetched, limit))
    }

    /// The shared cache-aside sequence.
    ///
    /// Fresh snapshot → serve it. Miss → provider, post-process, persist,
    /// serve live. Provider failure → any stored snapshot, however stale,
    /// else the dimension's empty payload. Provider trouble never escapes
    /// as an error here; store and decode problems do.
    async fn fetch_or_refresh<T, F, Fut, P>(
        &self,
        key: SnapshotKey,
        empty: T,
        fetch: F,
        post: P,
    ) -> Result<Fetched<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
        P: FnOnce(T) -> T,
    {
        let now = Utc::now();

        if let Some(snapshot) = self.snapshots.find_fresh(&key, now).await? {
            debug!(
                website_id = %key.website_id,
                dimension = %key.dimension,
                cached = true,
                "serving fresh snapshot"
            );
            return decode(snapshot).map(Fetched::from_cache);
        }

        match fetch().await {
            Ok(raw) => {
                let data = post(raw);
                let snapshot = Snapshot::build(key.clone(), serde_json::to_value(&data)?, now);
                self.snapshots.upsert(&snapshot).await?;
                info!(
                    website_id = %key.website_id,
                    dimension = %key.dimension,
                    cached = false,
                    "refreshed snapshot from provider"
                );
                Ok(Fetched::from_provider(data))
            }
            Err(err) => {
                match &err {
                    ProviderError::Timeout => warn!(
                        website_id = %key.website_id,
                        dimension = %key.dimension,
                        "provider timed out, falling back to stored data"
                    ),
                    other => error!(
                        website_id = %key.website_id,
                        dimension = %key.dimension,
                        error = %other,
                        "provider failed, falling back to stored data"
                    ),
                }
                match self.snapshots.find_any(&key).await? {
                    Some(snapshot) => {
                        info!(
                            website_id = %key.website_id,
                            dimension = %key.dimension,
                            cached = true,
                            data_updated_at = %snapshot.data_updated_at,
                            "serving stale snapshot"
                        );
                        decode(snapshot).map(Fetched::from_cache)
                    }
                    None => {
                        info!(
                            website_id = %key.website_id,
                            dimension = %key.dimension,
                            cached = true,
                            "nothing stored for key, serving empty payload"
                        );
                        Ok(Fetched::from_cache(empty))
                    }
                }
            }
        }
    }
}

/// Resolve the market for a request: an explicit region parameter wins over
/// the website's stored region, and unknown values fall back to the default
/// market inside the lookup.
fn market(website: &Website, region: Option<&str>) -> Location {
    locations::lookup(region.or(website.region.as_deref()))
}

fn decode<T: DeserializeOwned>(snapshot: Snapshot) -> Result<T> {
    serde_json::from_value(snapshot.payload).map_err(Error::from)
}

fn check_limit(limit: Option<u32>) -> Result<Option<u32>> {
    match limit {
        Some(0) => Err(Error::InvalidRequest("limit must be at least 1".into())),
        other => Ok(other),
    }
}

fn clip<T>(mut fetched: Fetched<Vec<T>>, limit: Option<u32>) -> Fetched<Vec<T>> {
    if let Some(limit) = limit {
        fetched.data.truncate(limit as usize);
    }
    fetched
}

/// Canonicalize the requested competitor domains: trim, lowercase, drop
/// blanks and duplicates, keep request order.
fn competitor_targets(raw: &[String]) -> Result<Vec<String>> {
    let mut targets: Vec<String> = Vec::new();
    for entry in raw {
        let domain = entry.trim().to_ascii_lowercase();
        if domain.is_empty() {
            continue;
        }
        if !targets.contains(&domain) {
            targets.push(domain);
        }
    }
    if targets.is_empty() {
        return Err(Error::InvalidRequest(
            "at least one competitor domain is required".into(),
        ));
    }
    if targets.len() > MAX_INTERSECTION_COMPETITORS {
        return Err(Error::InvalidRequest(format!(
            "at most {MAX_INTERSECTION_COMPETITORS} competitor domains per request"
        )));
    }
    Ok(targets)
}

/// Repair keyword text, drop records that do not survive normalization, and
/// restore the canonical order. When two records normalize to the same
/// keyword the higher-volume one stands.
fn tidy_keywords(records: Vec<KeywordRecord>) -> Vec<KeywordRecord> {
    let mut cleaned: Vec<KeywordRecord> = Vec::with_capacity(records.len());
    for mut record in records {
        match normalize::clean_keyword(&record.keyword) {
            Some(keyword) => {
                record.keyword = keyword;
                cleaned.push(record);
            }
            None => debug!(keyword = %record.keyword, "dropping keyword rejected by normalization"),
        }
    }
    cleaned.sort_by(|a, b| {
        b.search_volume
            .cmp(&a.search_volume)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    let mut seen = HashSet::new();
    cleaned.retain(|record| seen.insert(record.keyword.clone()));
    cleaned
}

fn tidy_intersections(records: Vec<IntersectionRecord>) -> Vec<IntersectionRecord> {
    let mut cleaned: Vec<IntersectionRecord> = Vec::with_capacity(records.len());
    for mut record in records {
        match normalize::clean_keyword(&record.keyword) {
            Some(keyword) => {
                record.keyword = keyword;
                cleaned.push(record);
            }
            None => debug!(keyword = %record.keyword, "dropping keyword rejected by normalization"),
        }
    }
    cleaned.sort_by(|a, b| {
        b.search_volume
            .cmp(&a.search_volume)
            .then_with(|| a.keyword.cmp(&b.keyword))
    });
    let mut seen = HashSet::new();
    cleaned.retain(|record| seen.insert(record.keyword.clone()));
    cleaned
}

/// Competitors ordered by how many keywords they share with the website.
fn tidy_competitors(records: Vec<CompetitorRecord>) -> Vec<CompetitorRecord> {
    let mut cleaned: Vec<CompetitorRecord> = records
        .into_iter()
        .filter(|record| !record.domain.trim().is_empty())
        .collect();
    cleaned.sort_by(|a, b| {
        b.common_keywords
            .cmp(&a.common_keywords)
            .then_with(|| b.organic_traffic.total_cmp(&a.organic_traffic))
    });
    let mut seen = HashSet::new();
    cleaned.retain(|record| seen.insert(record.domain.to_ascii_lowercase()));
    cleaned
}

/// Keep points inside the requested range, oldest month first. Providers
/// occasionally pad the window with months outside the asked bounds.
fn tidy_history(points: Vec<RankHistoryPoint>, range: MonthRange) -> Vec<RankHistoryPoint> {
    let mut kept: Vec<RankHistoryPoint> = points
        .into_iter()
        .filter(|point| month_start(&point.month).is_some_and(|date| range.contains(date)))
        .collect();
    kept.sort_by(|a, b| a.month.cmp(&b.month));
    kept.dedup_by(|a, b| a.month == b.month);
    kept
}

fn month_start(month: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").ok()
}

fn tidy_pages(records: Vec<PageRecord>) -> Vec<PageRecord> {
    let mut cleaned: Vec<PageRecord> = records
        .into_iter()
        .filter(|record| !record.page.trim().is_empty())
        .collect();
    cleaned.sort_by(|a, b| {
        b.organic_traffic
            .total_cmp(&a.organic_traffic)
            .then_with(|| a.page.cmp(&b.page))
    });
    let mut seen = HashSet::new();
    cleaned.retain(|record| seen.insert(record.page.clone()));
    cleaned
}

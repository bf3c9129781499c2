//! In-memory fakes for the engine's ports.
//!
//! Every fake counts the calls that matter so tests can assert on side
//! effects (or their absence), not just return values.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ranklens_core::error::{ProviderError, ProviderResult, Result};
use ranklens_core::ids::WebsiteId;
use ranklens_core::locations::Location;
use ranklens_core::ports::{KeywordRowStore, SeoProvider, SnapshotStore, WebsiteRepository};
use ranklens_core::records::{
    CompetitorRecord, DomainOverview, IntersectionRecord, KeywordRecord, PageRecord,
    RankHistoryPoint,
};
use ranklens_core::snapshot::{MonthRange, Snapshot, SnapshotKey};
use ranklens_core::website::Website;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Website repository over a HashMap.
#[derive(Default)]
pub struct MemoryWebsites {
    rows: Mutex<HashMap<WebsiteId, Website>>,
}

impl MemoryWebsites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a website without going through the trait.
    pub fn insert(&self, website: Website) {
        self.rows.lock().unwrap().insert(website.id, website);
    }
}

#[async_trait]
impl WebsiteRepository for MemoryWebsites {
    async fn create(&self, website: &Website) -> Result<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(website.id, website.clone());
        Ok(())
    }

    async fn get(&self, id: WebsiteId) -> Result<Option<Website>> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }
}

/// Snapshot store over a HashMap, with read and write accounting.
#[derive(Default)]
pub struct MemorySnapshots {
    rows: Mutex<HashMap<SnapshotKey, Snapshot>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a snapshot directly, bypassing the counters.
    pub fn seed(&self, snapshot: Snapshot) {
        self.rows
            .lock()
            .unwrap()
            .insert(snapshot.key.clone(), snapshot);
    }

    pub fn get(&self, key: &SnapshotKey) -> Option<Snapshot> {
        self.rows.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total `find_fresh` + `find_any` calls.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshots {
    async fn find_fresh(&self, key: &SnapshotKey, now: DateTime<Utc>) -> Result<Option<Snapshot>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(key)
            .filter(|s| s.is_fresh(now))
            .cloned())
    }

    async fn find_any(&self, key: &SnapshotKey) -> Result<Option<Snapshot>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().unwrap().get(key).cloned())
    }

    async fn upsert(&self, snapshot: &Snapshot) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .insert(snapshot.key.clone(), snapshot.clone());
        Ok(())
    }
}

/// Keyword row store over a HashMap keyed by website.
#[derive(Default)]
pub struct MemoryKeywordRows {
    rows: Mutex<HashMap<WebsiteId, Vec<KeywordRecord>>>,
    replaces: AtomicUsize,
}

impl MemoryKeywordRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `replace` ran.
    pub fn replaces(&self) -> usize {
        self.replaces.load(Ordering::SeqCst)
    }

    /// Current rows for a website, in insertion order.
    pub fn rows_for(&self, website_id: WebsiteId) -> Vec<KeywordRecord> {
        self.rows
            .lock()
            .unwrap()
            .get(&website_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl KeywordRowStore for MemoryKeywordRows {
    async fn replace(&self, website_id: WebsiteId, records: &[KeywordRecord]) -> Result<()> {
        self.replaces.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .insert(website_id, records.to_vec());
        Ok(())
    }

    async fn list(&self, website_id: WebsiteId) -> Result<Vec<KeywordRecord>> {
        let mut records = self.rows_for(website_id);
        records.sort_by(|a, b| b.search_volume.cmp(&a.search_volume));
        Ok(records)
    }

    async fn website_ids(&self) -> Result<Vec<WebsiteId>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(id, _)| *id)
            .collect())
    }

    async fn rename(&self, website_id: WebsiteId, from: &str, to: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(records) = rows.get_mut(&website_id)
            && let Some(record) = records.iter_mut().find(|r| r.keyword == from)
        {
            record.keyword = to.to_string();
        }
        Ok(())
    }

    async fn remove(&self, website_id: WebsiteId, keyword: &str) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(records) = rows.get_mut(&website_id) {
            records.retain(|r| r.keyword != keyword);
        }
        Ok(())
    }
}

/// Failure mode for [`FakeProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailure {
    Timeout,
    Network,
    Upstream,
}

/// Scripted SEO provider.
///
/// Serves canned payloads per dimension until a failure mode is armed,
/// and records the call count plus the last location and depth it was
/// asked for.
#[derive(Default)]
pub struct FakeProvider {
    pub overview: Mutex<DomainOverview>,
    pub keywords: Mutex<Vec<KeywordRecord>>,
    pub competitors: Mutex<Vec<CompetitorRecord>>,
    pub intersections: Mutex<HashMap<String, Vec<IntersectionRecord>>>,
    pub history: Mutex<Vec<RankHistoryPoint>>,
    pub pages: Mutex<Vec<PageRecord>>,
    failure: Mutex<Option<ProviderFailure>>,
    calls: AtomicUsize,
    last_location: Mutex<Option<Location>>,
    last_depth: Mutex<Option<u32>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `failure`.
    pub fn fail_with(&self, failure: ProviderFailure) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    /// Clear the failure mode; subsequent calls succeed again.
    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Location of the most recent call, if any.
    pub fn last_location(&self) -> Option<Location> {
        *self.last_location.lock().unwrap()
    }

    /// Row limit of the most recent list call, if any.
    pub fn last_depth(&self) -> Option<u32> {
        *self.last_depth.lock().unwrap()
    }

    fn outcome<T>(&self, location: Location, depth: Option<u32>, value: T) -> ProviderResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_location.lock().unwrap() = Some(location);
        *self.last_depth.lock().unwrap() = depth;
        match *self.failure.lock().unwrap() {
            Some(ProviderFailure::Timeout) => Err(ProviderError::Timeout),
            Some(ProviderFailure::Network) => {
                Err(ProviderError::Network("connection reset".into()))
            }
            Some(ProviderFailure::Upstream) => Err(ProviderError::Upstream {
                code: 50000,
                message: "Internal Error.".into(),
            }),
            None => Ok(value),
        }
    }
}

#[async_trait]
impl SeoProvider for FakeProvider {
    async fn domain_overview(
        &self,
        _domain: &str,
        location: Location,
    ) -> ProviderResult<DomainOverview> {
        let value = self.overview.lock().unwrap().clone();
        self.outcome(location, None, value)
    }

    async fn ranked_keywords(
        &self,
        _domain: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<KeywordRecord>> {
        let value = self.keywords.lock().unwrap().clone();
        self.outcome(location, Some(limit), value)
    }

    async fn competitors(
        &self,
        _domain: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<CompetitorRecord>> {
        let value = self.competitors.lock().unwrap().clone();
        self.outcome(location, Some(limit), value)
    }

    async fn domain_intersection(
        &self,
        _domain: &str,
        competitor: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<IntersectionRecord>> {
        let value = self
            .intersections
            .lock()
            .unwrap()
            .get(competitor)
            .cloned()
            .unwrap_or_default();
        self.outcome(location, Some(limit), value)
    }

    async fn rank_history(
        &self,
        _domain: &str,
        location: Location,
        _range: MonthRange,
    ) -> ProviderResult<Vec<RankHistoryPoint>> {
        let value = self.history.lock().unwrap().clone();
        self.outcome(location, None, value)
    }

    async fn relevant_pages(
        &self,
        _domain: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<PageRecord>> {
        let value = self.pages.lock().unwrap().clone();
        self.outcome(location, Some(limit), value)
    }
}

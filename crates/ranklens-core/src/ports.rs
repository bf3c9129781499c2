//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the core domain and external
//! adapters: the database on one side, SEO data providers on the other.

use crate::error::{ProviderResult, Result};
use crate::ids::WebsiteId;
use crate::locations::Location;
use crate::records::{
    CompetitorRecord, DomainOverview, IntersectionRecord, KeywordRecord, PageRecord,
    RankHistoryPoint,
};
use crate::snapshot::{MonthRange, Snapshot, SnapshotKey};
use crate::website::Website;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository for tracked websites.
///
/// Website CRUD lives elsewhere in the product; the engine only needs to
/// create rows (fixtures, provisioning) and resolve IDs for the ownership
/// check.
#[async_trait]
pub trait WebsiteRepository: Send + Sync {
    /// Persist a new website.
    async fn create(&self, website: &Website) -> Result<()>;

    /// Get a website by ID.
    async fn get(&self, id: WebsiteId) -> Result<Option<Website>>;
}

/// Persistent store for provider data snapshots.
///
/// One live row per [`SnapshotKey`]; refreshes update in place.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Get the entry for `key` if one exists and is still fresh at `now`.
    async fn find_fresh(&self, key: &SnapshotKey, now: DateTime<Utc>) -> Result<Option<Snapshot>>;

    /// Get the entry for `key` regardless of freshness (stale reads allowed).
    async fn find_any(&self, key: &SnapshotKey) -> Result<Option<Snapshot>>;

    /// Insert or replace the entry for the snapshot's key.
    ///
    /// Must be a single atomic conflict-resolving write: concurrent
    /// refreshes of the same key race safely, last writer wins.
    async fn upsert(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Store for the flattened per-website keyword rows that mirror the
/// `keywords` snapshot payload.
#[async_trait]
pub trait KeywordRowStore: Send + Sync {
    /// Replace every keyword row for a website with `records`.
    async fn replace(&self, website_id: WebsiteId, records: &[KeywordRecord]) -> Result<()>;

    /// List a website's keyword rows, highest search volume first.
    async fn list(&self, website_id: WebsiteId) -> Result<Vec<KeywordRecord>>;

    /// Distinct website IDs that currently have keyword rows.
    async fn website_ids(&self) -> Result<Vec<WebsiteId>>;

    /// Rename one keyword row in place.
    async fn rename(&self, website_id: WebsiteId, from: &str, to: &str) -> Result<()>;

    /// Delete one keyword row.
    async fn remove(&self, website_id: WebsiteId, keyword: &str) -> Result<()>;
}

/// Upstream SEO data source.
///
/// Implementations return data already shaped into domain records; no
/// provider envelope leaks past this boundary. Every call is bounded by
/// the adapter's request timeout.
#[async_trait]
pub trait SeoProvider: Send + Sync {
    /// Headline metrics for a domain.
    async fn domain_overview(
        &self,
        domain: &str,
        location: Location,
    ) -> ProviderResult<DomainOverview>;

    /// Keywords the domain ranks for, by search volume.
    async fn ranked_keywords(
        &self,
        domain: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<KeywordRecord>>;

    /// Domains competing for the same keywords.
    async fn competitors(
        &self,
        domain: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<CompetitorRecord>>;

    /// Keywords shared between the domain and one competitor.
    async fn domain_intersection(
        &self,
        domain: &str,
        competitor: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<IntersectionRecord>>;

    /// Monthly rank distribution over a month range.
    async fn rank_history(
        &self,
        domain: &str,
        location: Location,
        range: MonthRange,
    ) -> ProviderResult<Vec<RankHistoryPoint>>;

    /// The domain's strongest pages by organic value.
    async fn relevant_pages(
        &self,
        domain: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<PageRecord>>;
}

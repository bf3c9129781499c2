//! Snapshot types.
//!
//! A snapshot is one cached provider payload for one website along a single
//! data dimension. Snapshots are keyed by [`SnapshotKey`] and carry their own
//! expiry so freshness can be decided without consulting provider state.

use crate::error::{Error, Result};
use crate::ids::WebsiteId;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of SEO data we cache per website.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Overview,
    Keywords,
    Competitors,
    Intersection,
    HistoricalRank,
    RelevantPages,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Overview,
        Dimension::Keywords,
        Dimension::Competitors,
        Dimension::Intersection,
        Dimension::HistoricalRank,
        Dimension::RelevantPages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Overview => "overview",
            Dimension::Keywords => "keywords",
            Dimension::Competitors => "competitors",
            Dimension::Intersection => "intersection",
            Dimension::HistoricalRank => "historical_rank",
            Dimension::RelevantPages => "relevant_pages",
        }
    }

    /// How long a stored snapshot of this dimension stays fresh.
    ///
    /// Fast-moving dimensions refresh daily; slow-moving ones weekly.
    pub fn ttl(&self) -> Duration {
        match self {
            Dimension::Overview | Dimension::Keywords | Dimension::RelevantPages => {
                Duration::hours(24)
            }
            Dimension::Competitors | Dimension::Intersection | Dimension::HistoricalRank => {
                Duration::days(7)
            }
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "overview" => Ok(Dimension::Overview),
            "keywords" => Ok(Dimension::Keywords),
            "competitors" => Ok(Dimension::Competitors),
            "intersection" => Ok(Dimension::Intersection),
            "historical_rank" | "history" => Ok(Dimension::HistoricalRank),
            "relevant_pages" | "pages" => Ok(Dimension::RelevantPages),
            other => Err(format!("unknown dimension: {other}")),
        }
    }
}

/// Identity of one cached payload.
///
/// `secondary` narrows dimensions that hold several payloads per website,
/// e.g. one intersection snapshot per competitor domain or one historical
/// snapshot per month range. Dimensions with a single payload leave it unset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotKey {
    pub website_id: WebsiteId,
    pub dimension: Dimension,
    pub secondary: Option<String>,
}

impl SnapshotKey {
    pub fn new(website_id: WebsiteId, dimension: Dimension) -> Self {
        Self {
            website_id,
            dimension,
            secondary: None,
        }
    }

    pub fn scoped(
        website_id: WebsiteId,
        dimension: Dimension,
        secondary: impl Into<String>,
    ) -> Self {
        Self {
            website_id,
            dimension,
            secondary: Some(secondary.into()),
        }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.secondary {
            Some(secondary) => write!(f, "{}/{}/{}", self.website_id, self.dimension, secondary),
            None => write!(f, "{}/{}", self.website_id, self.dimension),
        }
    }
}

/// One stored provider payload plus its freshness bookkeeping.
///
/// `data_updated_at` records when the provider last supplied the payload;
/// `expires_at` is the freshness boundary derived from the dimension TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub key: SnapshotKey,
    pub payload: serde_json::Value,
    pub data_updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Snapshot {
    /// Wrap a freshly fetched payload, stamping expiry from the dimension TTL.
    pub fn build(key: SnapshotKey, payload: serde_json::Value, now: DateTime<Utc>) -> Self {
        let expires_at = now + key.dimension.ttl();
        Self {
            key,
            payload,
            data_updated_at: now,
            expires_at,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// A payload plus the flag saying whether it came out of the cache.
///
/// `cached` is true for fresh hits, stale fallbacks, and the empty payload
/// served when nothing was ever stored; it is false only when the data came
/// straight off a live provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fetched<T> {
    pub data: T,
    pub cached: bool,
}

impl<T> Fetched<T> {
    pub fn from_provider(data: T) -> Self {
        Self {
            data,
            cached: false,
        }
    }

    pub fn from_cache(data: T) -> Self {
        Self { data, cached: true }
    }
}

/// An inclusive range of calendar months, normalized to month precision.
///
/// Serves both as the historical-rank cache key (via [`fmt::Display`],
/// e.g. `2024-09..2025-08`) and as the provider query bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl MonthRange {
    /// Months of history requested when the caller gives no bounds.
    pub const DEFAULT_MONTHS: u32 = 12;

    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        let from = first_of_month(from);
        let to = first_of_month(to);
        if from > to {
            return Err(Error::InvalidRequest(format!(
                "month range starts after it ends: {} > {}",
                from.format("%Y-%m"),
                to.format("%Y-%m"),
            )));
        }
        Ok(Self { from, to })
    }

    /// Resolve optional `YYYY-MM` query bounds against today's date.
    ///
    /// Missing `to` means the current month; missing `from` means
    /// [`Self::DEFAULT_MONTHS`] ending at `to`.
    pub fn resolve(from: Option<&str>, to: Option<&str>, today: NaiveDate) -> Result<Self> {
        let to = match to {
            Some(raw) => parse_month(raw)?,
            None => first_of_month(today),
        };
        let from = match from {
            Some(raw) => parse_month(raw)?,
            None => to
                .checked_sub_months(Months::new(Self::DEFAULT_MONTHS - 1))
                .unwrap_or(to),
        };
        Self::new(from, to)
    }

    /// First day of the starting month.
    pub fn start(&self) -> NaiveDate {
        self.from
    }

    /// Last day of the ending month.
    pub fn end(&self) -> NaiveDate {
        self.to
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.to)
    }

    /// True when `month` (any day within it) falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let month = first_of_month(date);
        self.from <= month && month <= self.to
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.from.format("%Y-%m"),
            self.to.format("%Y-%m")
        )
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn parse_month(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .map_err(|_| Error::InvalidRequest(format!("invalid month '{raw}', expected YYYY-MM")))
}

//! DataForSEO Labs adapter.
//!
//! Speaks the Labs "live" task protocol: one POST per request carrying a
//! single-task array, HTTP Basic auth, and a nested envelope coming back.

pub(crate) mod wire;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use ranklens_core::error::{Error, ProviderError, ProviderResult, Result};
use ranklens_core::locations::Location;
use ranklens_core::ports::SeoProvider;
use ranklens_core::records::{
    CompetitorRecord, DomainOverview, IntersectionRecord, KeywordRecord, PageRecord,
    RankHistoryPoint,
};
use ranklens_core::snapshot::MonthRange;
use reqwest::{Client, StatusCode, header};
use std::time::Duration;
use tracing::debug;

/// Configuration for the DataForSEO client.
#[derive(Debug, Clone)]
pub struct DataForSeoConfig {
    /// API root, overridable for tests.
    pub base_url: String,
    pub login: String,
    pub password: String,
    /// Per-request timeout (default: 30s).
    pub timeout: Duration,
}

impl Default for DataForSeoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.dataforseo.com".to_string(),
            login: String::new(),
            password: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// DataForSEO Labs client implementing the `SeoProvider` port.
pub struct DataForSeo {
    http: Client,
    base_url: String,
    auth: String,
}

impl DataForSeo {
    /// Build a client from configuration.
    pub fn new(config: DataForSeoConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Config(format!("failed to build provider HTTP client: {e}")))?;

        let credentials = STANDARD.encode(format!("{}:{}", config.login, config.password));

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth: format!("Basic {credentials}"),
        })
    }

    /// POST one task to a Labs endpoint and unwrap the response envelope.
    async fn call<T>(&self, endpoint: &str, task: serde_json::Value) -> ProviderResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let url = format!(
            "{}/v3/dataforseo_labs/google/{}/live",
            self.base_url, endpoint
        );
        debug!(%url, "provider request");

        let response = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, &self.auth)
            .json(&serde_json::json!([task]))
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: wire::Envelope<T> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::Malformed(e.to_string())
            }
        })?;

        envelope.into_items()
    }
}

fn map_transport(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(err.to_string())
    }
}

#[async_trait]
impl SeoProvider for DataForSeo {
    async fn domain_overview(
        &self,
        domain: &str,
        location: Location,
    ) -> ProviderResult<DomainOverview> {
        let task = serde_json::json!({
            "target": domain,
            "location_code": location.code,
            "language_code": location.language,
        });
        let items: Vec<wire::OverviewItem> = self.call("domain_rank_overview", task).await?;
        // No items means the provider has never seen the domain; that is an
        // empty answer, not a failure.
        Ok(items
            .into_iter()
            .next()
            .map(wire::OverviewItem::into_record)
            .unwrap_or_default())
    }

    async fn ranked_keywords(
        &self,
        domain: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<KeywordRecord>> {
        let task = serde_json::json!({
            "target": domain,
            "location_code": location.code,
            "language_code": location.language,
            "limit": limit,
            "order_by": ["keyword_data.keyword_info.search_volume,desc"],
        });
        let items: Vec<wire::RankedKeywordItem> = self.call("ranked_keywords", task).await?;
        Ok(items
            .into_iter()
            .map(wire::RankedKeywordItem::into_record)
            .collect())
    }

    async fn competitors(
        &self,
        domain: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<CompetitorRecord>> {
        let task = serde_json::json!({
            "target": domain,
            "location_code": location.code,
            "language_code": location.language,
            "limit": limit,
        });
        let items: Vec<wire::CompetitorItem> = self.call("competitors_domain", task).await?;
        Ok(items
            .into_iter()
            .map(wire::CompetitorItem::into_record)
            .collect())
    }

    async fn domain_intersection(
        &self,
        domain: &str,
        competitor: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<IntersectionRecord>> {
        let task = serde_json::json!({
            "target1": domain,
            "target2": competitor,
            "location_code": location.code,
            "language_code": location.language,
            "limit": limit,
            "intersections": true,
        });
        let items: Vec<wire::IntersectionItem> = self.call("domain_intersection", task).await?;
        Ok(items
            .into_iter()
            .map(wire::IntersectionItem::into_record)
            .collect())
    }

    async fn rank_history(
        &self,
        domain: &str,
        location: Location,
        range: MonthRange,
    ) -> ProviderResult<Vec<RankHistoryPoint>> {
        let task = serde_json::json!({
            "target": domain,
            "location_code": location.code,
            "language_code": location.language,
            "date_from": range.start().format("%Y-%m-%d").to_string(),
            "date_to": range.end().format("%Y-%m-%d").to_string(),
        });
        let items: Vec<wire::HistoryItem> = self.call("historical_rank_overview", task).await?;
        Ok(items
            .into_iter()
            .map(wire::HistoryItem::into_record)
            .collect())
    }

    async fn relevant_pages(
        &self,
        domain: &str,
        location: Location,
        limit: u32,
    ) -> ProviderResult<Vec<PageRecord>> {
        let task = serde_json::json!({
            "target": domain,
            "location_code": location.code,
            "language_code": location.language,
            "limit": limit,
        });
        let items: Vec<wire::PageItem> = self.call("relevant_pages", task).await?;
        Ok(items.into_iter().map(wire::PageItem::into_record).collect())
    }
}

//! Website types.

use crate::ids::{UserId, WebsiteId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A website tracked on behalf of a user.
///
/// `domain` is the bare hostname ("example.com"), never a full URL.
/// `region` is an optional lowercase country code; lookups fall back to
/// the US market when it is absent or unrecognized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Website {
    pub id: WebsiteId,
    pub user_id: UserId,
    pub domain: String,
    pub display_name: Option<String>,
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Website {
    pub fn new(user_id: UserId, domain: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WebsiteId::new(),
            user_id,
            domain: domain.into(),
            display_name: None,
            region: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

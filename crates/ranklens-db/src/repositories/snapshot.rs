//! PostgreSQL implementation of SnapshotStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ranklens_core::ids::WebsiteId;
use ranklens_core::ports::SnapshotStore;
use ranklens_core::snapshot::{Dimension, Snapshot, SnapshotKey};
use ranklens_core::{Error, Result};
use sqlx::{PgPool, Row};
use std::str::FromStr;

/// PostgreSQL implementation of SnapshotStore.
///
/// The `secondary_key` column is never NULL; keys without a secondary
/// component store the empty string so the table's primary key covers
/// every row and the upsert has a concrete conflict target.
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    /// Create a new PgSnapshotStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn secondary_column(key: &SnapshotKey) -> &str {
        key.secondary.as_deref().unwrap_or("")
    }

    fn row_to_snapshot(&self, r: &sqlx::postgres::PgRow) -> Result<Snapshot> {
        let dimension_str: String = r.get("dimension");
        let dimension = Dimension::from_str(&dimension_str).map_err(Error::Database)?;
        let secondary: String = r.get("secondary_key");

        Ok(Snapshot {
            key: SnapshotKey {
                website_id: WebsiteId::from_uuid(r.get::<uuid::Uuid, _>("website_id")),
                dimension,
                secondary: (!secondary.is_empty()).then_some(secondary),
            },
            payload: r.get("payload"),
            data_updated_at: r.get("data_updated_at"),
            expires_at: r.get("expires_at"),
        })
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn find_fresh(&self, key: &SnapshotKey, now: DateTime<Utc>) -> Result<Option<Snapshot>> {
        let row = sqlx::query(
            r#"SELECT website_id, dimension, secondary_key, payload, data_updated_at, expires_at
               FROM seo_snapshots
               WHERE website_id = $1 AND dimension = $2 AND secondary_key = $3 AND expires_at > $4"#,
        )
        .bind(key.website_id.as_uuid())
        .bind(key.dimension.as_str())
        .bind(Self::secondary_column(key))
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(self.row_to_snapshot(&r)?)),
            None => Ok(None),
        }
    }

    async fn find_any(&self, key: &SnapshotKey) -> Result<Option<Snapshot>> {
        let row = sqlx::query(
            r#"SELECT website_id, dimension, secondary_key, payload, data_updated_at, expires_at
               FROM seo_snapshots
               WHERE website_id = $1 AND dimension = $2 AND secondary_key = $3"#,
        )
        .bind(key.website_id.as_uuid())
        .bind(key.dimension.as_str())
        .bind(Self::secondary_column(key))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(self.row_to_snapshot(&r)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, snapshot: &Snapshot) -> Result<()> {
        // Single atomic statement so concurrent refreshes of the same key
        // cannot interleave a read-modify-write. Last writer wins.
        sqlx::query(
            r#"INSERT INTO seo_snapshots (website_id, dimension, secondary_key, payload, data_updated_at, expires_at)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (website_id, dimension, secondary_key)
               DO UPDATE SET payload = EXCLUDED.payload,
                             data_updated_at = EXCLUDED.data_updated_at,
                             expires_at = EXCLUDED.expires_at"#,
        )
        .bind(snapshot.key.website_id.as_uuid())
        .bind(snapshot.key.dimension.as_str())
        .bind(Self::secondary_column(&snapshot.key))
        .bind(&snapshot.payload)
        .bind(snapshot.data_updated_at)
        .bind(snapshot.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }
}

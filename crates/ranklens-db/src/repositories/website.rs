//! PostgreSQL implementation of WebsiteRepository.

use async_trait::async_trait;
use ranklens_core::ids::{UserId, WebsiteId};
use ranklens_core::ports::WebsiteRepository;
use ranklens_core::website::Website;
use ranklens_core::{Error, Result};
use sqlx::{PgPool, Row};

/// PostgreSQL implementation of WebsiteRepository.
pub struct PgWebsiteRepository {
    pool: PgPool,
}

impl PgWebsiteRepository {
    /// Create a new PgWebsiteRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_website(&self, r: &sqlx::postgres::PgRow) -> Website {
        Website {
            id: WebsiteId::from_uuid(r.get::<uuid::Uuid, _>("id")),
            user_id: UserId::from_uuid(r.get::<uuid::Uuid, _>("user_id")),
            domain: r.get("domain"),
            display_name: r.get("display_name"),
            region: r.get("region"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }
    }
}

#[async_trait]
impl WebsiteRepository for PgWebsiteRepository {
    async fn create(&self, website: &Website) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO websites (id, user_id, domain, display_name, region, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(website.id.as_uuid())
        .bind(website.user_id.as_uuid())
        .bind(&website.domain)
        .bind(&website.display_name)
        .bind(&website.region)
        .bind(website.created_at)
        .bind(website.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, id: WebsiteId) -> Result<Option<Website>> {
        let row = sqlx::query(
            "SELECT id, user_id, domain, display_name, region, created_at, updated_at FROM websites WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(row.map(|r| self.row_to_website(&r)))
    }
}

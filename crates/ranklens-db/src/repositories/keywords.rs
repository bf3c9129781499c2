//! PostgreSQL implementation of KeywordRowStore.

use async_trait::async_trait;
use ranklens_core::ids::WebsiteId;
use ranklens_core::ports::KeywordRowStore;
use ranklens_core::records::KeywordRecord;
use ranklens_core::{Error, Result};
use sqlx::{PgPool, Row};

/// PostgreSQL implementation of KeywordRowStore.
pub struct PgKeywordRowStore {
    pool: PgPool,
}

impl PgKeywordRowStore {
    /// Create a new PgKeywordRowStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(&self, r: &sqlx::postgres::PgRow) -> KeywordRecord {
        KeywordRecord {
            keyword: r.get("keyword"),
            search_volume: r.get("search_volume"),
            rank_position: r.get("rank_position"),
            previous_rank_position: r.get("previous_rank_position"),
            cpc: r.get("cpc"),
            competition: r.get("competition"),
            difficulty: r.get("difficulty"),
        }
    }
}

#[async_trait]
impl KeywordRowStore for PgKeywordRowStore {
    async fn replace(&self, website_id: WebsiteId, records: &[KeywordRecord]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query("DELETE FROM website_keywords WHERE website_id = $1")
            .bind(website_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        for record in records {
            // Records arrive highest-volume first; on a duplicate keyword
            // the first row stands.
            sqlx::query(
                r#"INSERT INTO website_keywords
                       (website_id, keyword, search_volume, rank_position, previous_rank_position, cpc, competition, difficulty, updated_at)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
                   ON CONFLICT (website_id, keyword) DO NOTHING"#,
            )
            .bind(website_id.as_uuid())
            .bind(&record.keyword)
            .bind(record.search_volume)
            .bind(record.rank_position)
            .bind(record.previous_rank_position)
            .bind(record.cpc)
            .bind(record.competition)
            .bind(record.difficulty)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    async fn list(&self, website_id: WebsiteId) -> Result<Vec<KeywordRecord>> {
        let rows = sqlx::query(
            r#"SELECT keyword, search_volume, rank_position, previous_rank_position, cpc, competition, difficulty
               FROM website_keywords
               WHERE website_id = $1
               ORDER BY search_volume DESC, keyword ASC"#,
        )
        .bind(website_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows.iter().map(|r| self.row_to_record(r)).collect())
    }

    async fn website_ids(&self) -> Result<Vec<WebsiteId>> {
        let rows = sqlx::query("SELECT DISTINCT website_id FROM website_keywords")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|r| WebsiteId::from_uuid(r.get::<uuid::Uuid, _>("website_id")))
            .collect())
    }

    async fn rename(&self, website_id: WebsiteId, from: &str, to: &str) -> Result<()> {
        sqlx::query(
            "UPDATE website_keywords SET keyword = $3, updated_at = NOW() WHERE website_id = $1 AND keyword = $2",
        )
        .bind(website_id.as_uuid())
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, website_id: WebsiteId, keyword: &str) -> Result<()> {
        sqlx::query("DELETE FROM website_keywords WHERE website_id = $1 AND keyword = $2")
            .bind(website_id.as_uuid())
            .bind(keyword)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }
}

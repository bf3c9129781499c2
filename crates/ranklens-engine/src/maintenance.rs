//! Repair sweep over the flattened keyword rows.
//!
//! Provider payloads are normalized before they are stored, but rows written
//! before a repair rule existed can still carry artifacts. The sweep
//! re-normalizes every stored keyword: rows whose normalized form differs
//! are renamed, rows that normalize to nothing or that would collide with
//! another row for the same website are deleted. Running it twice in a row
//! is a no-op.

use std::collections::HashSet;

use ranklens_core::normalize;
use ranklens_core::ports::KeywordRowStore;
use ranklens_core::Result;
use serde::Serialize;
use tracing::{debug, info};

/// Counts from one cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub websites: usize,
    pub scanned: usize,
    pub repaired: usize,
    pub deleted: usize,
}

/// Re-normalize every stored keyword row across all websites.
///
/// A rename only happens when the target name is free; when the normalized
/// form already exists as its own row, or was claimed by an earlier rename
/// in the same sweep, the dirty row is deleted instead. The clean row's
/// metrics always win a collision.
pub async fn run_keyword_cleanup(store: &dyn KeywordRowStore) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    for website_id in store.website_ids().await? {
        report.websites += 1;
        let records = store.list(website_id).await?;
        let existing: HashSet<String> = records.iter().map(|r| r.keyword.clone()).collect();
        let mut claimed: HashSet<String> = HashSet::new();

        for record in &records {
            report.scanned += 1;

            let Some(normalized) = normalize::clean_keyword(&record.keyword) else {
                debug!(
                    website_id = %website_id,
                    keyword = %record.keyword,
                    "deleting keyword that normalizes to nothing"
                );
                store.remove(website_id, &record.keyword).await?;
                report.deleted += 1;
                continue;
            };

            if normalized == record.keyword {
                claimed.insert(normalized);
                continue;
            }

            if claimed.contains(&normalized) || existing.contains(&normalized) {
                debug!(
                    website_id = %website_id,
                    keyword = %record.keyword,
                    normalized = %normalized,
                    "deleting keyword whose normalized form collides"
                );
                store.remove(website_id, &record.keyword).await?;
                report.deleted += 1;
            } else {
                debug!(
                    website_id = %website_id,
                    keyword = %record.keyword,
                    normalized = %normalized,
                    "renaming keyword to its normalized form"
                );
                store.rename(website_id, &record.keyword, &normalized).await?;
                claimed.insert(normalized);
                report.repaired += 1;
            }
        }
    }

    info!(
        websites = report.websites,
        scanned = report.scanned,
        repaired = report.repaired,
        deleted = report.deleted,
        "keyword cleanup finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use ranklens_core::records::KeywordRecord;
    use ranklens_core::WebsiteId;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemoryRows {
        rows: Mutex<HashMap<WebsiteId, Vec<KeywordRecord>>>,
    }

    impl MemoryRows {
        fn seed(website_id: WebsiteId, records: Vec<KeywordRecord>) -> Self {
            let mut rows = HashMap::new();
            rows.insert(website_id, records);
            Self {
                rows: Mutex::new(rows),
            }
        }

        fn keywords(&self, website_id: WebsiteId) -> Vec<String> {
            let mut names: Vec<String> = self
                .rows
                .lock()
                .unwrap()
                .get(&website_id)
                .map(|records| records.iter().map(|r| r.keyword.clone()).collect())
                .unwrap_or_default();
            names.sort();
            names
        }
    }

    #[async_trait]
    impl KeywordRowStore for MemoryRows {
        async fn replace(&self, website_id: WebsiteId, records: &[KeywordRecord]) -> Result<()> {
            self.rows
                .lock()
                .unwrap()
                .insert(website_id, records.to_vec());
            Ok(())
        }

        async fn list(&self, website_id: WebsiteId) -> Result<Vec<KeywordRecord>> {
            let mut records = self
                .rows
                .lock()
                .unwrap()
                .get(&website_id)
                .cloned()
                .unwrap_or_default();
            records.sort_by(|a, b| {
                b.search_volume
                    .cmp(&a.search_volume)
                    .then_with(|| a.keyword.cmp(&b.keyword))
            });
            Ok(records)
        }

        async fn website_ids(&self) -> Result<Vec<WebsiteId>> {
            Ok(self.rows.lock().unwrap().keys().copied().collect())
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

    fn kw(name: &str, volume: i64) -> KeywordRecord {
        KeywordRecord {
            search_volume: volume,
            ..KeywordRecord::named(name)
        }
    }

    #[tokio::test]
    async fn test_cleanup_repairs_and_deletes() {
        let website_id = WebsiteId::new();
        let store = MemoryRows::seed(
            website_id,
            vec![
                kw("crm software", 1200),
                kw("051 winter boots", 900),
                kw("001-qk7yulqsx9esalil5mxjkg-3342555957 running shoes", 800),
                kw("winter boots", 400),
                kw("050", 100),
            ],
        );

        let report = run_keyword_cleanup(&store).await.unwrap();

        assert_eq!(report.websites, 1);
        assert_eq!(report.scanned, 5);
        assert_eq!(report.repaired, 1);
        assert_eq!(report.deleted, 2);
        assert_eq!(
            store.keywords(website_id),
            vec!["crm software", "running shoes", "winter boots"]
        );
    }

    #[tokio::test]
    async fn test_cleanup_colliding_repairs_keep_one_row() {
        let website_id = WebsiteId::new();
        let store = MemoryRows::seed(website_id, vec![kw("01 blue dress", 100), kw("blue dress 2", 90)]);

        let report = run_keyword_cleanup(&store).await.unwrap();

        assert_eq!(report.repaired, 1);
        assert_eq!(report.deleted, 1);
        assert_eq!(store.keywords(website_id), vec!["blue dress"]);
    }

    #[tokio::test]
    async fn test_cleanup_is_idempotent() {
        let website_id = WebsiteId::new();
        let store = MemoryRows::seed(
            website_id,
            vec![kw("051 winter boots", 900), kw("best laptop 24", 300)],
        );

        let first = run_keyword_cleanup(&store).await.unwrap();
        assert_eq!(first.repaired, 2);

        let second = run_keyword_cleanup(&store).await.unwrap();
        assert_eq!(second.repaired, 0);
        assert_eq!(second.deleted, 0);
        assert_eq!(store.keywords(website_id), vec!["best laptop", "winter boots"]);
    }
}

//! Database-backed repository tests.
//!
//! Run with: `cargo test -p ranklens-tests --test database_tests --features integration`

#![cfg(feature = "integration")]

use chrono::Utc;
use ranklens_core::ids::{UserId, WebsiteId};
use ranklens_core::ports::{KeywordRowStore, SnapshotStore, WebsiteRepository};
use ranklens_core::snapshot::{Dimension, Snapshot, SnapshotKey};
use ranklens_core::website::Website;
use ranklens_db::{Database, PgKeywordRowStore, PgSnapshotStore, PgWebsiteRepository};
use ranklens_engine::run_keyword_cleanup;
use ranklens_tests::{
    PayloadFixture, PostgresContainer, SnapshotFixture, WebsiteFixture, init_test_logging,
};
use serde_json::json;
use std::sync::Arc;

async fn setup() -> (PostgresContainer, Database) {
    init_test_logging();
    let postgres = PostgresContainer::start().await;
    let db = Database::connect(&postgres.connection_string)
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to run migrations");
    (postgres, db)
}

async fn seeded_website(db: &Database) -> Website {
    let repo = PgWebsiteRepository::new(db.pool().clone());
    let website = WebsiteFixture::owned_by(UserId::new());
    repo.create(&website)
        .await
        .expect("Failed to create website");
    website
}

async fn snapshot_count(db: &Database, website_id: WebsiteId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM seo_snapshots WHERE website_id = $1")
        .bind(website_id.as_uuid())
        .fetch_one(db.pool())
        .await
        .expect("Failed to count snapshots")
}

#[tokio::test]
async fn test_website_roundtrip() {
    let (_postgres, db) = setup().await;
    let repo = PgWebsiteRepository::new(db.pool().clone());

    let website = WebsiteFixture::owned_by(UserId::new());
    repo.create(&website)
        .await
        .expect("Failed to create website");

    let loaded = repo
        .get(website.id)
        .await
        .expect("Failed to get website")
        .expect("Website should exist");
    assert_eq!(loaded.domain, "example.com");
    assert_eq!(loaded.user_id, website.user_id);
    assert_eq!(loaded.region.as_deref(), Some("us"));

    let missing = repo
        .get(WebsiteId::new())
        .await
        .expect("Failed to query for missing website");
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_snapshot_upsert_replaces_in_place() {
    let (_postgres, db) = setup().await;
    let website = seeded_website(&db).await;
    let store = PgSnapshotStore::new(db.pool().clone());
    let key = SnapshotKey::new(website.id, Dimension::Overview);

    let first = Snapshot::build(key.clone(), json!({"organic_traffic": 100.0}), Utc::now());
    store.upsert(&first).await.expect("First upsert failed");
    let second = Snapshot::build(key.clone(), json!({"organic_traffic": 250.0}), Utc::now());
    store.upsert(&second).await.expect("Second upsert failed");

    let loaded = store
        .find_any(&key)
        .await
        .expect("Failed to load snapshot")
        .expect("Snapshot should exist");
    assert_eq!(loaded.payload["organic_traffic"], json!(250.0));
    assert_eq!(snapshot_count(&db, website.id).await, 1);
}

#[tokio::test]
async fn test_secondary_key_isolates_rows() {
    let (_postgres, db) = setup().await;
    let website = seeded_website(&db).await;
    let store = PgSnapshotStore::new(db.pool().clone());

    let unscoped = SnapshotKey::new(website.id, Dimension::Intersection);
    let rivals = SnapshotKey::scoped(website.id, Dimension::Intersection, "rivals.com");
    let challenger = SnapshotKey::scoped(website.id, Dimension::Intersection, "challenger.io");

    for (key, label) in [
        (&unscoped, "none"),
        (&rivals, "rivals"),
        (&challenger, "challenger"),
    ] {
        let snapshot = Snapshot::build(key.clone(), json!({"label": label}), Utc::now());
        store.upsert(&snapshot).await.expect("Upsert failed");
    }

    assert_eq!(snapshot_count(&db, website.id).await, 3);
    let loaded = store
        .find_any(&rivals)
        .await
        .expect("Failed to load snapshot")
        .expect("Scoped snapshot should exist");
    assert_eq!(loaded.payload["label"], json!("rivals"));
    assert_eq!(loaded.key, rivals);

    let loaded = store
        .find_any(&unscoped)
        .await
        .expect("Failed to load snapshot")
        .expect("Unscoped snapshot should exist");
    assert_eq!(loaded.key.secondary, None);
}

#[tokio::test]
async fn test_find_fresh_honors_expiry() {
    let (_postgres, db) = setup().await;
    let website = seeded_website(&db).await;
    let store = PgSnapshotStore::new(db.pool().clone());
    let key = SnapshotKey::new(website.id, Dimension::Keywords);

    let stale = SnapshotFixture::stale(key.clone(), &json!({"organic_traffic": 1.0}));
    store.upsert(&stale).await.expect("Upsert failed");

    let fresh_hit = store
        .find_fresh(&key, Utc::now())
        .await
        .expect("Failed to query fresh snapshot");
    assert!(fresh_hit.is_none());
    let any_hit = store
        .find_any(&key)
        .await
        .expect("Failed to query any snapshot");
    assert!(any_hit.is_some());

    let refreshed = SnapshotFixture::fresh(key.clone(), &json!({"organic_traffic": 2.0}));
    store.upsert(&refreshed).await.expect("Upsert failed");

    let fresh_hit = store
        .find_fresh(&key, Utc::now())
        .await
        .expect("Failed to query fresh snapshot")
        .expect("Refreshed snapshot should be fresh");
    assert_eq!(fresh_hit.payload["organic_traffic"], json!(2.0));
}

#[tokio::test]
async fn test_keyword_rows_lifecycle() {
    let (_postgres, db) = setup().await;
    let website = seeded_website(&db).await;
    let store = PgKeywordRowStore::new(db.pool().clone());

    let records = vec![
        PayloadFixture::keyword("winter boots", 9900),
        PayloadFixture::keyword("running shoes", 74000),
        PayloadFixture::keyword("trail shoes", 18100),
    ];
    store
        .replace(website.id, &records)
        .await
        .expect("Failed to replace keyword rows");

    let listed = store.list(website.id).await.expect("Failed to list rows");
    let names: Vec<&str> = listed.iter().map(|r| r.keyword.as_str()).collect();
    assert_eq!(names, vec!["running shoes", "trail shoes", "winter boots"]);

    let ids = store.website_ids().await.expect("Failed to list website ids");
    assert!(ids.contains(&website.id));

    store
        .rename(website.id, "trail shoes", "trail running shoes")
        .await
        .expect("Failed to rename row");
    store
        .remove(website.id, "winter boots")
        .await
        .expect("Failed to remove row");

    let listed = store.list(website.id).await.expect("Failed to list rows");
    let names: Vec<&str> = listed.iter().map(|r| r.keyword.as_str()).collect();
    assert_eq!(names, vec!["running shoes", "trail running shoes"]);

    store
        .replace(website.id, &[])
        .await
        .expect("Failed to clear rows");
    let listed = store.list(website.id).await.expect("Failed to list rows");
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_concurrent_upserts_leave_single_row() {
    let (_postgres, db) = setup().await;
    let website = seeded_website(&db).await;
    let store = Arc::new(PgSnapshotStore::new(db.pool().clone()));
    let key = SnapshotKey::new(website.id, Dimension::Overview);

    let mut handles = Vec::new();
    for round in 0..8 {
        let store = store.clone();
        let key = key.clone();
        handles.push(tokio::spawn(async move {
            let snapshot = Snapshot::build(key, json!({"round": round}), Utc::now());
            store.upsert(&snapshot).await
        }));
    }
    for handle in handles {
        handle
            .await
            .expect("Upsert task panicked")
            .expect("Upsert failed");
    }

    assert_eq!(snapshot_count(&db, website.id).await, 1);
    let survivor = store
        .find_any(&key)
        .await
        .expect("Failed to load snapshot")
        .expect("One snapshot should survive");
    assert!(survivor.payload["round"].is_i64());
}

#[tokio::test]
async fn test_keyword_cleanup_sweep_repairs_real_rows() {
    let (_postgres, db) = setup().await;
    let website = seeded_website(&db).await;
    let store = PgKeywordRowStore::new(db.pool().clone());

    store
        .replace(website.id, &PayloadFixture::dirty_keywords())
        .await
        .expect("Failed to seed dirty rows");

    let report = run_keyword_cleanup(&store)
        .await
        .expect("Cleanup sweep failed");
    assert_eq!(report.websites, 1);
    assert_eq!(report.scanned, 5);
    assert_eq!(report.repaired, 2);
    assert_eq!(report.deleted, 2);

    let listed = store.list(website.id).await.expect("Failed to list rows");
    let names: Vec<&str> = listed.iter().map(|r| r.keyword.as_str()).collect();
    assert_eq!(names, vec!["running shoes", "trail shoes", "winter boots"]);

    // A second sweep finds nothing left to fix.
    let report = run_keyword_cleanup(&store)
        .await
        .expect("Cleanup sweep failed");
    assert_eq!(report.repaired, 0);
    assert_eq!(report.deleted, 0);
}

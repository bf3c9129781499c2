//! End-to-end API tests over the real router and an in-memory engine.
//!
//! Each test boots the full axum stack on an ephemeral port and talks to
//! it over HTTP, so routing, extractors, middleware, and the response
//! envelope are all exercised together.

use ranklens_core::ids::{UserId, WebsiteId};
use ranklens_core::snapshot::{Dimension, SnapshotKey};
use ranklens_tests::{
    ApiTestClient, EngineHarness, PayloadFixture, ProviderFailure, SnapshotFixture,
    init_test_logging, start_test_server,
};
use serde_json::{Value, json};

#[tokio::test]
async fn test_health_endpoints_respond() {
    init_test_logging();
    let harness = EngineHarness::new();
    let (addr, _handle) = start_test_server(&harness).await;
    let client = ApiTestClient::new(addr);

    let response = client.get("/health").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("health body should be JSON");
    assert_eq!(body["status"], json!("healthy"));

    let response = client.get("/ready").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let (harness, website) = EngineHarness::with_website();
    let (addr, _handle) = start_test_server(&harness).await;
    let client = ApiTestClient::new(addr);

    let response = client
        .get(&format!("/api/v1/websites/{}/seo/overview", website.id))
        .await;

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("error body should be JSON");
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("authentication required"));
    assert_eq!(harness.provider.calls(), 0);
}

#[tokio::test]
async fn test_overview_round_trip_and_cache_flag() {
    let (harness, website) = EngineHarness::with_website();
    *harness.provider.overview.lock().unwrap() = PayloadFixture::overview();
    let (addr, _handle) = start_test_server(&harness).await;
    let client = ApiTestClient::new(addr).as_user(website.user_id);
    let path = format!("/api/v1/websites/{}/seo/overview", website.id);

    let response = client.get(&path).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("body should be JSON");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["cached"], json!(false));
    assert_eq!(body["data"]["organic_traffic"], json!(1200.0));
    assert_eq!(body["data"]["organic_keywords"], json!(340));
    assert_eq!(body["data"]["domain_rank"], json!(62));

    let body: Value = client
        .get(&path)
        .await
        .json()
        .await
        .expect("body should be JSON");
    assert_eq!(body["cached"], json!(true));
    assert_eq!(harness.provider.calls(), 1);
}

#[tokio::test]
async fn test_unknown_website_is_not_found() {
    let harness = EngineHarness::new();
    let (addr, _handle) = start_test_server(&harness).await;
    let client = ApiTestClient::new(addr).as_user(UserId::new());
    let missing = WebsiteId::new();

    let response = client
        .get(&format!("/api/v1/websites/{missing}/seo/overview"))
        .await;

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("error body should be JSON");
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("website not found"));
    assert_eq!(body["details"], json!(missing.to_string()));
}

#[tokio::test]
async fn test_foreign_website_is_forbidden() {
    let (harness, website) = EngineHarness::with_website();
    let (addr, _handle) = start_test_server(&harness).await;
    let client = ApiTestClient::new(addr).as_user(UserId::new());

    let response = client
        .get(&format!("/api/v1/websites/{}/seo/keywords", website.id))
        .await;

    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.expect("error body should be JSON");
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("website access denied"));
}

#[tokio::test]
async fn test_malformed_website_id_is_bad_request() {
    let harness = EngineHarness::new();
    let (addr, _handle) = start_test_server(&harness).await;
    let client = ApiTestClient::new(addr).as_user(UserId::new());

    let response = client
        .get("/api/v1/websites/not-an-id/seo/overview")
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("error body should be JSON");
    assert_eq!(body["error"], json!("invalid request"));
}

#[tokio::test]
async fn test_invalid_query_parameters_are_bad_requests() {
    let (harness, website) = EngineHarness::with_website();
    let (addr, _handle) = start_test_server(&harness).await;
    let client = ApiTestClient::new(addr).as_user(website.user_id);

    let response = client
        .get(&format!(
            "/api/v1/websites/{}/seo/keywords?limit=0",
            website.id
        ))
        .await;
    assert_eq!(response.status(), 400);

    let response = client
        .get(&format!(
            "/api/v1/websites/{}/seo/history?from=2024-13",
            website.id
        ))
        .await;
    assert_eq!(response.status(), 400);

    let response = client
        .get(&format!(
            "/api/v1/websites/{}/seo/intersection",
            website.id
        ))
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(harness.provider.calls(), 0);
}

#[tokio::test]
async fn test_intersection_reports_per_competitor_cache_state() {
    let (harness, website) = EngineHarness::with_website();
    let cached_key = SnapshotKey::scoped(website.id, Dimension::Intersection, "rivals.com");
    harness
        .snapshots
        .seed(SnapshotFixture::fresh(cached_key, &PayloadFixture::intersections()));
    harness.provider.intersections.lock().unwrap().insert(
        "challenger.io".to_string(),
        vec![PayloadFixture::intersection("marathon training plan", 12100)],
    );
    let (addr, _handle) = start_test_server(&harness).await;
    let client = ApiTestClient::new(addr).as_user(website.user_id);

    let response = client
        .get(&format!(
            "/api/v1/websites/{}/seo/intersection?competitors=rivals.com,challenger.io",
            website.id
        ))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("body should be JSON");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["cached"], json!(false));
    let entries = body["data"].as_array().expect("data should be an array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["competitor"], json!("rivals.com"));
    assert_eq!(entries[0]["cached"], json!(true));
    assert_eq!(entries[1]["competitor"], json!("challenger.io"));
    assert_eq!(entries[1]["cached"], json!(false));
}

#[tokio::test]
async fn test_keywords_limit_parameter_clips_response() {
    let (harness, website) = EngineHarness::with_website();
    *harness.provider.keywords.lock().unwrap() = PayloadFixture::keywords();
    let (addr, _handle) = start_test_server(&harness).await;
    let client = ApiTestClient::new(addr).as_user(website.user_id);

    let response = client
        .get(&format!(
            "/api/v1/websites/{}/seo/keywords?limit=2",
            website.id
        ))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("body should be JSON");
    let records = body["data"].as_array().expect("data should be an array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["keyword"], json!("running shoes"));
}

#[tokio::test]
async fn test_dead_provider_still_yields_successful_empty_response() {
    let (harness, website) = EngineHarness::with_website();
    harness.provider.fail_with(ProviderFailure::Timeout);
    let (addr, _handle) = start_test_server(&harness).await;
    let client = ApiTestClient::new(addr).as_user(website.user_id);

    let response = client
        .get(&format!("/api/v1/websites/{}/seo/pages", website.id))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("body should be JSON");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["cached"], json!(true));
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_responses_carry_request_id_header() {
    let harness = EngineHarness::new();
    let (addr, _handle) = start_test_server(&harness).await;
    let client = ApiTestClient::new(addr);

    let response = client.get("/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header should be set");
    assert!(!request_id.is_empty());
}

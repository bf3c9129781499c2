//! Harness wiring the engine to fakes, plus an HTTP client for the API.

use crate::fakes::{FakeProvider, MemoryKeywordRows, MemorySnapshots, MemoryWebsites};
use crate::fixtures::WebsiteFixture;
use ranklens_api::middleware::USER_ID_HEADER;
use ranklens_api::{AppState, build_app};
use ranklens_core::ids::UserId;
use ranklens_core::website::Website;
use ranklens_engine::SeoEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// The engine wired to in-memory fakes, with the fakes kept around so
/// tests can script outcomes and inspect side effects.
pub struct EngineHarness {
    pub websites: Arc<MemoryWebsites>,
    pub snapshots: Arc<MemorySnapshots>,
    pub keyword_rows: Arc<MemoryKeywordRows>,
    pub provider: Arc<FakeProvider>,
    pub engine: Arc<SeoEngine>,
}

impl EngineHarness {
    pub fn new() -> Self {
        let websites = Arc::new(MemoryWebsites::new());
        let snapshots = Arc::new(MemorySnapshots::new());
        let keyword_rows = Arc::new(MemoryKeywordRows::new());
        let provider = Arc::new(FakeProvider::new());
        let engine = Arc::new(SeoEngine::new(
            websites.clone(),
            snapshots.clone(),
            keyword_rows.clone(),
            provider.clone(),
        ));
        Self {
            websites,
            snapshots,
            keyword_rows,
            provider,
            engine,
        }
    }

    /// Harness plus one seeded website owned by a fresh user.
    pub fn with_website() -> (Self, Website) {
        let harness = Self::new();
        let website = WebsiteFixture::owned_by(UserId::new());
        harness.websites.insert(website.clone());
        (harness, website)
    }
}

impl Default for EngineHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve the real router over a harness on an ephemeral port.
pub async fn start_test_server(harness: &EngineHarness) -> (SocketAddr, JoinHandle<()>) {
    let state = Arc::new(AppState::new(harness.engine.clone()));
    let app = build_app(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("test server should bind an ephemeral port");
    let addr = listener
        .local_addr()
        .expect("listener should report its address");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("test server should keep serving");
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(100)).await;

    (addr, handle)
}

/// Thin HTTP client for exercising the API in tests.
pub struct ApiTestClient {
    client: reqwest::Client,
    base_url: String,
    user_id: Option<UserId>,
}

impl ApiTestClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
            user_id: None,
        }
    }

    /// Authenticate subsequent requests as `user_id`.
    pub fn as_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        let mut request = self.client.get(format!("{}{path}", self.base_url));
        if let Some(user_id) = self.user_id {
            request = request.header(USER_ID_HEADER, user_id.to_string());
        }
        request
            .send()
            .await
            .expect("request should reach the test server")
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

use slug_service::application::services::LinkService;
use slug_service::domain::entities::{NewShortLink, ShortLink};
use slug_service::domain::repositories::LinkRepository;
use slug_service::infrastructure::abuse_guard::{
    AbuseGuard, MemoryAbuseGuard, ThrottlePolicy, Verdict,
};
use slug_service::infrastructure::persistence::MemoryLinkRepository;
use slug_service::routes::app_router;
use slug_service::state::AppState;
use slug_service::utils::url_policy::TargetPolicy;

pub const SERVICE_DOMAIN: &str = "sho.rt";

/// A throttle that never delays or rejects within a test.
pub fn permissive_policy() -> ThrottlePolicy {
    ThrottlePolicy {
        window: Duration::from_secs(30),
        max_requests: 10_000,
        delay_after: 10_000,
        delay_step: Duration::ZERO,
        max_delay: Duration::ZERO,
    }
}

/// State over an in-memory store; the store is returned for assertions.
pub fn create_test_state(policy: ThrottlePolicy) -> (AppState, Arc<MemoryLinkRepository>) {
    create_test_state_with_guard(Arc::new(MemoryAbuseGuard::new(policy)))
}

pub fn create_test_state_with_guard(
    guard: Arc<dyn AbuseGuard>,
) -> (AppState, Arc<MemoryLinkRepository>) {
    let repo = Arc::new(MemoryLinkRepository::new());
    let store: Arc<dyn LinkRepository> = repo.clone();

    let link_service = LinkService::new(store.clone(), TargetPolicy::new(SERVICE_DOMAIN), 5);
    let state = AppState::new(store, "memory", guard, link_service);

    (state, repo)
}

/// The full application router, as served in production.
pub fn create_test_app(state: AppState) -> Router {
    app_router(state, "public").layer(MockConnectInfoLayer)
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(create_test_app(state)).unwrap()
}

pub async fn create_test_link(repo: &MemoryLinkRepository, slug: &str, url: &str) -> ShortLink {
    repo.put(NewShortLink::new(slug, url)).await.unwrap()
}

/// Guard whose backing store is permanently unreachable.
pub struct UnreachableGuard;

#[async_trait]
impl AbuseGuard for UnreachableGuard {
    async fn classify(&self, _client_id: &str) -> Verdict {
        Verdict::Allow
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// Inserts a fixed peer address, as `into_make_service_with_connect_info` would.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

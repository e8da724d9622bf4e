#![allow(dead_code)]

use axum::{Router, extract::ConnectInfo, routing::get};
use chrono::{DateTime, Duration, Utc};
use shortlink::api::handlers::redirect_handler;
use shortlink::api::routes::api_routes;
use shortlink::domain::entities::LinkRecord;
use shortlink::infrastructure::persistence::MemoryLinkRepository;
use shortlink::infrastructure::telemetry::NullTelemetry;
use shortlink::state::AppState;
use shortlink::utils::code_generator::CodeAllocator;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;

pub const BASE_URL: &str = "http://sho.rt";

/// State over an in-memory store with a deterministic allocator.
pub fn create_test_state(store: Arc<MemoryLinkRepository>) -> AppState {
    AppState::with_allocator(
        store.clone(),
        store,
        Arc::new(NullTelemetry::default()),
        BASE_URL,
        30,
        CodeAllocator::seeded(7),
    )
}

/// Full route table with a fake peer address for the redirect handler.
pub fn test_app(state: AppState) -> Router {
    Router::new()
        .route("/{shortcode}", get(redirect_handler))
        .nest("/api", api_routes())
        .layer(MockConnectInfoLayer)
        .with_state(state)
}

pub fn live_link(code: &str, url: &str, created_at: DateTime<Utc>) -> LinkRecord {
    LinkRecord::new(
        code.to_string(),
        url.to_string(),
        created_at,
        Some(created_at + Duration::minutes(30)),
    )
}

pub fn expired_link(code: &str, url: &str) -> LinkRecord {
    let created_at = Utc::now() - Duration::hours(2);
    LinkRecord::new(
        code.to_string(),
        url.to_string(),
        created_at,
        Some(created_at + Duration::hours(1)),
    )
}

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

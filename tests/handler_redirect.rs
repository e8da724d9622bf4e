mod common;

use axum_test::TestServer;
use chrono::Utc;
use shortlink::domain::repositories::LinkRepository;
use shortlink::infrastructure::persistence::MemoryLinkRepository;
use std::sync::Arc;

fn setup(records: Vec<shortlink::domain::entities::LinkRecord>) -> (TestServer, Arc<MemoryLinkRepository>) {
    let store = Arc::new(MemoryLinkRepository::with_records(records));
    let state = common::create_test_state(store.clone());
    (TestServer::new(common::test_app(state)).unwrap(), store)
}

#[tokio::test]
async fn test_redirect_success() {
    let (server, _store) = setup(vec![common::live_link(
        "redir1",
        "https://example.com/target?q=1#frag",
        Utc::now(),
    )]);

    let response = server.get("/redir1").await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(
        response.header("location"),
        "https://example.com/target?q=1#frag"
    );
}

#[tokio::test]
async fn test_redirect_not_found() {
    let (server, _store) = setup(vec![]);

    let response = server.get("/nothere").await;

    response.assert_status_not_found();
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "not_found"
    );
}

#[tokio::test]
async fn test_redirect_expired_is_gone() {
    let (server, store) = setup(vec![common::expired_link("oldone", "https://example.com")]);

    let response = server.get("/oldone").await;

    assert_eq!(response.status_code(), 410);
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "expired"
    );

    let record = store.find("oldone").await.unwrap().unwrap();
    assert_eq!(record.click_count, 0);
}

#[tokio::test]
async fn test_redirect_records_click_metadata() {
    let (server, store) = setup(vec![common::live_link("clicky", "https://example.com", Utc::now())]);

    server
        .get("/clicky")
        .add_header("Referer", "https://news.example.org/post")
        .add_header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
        .await;
    server.get("/clicky").await;

    let record = store.find("clicky").await.unwrap().unwrap();
    assert_eq!(record.click_count, 2);
    assert_eq!(record.click_log.len(), 2);

    assert_eq!(
        record.click_log[0].source.as_deref(),
        Some("https://news.example.org/post")
    );
    assert_eq!(record.click_log[0].location.as_deref(), Some("203.0.113.7"));

    assert_eq!(record.click_log[1].source.as_deref(), Some("direct"));
    assert_eq!(record.click_log[1].location.as_deref(), Some("127.0.0.1"));
}

#[tokio::test]
async fn test_expired_code_can_be_reused() {
    let (server, _store) = setup(vec![common::expired_link("reuse1", "https://old.example.com")]);

    server
        .post("/api/urls")
        .json(&serde_json::json!({ "url": "https://new.example.com", "shortcode": "reuse1" }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server.get("/reuse1").await;

    assert_eq!(response.status_code(), 307);
    assert_eq!(response.header("location"), "https://new.example.com");
}

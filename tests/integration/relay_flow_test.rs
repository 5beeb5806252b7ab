//! End-to-end flow for the per-application destination table (HMAC-SHA1).

#[path = "../common/mod.rs"]
mod common;

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{app, body_bytes, post, settle, sign, wait_for_requests, HOST, KEY};
use deploy_notifier::auth::DigestAlgorithm;

const QUERY: &str = "/?app=myapp&release=v3&user=alice";

async fn slack() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/myapp"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    server
}

fn table(server: &MockServer) -> String {
    format!("myapp={}/hooks/myapp,other={}/hooks/other", server.uri(), server.uri())
}

fn signed(query: &str) -> String {
    sign(DigestAlgorithm::Sha1, &format!("http://{}{}", HOST, query))
}

#[tokio::test]
async fn test_valid_signature_posts_once() {
    let server = slack().await;
    let hooks = table(&server);
    let app = app(&[("KEY", KEY), ("HOOK_URLS", &hooks)]);

    let response = post(app, QUERY, Some(&signed(QUERY))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());

    let received = wait_for_requests(&server, 1).await;
    assert_eq!(received.len(), 1);

    let request = &received[0];
    assert_eq!(request.url.path(), "/hooks/myapp");
    assert_eq!(
        request.headers.get("content-type").unwrap(),
        "application/json"
    );

    let body: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(
        body,
        json!({
            "attachments": [{
                "text": "@alice deployed *myapp* v3",
                "color": "good",
                "mrkdwn_in": ["text"]
            }],
            "username": "Deis Deployer",
            "icon_emoji": ":nerd_face:"
        })
    );

    assert_eq!(settle(&server).await.len(), 1);
}

#[tokio::test]
async fn test_invalid_signature_is_forbidden() {
    let server = slack().await;
    let hooks = table(&server);
    let app = app(&[("KEY", KEY), ("HOOK_URLS", &hooks)]);

    let response = post(app, QUERY, Some(&"00".repeat(20))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(body_bytes(response).await.is_empty());

    assert!(settle(&server).await.is_empty());
}

#[tokio::test]
async fn test_malformed_and_missing_signatures_are_forbidden() {
    let server = slack().await;
    let hooks = table(&server);

    for signature in [Some("not-hex"), Some(""), None] {
        let app = app(&[("KEY", KEY), ("HOOK_URLS", &hooks)]);
        let response = post(app, QUERY, signature).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    assert!(settle(&server).await.is_empty());
}

#[tokio::test]
async fn test_tampered_query_is_forbidden() {
    let server = slack().await;
    let hooks = table(&server);
    let app = app(&[("KEY", KEY), ("HOOK_URLS", &hooks)]);

    let signature = signed(QUERY);
    let response = post(app, "/?app=myapp&release=v4&user=alice", Some(&signature)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert!(settle(&server).await.is_empty());
}

#[tokio::test]
async fn test_scheme_comes_from_configuration() {
    let server = slack().await;
    let hooks = table(&server);
    let app_https = app(&[("KEY", KEY), ("HOOK_URLS", &hooks), ("HTTP_SCHEME", "https")]);

    // Signed for http, relay reconstructs https.
    let response = post(app_https, QUERY, Some(&signed(QUERY))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let https_signature = sign(DigestAlgorithm::Sha1, &format!("https://{}{}", HOST, QUERY));
    let app_https = app(&[("KEY", KEY), ("HOOK_URLS", &hooks), ("HTTP_SCHEME", "https")]);
    let response = post(app_https, QUERY, Some(&https_signature)).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(wait_for_requests(&server, 1).await.len(), 1);
}

#[tokio::test]
async fn test_missing_key_is_forbidden() {
    let server = slack().await;
    let hooks = table(&server);
    let app = app(&[("HOOK_URLS", &hooks)]);

    let response = post(app, QUERY, Some(&signed(QUERY))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    assert!(settle(&server).await.is_empty());
}

#[tokio::test]
async fn test_unknown_app_still_accepted() {
    let server = slack().await;
    let hooks = table(&server);
    let app = app(&[("KEY", KEY), ("HOOK_URLS", &hooks)]);

    let query = "/?app=ghost&release=v1&user=alice";
    let response = post(app, query, Some(&signed(query))).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(settle(&server).await.is_empty());
}

#[tokio::test]
async fn test_delivery_failure_is_invisible_to_caller() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    let hooks = table(&server);
    let app = app(&[("KEY", KEY), ("HOOK_URLS", &hooks)]);

    let response = post(app, QUERY, Some(&signed(QUERY))).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Exactly one attempt: no retry.
    assert_eq!(settle(&server).await.len(), 1);
}

#[tokio::test]
async fn test_pretext_and_presentation_overrides() {
    let server = slack().await;
    let hooks = table(&server);
    let app = app(&[
        ("KEY", KEY),
        ("HOOK_URLS", &hooks),
        ("PRETEXT", "Deployed:"),
        ("BOT_NAME", "Releases"),
        ("EMOJI", "rocket"),
    ]);

    let query = "/?app=myapp&release=v3&user=alice&channel=ops";
    let response = post(app, query, Some(&signed(query))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let received = wait_for_requests(&server, 1).await;
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(
        body["attachments"][0]["text"],
        "Deployed: @alice deployed *myapp* v3"
    );
    assert_eq!(body["username"], "Releases");
    assert_eq!(body["icon_emoji"], ":rocket:");
    assert_eq!(body["channel"], "#ops");
}

#[tokio::test]
async fn test_any_method_is_processed() {
    let server = slack().await;
    let hooks = table(&server);
    let app = app(&[("KEY", KEY), ("HOOK_URLS", &hooks)]);

    let request = axum::http::Request::builder()
        .method("GET")
        .uri(QUERY)
        .header("host", HOST)
        .header("authorization", signed(QUERY))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(wait_for_requests(&server, 1).await.len(), 1);
}

#[tokio::test]
async fn test_response_does_not_wait_for_delivery() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/myapp"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    let hooks = table(&server);
    let app = app(&[("KEY", KEY), ("HOOK_URLS", &hooks)]);

    let started = Instant::now();
    let response = post(app, QUERY, Some(&signed(QUERY))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(started.elapsed() < Duration::from_secs(1));

    // The slow delivery is still under way.
    assert_eq!(wait_for_requests(&server, 1).await.len(), 1);
}

#[tokio::test]
async fn test_no_destinations_still_accepted() {
    let server = slack().await;
    let app = app(&[("KEY", KEY)]);

    let response = post(app, QUERY, Some(&signed(QUERY))).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(settle(&server).await.is_empty());
}

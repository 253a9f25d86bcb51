//! Router-level tests for the relay endpoints, backed by the mock provider.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use relay_service::config::{LimitsConfig, RelayProfile, DEFAULT_MODEL};
use relay_service::handlers::health::LIVENESS_MESSAGE;
use relay_service::services::providers::mock::MockProvider;
use relay_service::services::providers::{Content, Part, UserContent};
use relay_service::startup::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::util::ServiceExt;

fn app_with(provider: Arc<MockProvider>) -> Router {
    app_with_limits(provider, LimitsConfig::default())
}

fn app_with_limits(provider: Arc<MockProvider>, limits: LimitsConfig) -> Router {
    let state = AppState::new(RelayProfile::default(), provider);
    build_router(state, &limits)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn translate_builds_conversational_prompt_and_returns_result() {
    let provider = Arc::new(MockProvider::replying("မင်္ဂလာပါ"));
    let app = app_with(provider.clone());

    let (status, body) = send(
        app,
        post_json(
            "/api/translate",
            json!({ "text": "Hello", "targetLang": "Burmese", "type": "caption" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "result": "မင်္ဂလာပါ" }));

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model, DEFAULT_MODEL);
    assert!(request.system_prompt.contains("Translate this caption to Burmese."));
    assert!(request.system_prompt.contains("natural conversational Burmese"));
    assert_eq!(request.content, UserContent::Text("Hello".to_string()));
}

#[tokio::test]
async fn media_process_transcribe_selects_transcription_prompt() {
    let provider = Arc::new(MockProvider::replying("Speaker 1: hi"));
    let app = app_with(provider.clone());

    let (status, body) = send(
        app,
        post_json(
            "/api/media-process",
            json!({ "media": "aGVsbG8=", "mimeType": "audio/mpeg", "task": "transcribe" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "Speaker 1: hi");

    let request = &provider.requests()[0];
    assert!(request.system_prompt.starts_with("Transcribe word-for-word"));
    assert!(request.content.is_media());
    assert_eq!(
        request.content,
        UserContent::Media(vec![Content::user(vec![
            Part::inline_data("audio/mpeg", "aGVsbG8="),
            Part::text("Analyze and process this file according to the instructions."),
        ])])
    );
}

#[tokio::test]
async fn media_process_other_or_missing_task_selects_recap_prompt() {
    for task in [json!("recap"), json!("summarize"), json!(null)] {
        let provider = Arc::new(MockProvider::replying("recap"));
        let app = app_with(provider.clone());

        let (status, _) = send(
            app,
            post_json(
                "/api/media-process",
                json!({ "media": "AAAA", "mimeType": "video/mp4", "task": task }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(provider.requests()[0]
            .system_prompt
            .contains("cinematic recap"));
    }

    let provider = Arc::new(MockProvider::replying("recap"));
    let (status, _) = send(
        app_with(provider.clone()),
        post_json(
            "/api/media-process",
            json!({ "media": "AAAA", "mimeType": "video/mp4" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(provider.requests()[0].system_prompt.contains("cinematic recap"));
}

#[tokio::test]
async fn create_selects_prompt_by_type_and_sends_topic() {
    let cases = [
        ("novel", "300,000+ character style story about dragons in English"),
        ("social_content", "viral video script and social media post about dragons"),
        ("poem", "Write a professional poem about dragons in English."),
    ];

    for (kind, expected) in cases {
        let provider = Arc::new(MockProvider::replying("done"));
        let (status, body) = send(
            app_with(provider.clone()),
            post_json(
                "/api/create",
                json!({ "topic": "dragons", "type": kind, "lang": "English" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "type {kind}");
        assert_eq!(body["result"], "done");

        let request = &provider.requests()[0];
        assert!(
            request.system_prompt.contains(expected),
            "type {kind}: {}",
            request.system_prompt
        );
        assert_eq!(request.content, UserContent::Text("dragons".to_string()));
    }
}

#[tokio::test]
async fn sub_gen_uses_fixed_srt_instruction() {
    let provider = Arc::new(MockProvider::replying("1\n00:00:00,000 --> 00:00:01,000\nHi\n"));

    let (status, body) = send(
        app_with(provider.clone()),
        post_json("/api/sub-gen", json!({ "text": "Hi" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["result"].as_str().unwrap().contains("-->"));

    let request = &provider.requests()[0];
    assert!(request.system_prompt.contains("SRT"));
    assert_eq!(request.content, UserContent::Text("Hi".to_string()));
}

#[tokio::test]
async fn provider_failure_returns_500_with_error_only() {
    let endpoints = [
        ("/api/media-process", json!({ "media": "AAAA", "mimeType": "image/png" })),
        ("/api/translate", json!({ "text": "a", "targetLang": "French" })),
        ("/api/create", json!({ "topic": "a", "lang": "French" })),
        ("/api/sub-gen", json!({ "text": "a" })),
    ];

    for (uri, payload) in endpoints {
        let provider = Arc::new(MockProvider::failing("quota exceeded"));
        let (status, body) = send(app_with(provider), post_json(uri, payload)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert!(body["error"].as_str().unwrap().contains("quota exceeded"), "{uri}");
        assert!(body.get("result").is_none(), "{uri}");
    }
}

#[tokio::test]
async fn missing_fields_are_rejected_before_calling_provider() {
    let endpoints = [
        ("/api/media-process", json!({ "mimeType": "image/png" })),
        ("/api/translate", json!({ "text": "a" })),
        ("/api/create", json!({ "lang": "French" })),
        ("/api/sub-gen", json!({})),
    ];

    for (uri, payload) in endpoints {
        let provider = Arc::new(MockProvider::replying("unused"));
        let (status, body) = send(app_with(provider.clone()), post_json(uri, payload)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(body["error"], "Validation error", "{uri}");
        assert!(body.get("result").is_none(), "{uri}");
        assert!(provider.requests().is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let provider = Arc::new(MockProvider::replying("unused"));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/translate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"text\":"))
        .unwrap();

    let (status, body) = send(app_with(provider.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Json parse error"));
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let provider = Arc::new(MockProvider::replying("unused"));
    let app = app_with_limits(
        provider.clone(),
        LimitsConfig {
            max_body_bytes: 64,
            ..LimitsConfig::default()
        },
    );
    let payload = json!({ "text": "x".repeat(256) }).to_string();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/sub-gen")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, payload.len())
        .body(Body::from(payload))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn liveness_ignores_query_parameters() {
    for uri in ["/", "/?probe=1", "/?a=b&c"] {
        let app = app_with(Arc::new(MockProvider::replying("unused")));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], LIVENESS_MESSAGE.as_bytes());
    }
}

#[tokio::test]
async fn health_and_ready_report_ok() {
    let app = app_with(Arc::new(MockProvider::replying("unused")));

    let (status, body) = send(
        app.clone(),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "relay-service");

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let app = app_with(Arc::new(MockProvider::replying("unused")));
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/translate")
        .header(header::ORIGIN, "https://studio.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = app_with(Arc::new(MockProvider::replying("ok")));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/sub-gen")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "req-42")
        .body(Body::from(json!({ "text": "hi" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-42");
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
}

#[tokio::test]
async fn concurrent_requests_complete_independently() {
    let provider = Arc::new(MockProvider::replying("ok").with_delay(Duration::from_millis(50)));
    let app = app_with(provider.clone());

    let calls = (0..8).map(|i| {
        let app = app.clone();
        async move {
            send(
                app,
                post_json("/api/sub-gen", json!({ "text": format!("line {i}") })),
            )
            .await
        }
    });

    let results = futures::future::join_all(calls).await;

    assert!(results
        .iter()
        .all(|(status, body)| *status == StatusCode::OK && body["result"] == "ok"));
    assert_eq!(provider.requests().len(), 8);
}

#[tokio::test]
async fn in_flight_cap_queues_relay_calls_but_not_liveness() {
    let provider = Arc::new(MockProvider::replying("ok").with_delay(Duration::from_millis(500)));
    let app = app_with_limits(
        provider.clone(),
        LimitsConfig {
            max_in_flight: 1,
            ..LimitsConfig::default()
        },
    );
    let started = Instant::now();

    let first = tokio::spawn(send(
        app.clone(),
        post_json("/api/sub-gen", json!({ "text": "first" })),
    ));
    // Let the first call take the only permit
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(provider.requests().len(), 1);

    let liveness = tokio::time::timeout(
        Duration::from_millis(200),
        app.clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()),
    )
    .await
    .expect("liveness must not wait for the in-flight relay call")
    .unwrap();
    assert_eq!(liveness.status(), StatusCode::OK);

    let ready = tokio::time::timeout(
        Duration::from_millis(200),
        app.clone()
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap()),
    )
    .await
    .expect("readiness must not wait for the in-flight relay call")
    .unwrap();
    assert_eq!(ready.status(), StatusCode::OK);

    let (status, body) = send(app, post_json("/api/sub-gen", json!({ "text": "second" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "ok");
    // The second call only starts once the first has released its permit
    assert!(started.elapsed() >= Duration::from_millis(950));

    let (status, _) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.requests().len(), 2);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = app_with(Arc::new(MockProvider::replying("unused")));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use http_body_util::BodyExt;
use nightschool_application::{
    COMPLETION_FALLBACK_REPLY, ChatRateLimitRepository, ChatService, Clock, CompletionProvider,
    CompletionRequest,
};
use nightschool_core::{AppError, AppResult};
use nightschool_domain::{CallerKey, RateLimitPolicy, RateLimitRecord};
use nightschool_infrastructure::InMemoryChatRateLimitRepository;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::state::AppState;

use super::build_router;

struct FakeCompletionProvider {
    reply: Option<String>,
    fail: bool,
    calls: Mutex<usize>,
}

impl FakeCompletionProvider {
    fn replying(reply: Option<&str>) -> Self {
        Self {
            reply: reply.map(ToOwned::to_owned),
            fail: false,
            calls: Mutex::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            reply: None,
            fail: true,
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.lock().map(|calls| *calls).unwrap_or(0)
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletionProvider {
    async fn complete(&self, _request: CompletionRequest) -> AppResult<Option<String>> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }

        if self.fail {
            return Err(AppError::Internal("upstream timed out".to_owned()));
        }

        Ok(self.reply.clone())
    }
}

struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn advance(&self, delta: TimeDelta) {
        if let Ok(mut now) = self.now.lock() {
            *now += delta;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}

struct TestApp {
    router: Router,
    repository: Arc<InMemoryChatRateLimitRepository>,
    provider: Arc<FakeCompletionProvider>,
    clock: Arc<ManualClock>,
}

fn test_app(provider: FakeCompletionProvider, policy: RateLimitPolicy) -> Option<TestApp> {
    let repository = Arc::new(InMemoryChatRateLimitRepository::new());
    let provider = Arc::new(provider);
    let clock = Arc::new(ManualClock {
        now: Mutex::new(
            Utc.with_ymd_and_hms(2025, 9, 1, 20, 0, 0)
                .single()
                .unwrap_or_default(),
        ),
    });
    let chat_service =
        ChatService::new(repository.clone(), provider.clone(), clock.clone()).with_policy(policy);
    let router = build_router(AppState { chat_service }, "http://localhost:3000").ok()?;

    Some(TestApp {
        router,
        repository,
        provider,
        clock,
    })
}

fn chat_request(authorization: Option<&str>, caller: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json");
    if let Some(authorization) = authorization {
        builder = builder.header("authorization", authorization);
    }
    if let Some(caller) = caller {
        builder = builder.header("x-forwarded-for", caller);
    }

    builder
        .body(Body::from(body.to_owned()))
        .unwrap_or_default()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = match router.clone().oneshot(request).await {
        Ok(response) => response,
        Err(error) => match error {},
    };
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

fn message_body(message: &str) -> String {
    json!({ "message": message }).to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let Some(app) = test_app(
        FakeCompletionProvider::replying(Some("hi")),
        RateLimitPolicy::default(),
    ) else {
        panic!("router should build");
    };

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap_or_default();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn missing_authorization_is_rejected_before_body_is_read() {
    let Some(app) = test_app(
        FakeCompletionProvider::replying(Some("hi")),
        RateLimitPolicy::default(),
    ) else {
        panic!("router should build");
    };

    for body in [message_body("Who is Sol LeWitt?"), "not json".to_owned()] {
        let (status, payload) = send(&app.router, chat_request(None, Some("A"), &body)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(payload, json!({ "error": "Unauthorized" }));
    }
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn invalid_message_is_rejected_without_calling_completion_api() {
    let Some(app) = test_app(
        FakeCompletionProvider::replying(Some("hi")),
        RateLimitPolicy::default(),
    ) else {
        panic!("router should build");
    };

    for body in [
        "{}".to_owned(),
        json!({ "message": 7 }).to_string(),
        json!({ "message": "" }).to_string(),
        "{".to_owned(),
    ] {
        let (status, payload) =
            send(&app.router, chat_request(Some("Bearer token"), Some("A"), &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload, json!({ "error": "Message is required" }));
    }
    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn whitespace_only_message_is_forwarded() {
    let Some(app) = test_app(
        FakeCompletionProvider::replying(Some("Silence is also form.")),
        RateLimitPolicy::default(),
    ) else {
        panic!("router should build");
    };

    let (status, payload) = send(
        &app.router,
        chat_request(Some("Bearer token"), Some("A"), &message_body("   ")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload, json!({ "message": "Silence is also form." }));
    assert_eq!(app.provider.calls(), 1);
}

#[tokio::test]
async fn caller_is_limited_to_ten_messages_per_hour() {
    let Some(app) = test_app(
        FakeCompletionProvider::replying(Some("Simplicity reveals essential form.")),
        RateLimitPolicy::default(),
    ) else {
        panic!("router should build");
    };
    let caller_a = CallerKey::new("A").unwrap_or_else(|_| CallerKey::unknown());

    for _ in 0..10 {
        let (status, payload) = send(
            &app.router,
            chat_request(Some("Bearer token"), Some("A"), &message_body("hello")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            payload,
            json!({ "message": "Simplicity reveals essential form." })
        );
        app.clock.advance(TimeDelta::minutes(2));
    }

    let (status, payload) = send(
        &app.router,
        chat_request(Some("Bearer token"), Some("A"), &message_body("one more")),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        payload,
        json!({ "error": "Rate limit exceeded. Please try again later." })
    );
    assert_eq!(app.provider.calls(), 10);

    app.clock.advance(TimeDelta::minutes(61));
    let resumed_at = app.clock.now();
    let (status, _) = send(
        &app.router,
        chat_request(Some("Bearer token"), Some("A"), &message_body("back again")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let stored = app.repository.find_record(&caller_a).await.ok().flatten();
    assert_eq!(stored, Some(RateLimitRecord::new(1, resumed_at)));
}

#[tokio::test]
async fn callers_without_address_share_one_bucket() {
    let policy = RateLimitPolicy::new(1, 3600).unwrap_or_default();
    let Some(app) = test_app(FakeCompletionProvider::replying(Some("hi")), policy) else {
        panic!("router should build");
    };

    let (first, _) = send(
        &app.router,
        chat_request(Some("Bearer a"), None, &message_body("hi")),
    )
    .await;
    let (second, _) = send(
        &app.router,
        chat_request(Some("Bearer b"), None, &message_body("hi")),
    )
    .await;
    let (other_caller, _) = send(
        &app.router,
        chat_request(Some("Bearer c"), Some("B"), &message_body("hi")),
    )
    .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(other_caller, StatusCode::OK);
}

#[tokio::test]
async fn empty_completion_returns_fallback_reply() {
    let Some(app) = test_app(
        FakeCompletionProvider::replying(None),
        RateLimitPolicy::default(),
    ) else {
        panic!("router should build");
    };

    let (status, payload) = send(
        &app.router,
        chat_request(Some("Bearer token"), Some("A"), &message_body("hi")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload, json!({ "message": COMPLETION_FALLBACK_REPLY }));
}

#[tokio::test]
async fn upstream_failure_is_reported_generically() {
    let Some(app) = test_app(FakeCompletionProvider::failing(), RateLimitPolicy::default()) else {
        panic!("router should build");
    };

    let (status, payload) = send(
        &app.router,
        chat_request(Some("Bearer token"), Some("A"), &message_body("hi")),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload, json!({ "error": "Failed to process message" }));

    let caller_a = CallerKey::new("A").unwrap_or_else(|_| CallerKey::unknown());
    let stored = app.repository.find_record(&caller_a).await.ok().flatten();
    assert!(stored.is_none());
}

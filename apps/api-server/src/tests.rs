//! End-to-end tests: completion route and OpenAI client against a local fake upstream.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, test, web};
use serde_json::{Value, json};

use chatgate_core::domain::{ChatMessage, CompletionRequest, PromptTemplate};
use chatgate_core::ports::{CompletionError, CompletionProvider};
use chatgate_infra::{
    FixedWindowRateLimiter, OpenAiCompletionProvider, OpenAiConfig, RateLimitConfig,
};

use crate::config::{CompletionSettings, QuotaSettings};
use crate::handlers::configure_routes;
use crate::state::AppState;

/// Echoes the first and last message contents back as the completion text.
async fn fake_upstream(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    let auth = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    if auth != Some("Bearer sk-test") {
        return HttpResponse::Unauthorized().json(json!({
            "error": {
                "message": "Incorrect API key provided: sk-wrong",
                "type": "invalid_request_error"
            }
        }));
    }

    let messages = body["messages"].as_array().cloned().unwrap_or_default();
    let content_of = |m: Option<&Value>| {
        m.and_then(|m| m["content"].as_str())
            .unwrap_or_default()
            .to_string()
    };

    HttpResponse::Ok().json(json!({
        "id": "chatcmpl-local",
        "object": "chat.completion",
        "model": body["model"],
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": format!("{} | {}", content_of(messages.first()), content_of(messages.last()))
            },
            "finish_reason": "stop"
        }]
    }))
}

fn spawn_upstream() -> SocketAddr {
    let server = HttpServer::new(|| {
        App::new().route("/v1/chat/completions", web::post().to(fake_upstream))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());
    addr
}

fn provider(addr: SocketAddr, api_key: &str) -> OpenAiCompletionProvider {
    OpenAiCompletionProvider::new(OpenAiConfig {
        api_key: api_key.to_string(),
        base_url: format!("http://{}/v1", addr),
        ..OpenAiConfig::default()
    })
    .unwrap()
}

fn state(provider: OpenAiCompletionProvider) -> AppState {
    let limiter = FixedWindowRateLimiter::new(RateLimitConfig::default()).unwrap();
    let completion = CompletionSettings {
        prompt: PromptTemplate::new("Answer as the host: ", "Stay on topic."),
        provider_timeout: Duration::from_secs(5),
        ..CompletionSettings::default()
    };

    AppState::new(
        Arc::new(limiter),
        Arc::new(provider),
        completion,
        QuotaSettings::default(),
    )
}

async fn post_hello(state: AppState) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/ai/create-chat-completion")
        .peer_addr("192.0.2.50:40123".parse().unwrap())
        .set_json(json!({"messages": [{"role": "user", "content": "Hello"}]}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    (status, test::read_body_json(resp).await)
}

#[actix_web::test]
async fn test_round_trip_through_openai_client() {
    let addr = spawn_upstream();

    let (status, body) = post_hello(state(provider(addr, "sk-test"))).await;

    assert_eq!(status, StatusCode::OK);
    let content = body["choices"][0]["message"]["content"].as_str().unwrap();
    assert!(content.starts_with("Today is "));
    assert!(content.contains(". Stay on topic. | "));
    assert!(content.ends_with("| Answer as the host: Hello"));
    assert_eq!(body["choices"][0]["finish_reason"], "stop");
}

#[actix_web::test]
async fn test_upstream_rejection_is_not_leaked() {
    let addr = spawn_upstream();

    let (status, body) = post_hello(state(provider(addr, "sk-wrong"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Something went wrong"}));
}

#[actix_web::test]
async fn test_unreachable_upstream_is_internal_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let (status, body) = post_hello(state(provider(addr, "sk-test"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Something went wrong"}));
}

#[actix_web::test]
async fn test_client_reports_api_errors() {
    let addr = spawn_upstream();
    let request = CompletionRequest::new("gpt-3.5-turbo", 0.6, vec![ChatMessage::user("hi")]);

    let err = provider(addr, "sk-wrong")
        .create_chat_completion(request)
        .await
        .unwrap_err();

    match err {
        CompletionError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided: sk-wrong");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

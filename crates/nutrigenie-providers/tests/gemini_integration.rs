use axum::{Json, Router, routing::post};
use nutrigenie_providers::{GeminiProvider, GenerationProvider, GenerationRequest, ImagePayload};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpListener;

async fn spawn_mock(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    format!("http://127.0.0.1:{port}")
}

async fn mock_generate_handler(Json(payload): Json<Value>) -> Json<Value> {
    assert_eq!(payload["contents"][0]["role"], "user");
    assert_eq!(
        payload["contents"][0]["parts"][0]["text"],
        "What should I eat for diabetes?"
    );

    Json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": "[[Foods to Eat]]\nLeafy greens.\n[[Foods to Avoid]]\nSugar.\n[[Tips]]\nWalk daily."}]
            },
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 9,
            "candidatesTokenCount": 21
        }
    }))
}

#[tokio::test]
async fn generate_round_trips_through_mock_server() {
    let app = Router::new().route(
        "/v1beta/models/gemini-test:generateContent",
        post(mock_generate_handler),
    );
    let base_url = spawn_mock(app).await;

    let provider = GeminiProvider::new("test-key", Some("gemini-test".to_string()), Some(base_url));
    let request = GenerationRequest::text("What should I eat for diabetes?");

    let response = provider.generate(&request).await.expect("generate should succeed");
    assert!(response.text.starts_with("[[Foods to Eat]]"));
    assert_eq!(response.usage.expect("usage present").output_tokens, 21);
}

async fn mock_image_handler(Json(payload): Json<Value>) -> Json<Value> {
    let inline = &payload["contents"][0]["parts"][1]["inlineData"];
    assert_eq!(inline["mimeType"], "image/jpeg");
    assert!(inline["data"].as_str().unwrap().starts_with("/9j/"));

    Json(json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": "1. Rice - 200 calories\nTotal Calories: 200"}]
            }
        }]
    }))
}

#[tokio::test]
async fn image_requests_carry_inline_data() {
    let app = Router::new().route(
        "/v1beta/models/gemini-test:generateContent",
        post(mock_image_handler),
    );
    let base_url = spawn_mock(app).await;

    let provider = GeminiProvider::new("test-key", Some("gemini-test".to_string()), Some(base_url));
    let request = GenerationRequest::text("Analyze this meal.").with_image(ImagePayload {
        mime_type: "image/jpeg".to_string(),
        data: vec![0xff, 0xd8, 0xff, 0xe0],
    });

    let response = provider.generate(&request).await.expect("generate should succeed");
    assert!(response.text.contains("Total Calories"));
}

#[tokio::test]
async fn api_errors_surface_status_and_body() {
    async fn failing_handler() -> (axum::http::StatusCode, &'static str) {
        (axum::http::StatusCode::TOO_MANY_REQUESTS, "quota exceeded")
    }

    let app = Router::new().route(
        "/v1beta/models/gemini-test:generateContent",
        post(failing_handler),
    );
    let base_url = spawn_mock(app).await;

    let provider = GeminiProvider::new("test-key", Some("gemini-test".to_string()), Some(base_url));
    let err = provider
        .generate(&GenerationRequest::text("hello"))
        .await
        .expect_err("quota errors must surface");

    let message = err.to_string();
    assert!(message.contains("429"));
    assert!(message.contains("quota exceeded"));
}

#[tokio::test]
async fn health_check_reports_failure_without_erroring() {
    // Nothing listening on this port
    let provider = GeminiProvider::new(
        "test-key",
        Some("gemini-test".to_string()),
        Some("http://127.0.0.1:1".to_string()),
    );

    let healthy = provider.health_check().await.expect("health check is infallible");
    assert!(!healthy);
}

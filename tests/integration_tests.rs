//! Integration tests for the forecast summary endpoint
//!
//! Both upstreams (weather API and text-generation API) are wiremock servers;
//! requests go through the full router including middleware.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use forecast_summary::config::{ForecastConfig, LlmProvider};
use forecast_summary::{AppState, web};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUMMARY: &str = "Expect mild temperatures this week.";

fn seven_day_periods() -> serde_json::Value {
    let days = [
        "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
    ];
    let periods: Vec<serde_json::Value> = days
        .iter()
        .enumerate()
        .map(|(i, day)| {
            serde_json::json!({
                "number": i + 1,
                "name": day,
                "isDaytime": true,
                "temperature": 70 + i,
                "temperatureUnit": "F",
                "windSpeed": "5 to 10 mph",
                "windDirection": "W",
                "shortForecast": "Partly Sunny",
                "detailedForecast": format!("Partly sunny, with a high near {}.", 70 + i)
            })
        })
        .collect();
    serde_json::json!({ "properties": { "periods": periods } })
}

fn config(weather: &MockServer, llm: &MockServer, api_key: Option<&str>) -> ForecastConfig {
    let mut config = ForecastConfig::default();
    config.weather.base_url = weather.uri();
    config.weather.max_retries = 0;
    config.weather.timeout_seconds = 5;
    config.llm.base_url = llm.uri();
    config.llm.timeout_seconds = 5;
    config.llm.api_key = api_key.map(str::to_string);
    config.apply_defaults();
    config
}

async fn mount_points(weather: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/points/40.7000,-74.0000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "properties": {
                "forecast": format!("{}/gridpoints/OKX/33,35/forecast", weather.uri())
            }
        })))
        .expect(expected_calls)
        .mount(weather)
        .await;
}

async fn mount_gridpoint(weather: &MockServer, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/gridpoints/OKX/33,35/forecast"))
        .respond_with(response)
        .expect(expected_calls)
        .mount(weather)
        .await;
}

async fn mount_completion(llm: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": SUMMARY}}]
        })))
        .expect(expected_calls)
        .mount(llm)
        .await;
}

async fn send(config: &ForecastConfig, uri: &str) -> (StatusCode, Option<String>, String) {
    let state = AppState::from_config(config).unwrap();
    let app = web::app(state, &config.server);

    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

/// Fixed 7-day payload and a fixed completion come back verbatim
#[tokio::test]
async fn test_forecast_summary_success() {
    let weather = MockServer::start().await;
    let llm = MockServer::start().await;

    mount_points(&weather, 1).await;
    mount_gridpoint(
        &weather,
        ResponseTemplate::new(200).set_body_json(seven_day_periods()),
        1,
    )
    .await;
    mount_completion(&llm, 1).await;

    let config = config(&weather, &llm, Some("sk-test-key-123"));
    let (status, content_type, body) = send(&config, "/forecast/40.7/-74.0").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SUMMARY);
    assert!(content_type.unwrap().starts_with("text/plain"));

    // The prompt carries every period in order
    let requests = llm.received_requests().await.unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = payload["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.starts_with("Summarize this content:"));
    let monday = prompt.find("Monday is going to be").unwrap();
    let sunday = prompt.find("Sunday is going to be").unwrap();
    assert!(monday < sunday);
}

/// Weather lookup failure: upstream status and message, no LLM call
#[tokio::test]
async fn test_points_failure_skips_summarization() {
    let weather = MockServer::start().await;
    let llm = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/points/40.7000,-74.0000"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&weather)
        .await;
    mount_completion(&llm, 0).await;

    let config = config(&weather, &llm, Some("sk-test-key-123"));
    let (status, _, body) = send(&config, "/forecast/40.7/-74.0").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Failed to retrieve forecast data.");
}

#[tokio::test]
async fn test_detailed_forecast_failure_skips_summarization() {
    let weather = MockServer::start().await;
    let llm = MockServer::start().await;

    mount_points(&weather, 1).await;
    mount_gridpoint(&weather, ResponseTemplate::new(500), 1).await;
    mount_completion(&llm, 0).await;

    let config = config(&weather, &llm, Some("sk-test-key-123"));
    let (status, _, body) = send(&config, "/forecast/40.7/-74.0").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Failed to retrieve detailed forecast data.");
}

/// Without a credential the request fails and nothing unauthenticated is sent
#[tokio::test]
async fn test_missing_credential_fails_request() {
    let weather = MockServer::start().await;
    let llm = MockServer::start().await;

    mount_points(&weather, 1).await;
    mount_gridpoint(
        &weather,
        ResponseTemplate::new(200).set_body_json(seven_day_periods()),
        1,
    )
    .await;
    mount_completion(&llm, 0).await;

    let config = config(&weather, &llm, None);
    let (status, _, body) = send(&config, "/forecast/40.7/-74.0").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Summarization service is not configured.");
}

#[tokio::test]
async fn test_llm_failure_is_bad_gateway() {
    let weather = MockServer::start().await;
    let llm = MockServer::start().await;

    mount_points(&weather, 1).await;
    mount_gridpoint(
        &weather,
        ResponseTemplate::new(200).set_body_json(seven_day_periods()),
        1,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .expect(1)
        .mount(&llm)
        .await;

    let config = config(&weather, &llm, Some("sk-test-key-123"));
    let (status, _, body) = send(&config, "/forecast/40.7/-74.0").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Failed to summarize forecast data.");
}

#[tokio::test]
async fn test_gemini_backend() {
    let weather = MockServer::start().await;
    let llm = MockServer::start().await;

    mount_points(&weather, 1).await;
    mount_gridpoint(
        &weather,
        ResponseTemplate::new(200).set_body_json(seven_day_periods()),
        1,
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": SUMMARY}]}}]
        })))
        .expect(1)
        .mount(&llm)
        .await;

    let mut config = config(&weather, &llm, Some("gm-test-key-123"));
    config.llm.provider = LlmProvider::Gemini;
    config.llm.model = String::new();
    config.apply_defaults();

    let (status, _, body) = send(&config, "/forecast/40.7/-74.0").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SUMMARY);
}

#[tokio::test]
async fn test_non_numeric_coordinates_are_rejected() {
    let weather = MockServer::start().await;
    let llm = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&weather)
        .await;
    mount_completion(&llm, 0).await;

    let config = config(&weather, &llm, Some("sk-test-key-123"));
    let (status, _, body) = send(&config, "/forecast/abc/-74.0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("latitude 'abc' is not a number"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let weather = MockServer::start().await;
    let llm = MockServer::start().await;

    let config = config(&weather, &llm, Some("sk-test-key-123"));
    let (status, _, _) = send(&config, "/forecast/40.7").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_slow_upstream_hits_request_timeout() {
    let weather = MockServer::start().await;
    let llm = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/points/40.7000,-74.0000"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)))
        .mount(&weather)
        .await;
    mount_completion(&llm, 0).await;

    let mut config = config(&weather, &llm, Some("sk-test-key-123"));
    config.server.request_timeout_seconds = 1;
    let (status, _, _) = send(&config, "/forecast/40.7/-74.0").await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

// Integration tests for the HTTP scoring client
//
// Each test starts a fake `/analyze` service on an ephemeral port and points
// the client at it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use interview_coach::capture::RecordingPayload;
use interview_coach::scoring::{HttpScoringClient, ScoringClient, ScoringError};
use serde_json::json;

#[derive(Debug, Default, Clone)]
struct ReceivedForm {
    question_text: Option<String>,
    video: Option<Vec<u8>>,
    file_name: Option<String>,
    content_type: Option<String>,
}

type Received = Arc<Mutex<ReceivedForm>>;

async fn spawn_service(app: Router) -> Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{}/analyze", addr))
}

async fn analyze(State(received): State<Received>, mut multipart: Multipart) -> impl IntoResponse {
    let mut form = ReceivedForm::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name() {
            Some("video") => {
                form.file_name = field.file_name().map(str::to_string);
                form.content_type = field.content_type().map(str::to_string);
                form.video = field.bytes().await.ok().map(|b| b.to_vec());
            }
            Some("questionText") => form.question_text = field.text().await.ok(),
            _ => {}
        }
    }
    *received.lock().unwrap() = form;

    Json(json!({
        "question": "Tell me about yourself.",
        "finalScore": 7.5,
        "bodyLanguage": "Good eye contact",
        "answerQuality": "Structured and concise"
    }))
}

fn payload() -> RecordingPayload {
    RecordingPayload::new(b"fake-video".to_vec(), "video/mp4", 4_000)
}

#[tokio::test]
async fn test_submit_sends_multipart_and_parses_report() -> Result<()> {
    let received = Received::default();
    let app = Router::new()
        .route("/analyze", post(analyze))
        .with_state(received.clone());
    let url = spawn_service(app).await?;

    let client = HttpScoringClient::new(&url, Duration::from_secs(5))?;
    let report = client.submit("Tell me about yourself.", payload()).await?;

    assert_eq!(report.final_score, 7.5);
    assert_eq!(report.answer_quality, "Structured and concise");
    assert_eq!(report.body_language, "Good eye contact");

    let form = received.lock().unwrap().clone();
    assert_eq!(form.question_text.as_deref(), Some("Tell me about yourself."));
    assert_eq!(form.video.as_deref(), Some(&b"fake-video"[..]));
    assert_eq!(form.file_name.as_deref(), Some("response.mp4"));
    assert_eq!(form.content_type.as_deref(), Some("video/mp4"));

    Ok(())
}

#[tokio::test]
async fn test_server_error_carries_status_and_message() -> Result<()> {
    let app = Router::new().route(
        "/analyze",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to process video" })),
            )
        }),
    );
    let url = spawn_service(app).await?;

    let client = HttpScoringClient::new(&url, Duration::from_secs(5))?;
    let err = client.submit("Q", payload()).await.unwrap_err();

    assert_eq!(
        err,
        ScoringError::ServerError {
            status: Some(500),
            message: "Failed to process video".to_string(),
        }
    );

    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_server_error() -> Result<()> {
    let app = Router::new().route("/analyze", post(|| async { "not json" }));
    let url = spawn_service(app).await?;

    let client = HttpScoringClient::new(&url, Duration::from_secs(5))?;
    let err = client.submit("Q", payload()).await.unwrap_err();

    assert!(matches!(err, ScoringError::ServerError { .. }), "got {err:?}");

    Ok(())
}

#[tokio::test]
async fn test_out_of_range_score_is_clamped() -> Result<()> {
    let app = Router::new().route(
        "/analyze",
        post(|| async {
            Json(json!({
                "finalScore": 14,
                "bodyLanguage": "b",
                "answerQuality": "a"
            }))
        }),
    );
    let url = spawn_service(app).await?;

    let client = HttpScoringClient::new(&url, Duration::from_secs(5))?;
    let report = client.submit("Q", payload()).await?;

    assert_eq!(report.final_score, 10.0);

    Ok(())
}

#[tokio::test]
async fn test_slow_service_times_out() -> Result<()> {
    let app = Router::new().route(
        "/analyze",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let url = spawn_service(app).await?;

    let client = HttpScoringClient::new(&url, Duration::from_millis(100))?;
    let err = client.submit("Q", payload()).await.unwrap_err();

    assert_eq!(err, ScoringError::Timeout);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_service_is_network_failure() -> Result<()> {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = HttpScoringClient::new(
        &format!("http://{}/analyze", addr),
        Duration::from_secs(5),
    )?;
    let err = client.submit("Q", payload()).await.unwrap_err();

    assert!(matches!(err, ScoringError::NetworkFailure(_)), "got {err:?}");

    Ok(())
}

#[test]
fn test_invalid_endpoint_is_rejected() {
    assert!(HttpScoringClient::new("not a url", Duration::from_secs(1)).is_err());
}

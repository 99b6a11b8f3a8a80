use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::messages::{AnalyzeErrorResponse, AnalyzeResponse};
use crate::capture::RecordingPayload;

/// Highest score the scoring service hands out
pub const MAX_SCORE: f64 = 10.0;

/// Structured result of scoring one answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub answer_quality: String,
    pub body_language: String,
    pub final_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("scoring service unreachable: {0}")]
    NetworkFailure(String),

    #[error("scoring service error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    ServerError { status: Option<u16>, message: String },

    #[error("scoring request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ScoringError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ScoringError::Timeout
        } else if e.is_decode() {
            ScoringError::ServerError {
                status: e.status().map(|s| s.as_u16()),
                message: format!("malformed response: {e}"),
            }
        } else {
            ScoringError::NetworkFailure(e.to_string())
        }
    }
}

/// Sends a recorded answer to the external scoring service
///
/// Implementations hold no session state and perform no retries; many calls
/// may be outstanding at once.
#[async_trait::async_trait]
pub trait ScoringClient: Send + Sync {
    async fn submit(
        &self,
        question_text: &str,
        payload: RecordingPayload,
    ) -> Result<ScoreReport, ScoringError>;
}

/// Multipart HTTP client for the `/analyze` endpoint
#[derive(Clone)]
pub struct HttpScoringClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpScoringClient {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { endpoint, http })
    }
}

#[async_trait::async_trait]
impl ScoringClient for HttpScoringClient {
    async fn submit(
        &self,
        question_text: &str,
        payload: RecordingPayload,
    ) -> Result<ScoreReport, ScoringError> {
        info!(
            "Submitting {} byte recording to {}",
            payload.len(),
            self.endpoint
        );

        let video = Part::bytes(payload.bytes)
            .file_name("response.mp4")
            .mime_str(&payload.content_type)
            .map_err(|e| ScoringError::ServerError {
                status: None,
                message: format!("invalid content type {}: {}", payload.content_type, e),
            })?;

        let form = Form::new()
            .part("video", video)
            .text("questionText", question_text.to_string());

        let resp = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnalyzeErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);

            warn!("Scoring service returned {}: {}", status, message);
            return Err(ScoringError::ServerError {
                status: Some(status.as_u16()),
                message,
            });
        }

        let analysis = resp.json::<AnalyzeResponse>().await?;
        score_report(analysis)
    }
}

fn score_report(analysis: AnalyzeResponse) -> Result<ScoreReport, ScoringError> {
    if !analysis.final_score.is_finite() {
        return Err(ScoringError::ServerError {
            status: None,
            message: format!("non-numeric score {}", analysis.final_score),
        });
    }

    let final_score = analysis.final_score.clamp(0.0, MAX_SCORE);
    if final_score != analysis.final_score {
        warn!(
            "Clamped out-of-range score {} to {}",
            analysis.final_score, final_score
        );
    }

    Ok(ScoreReport {
        answer_quality: analysis.answer_quality,
        body_language: analysis.body_language,
        final_score,
    })
}

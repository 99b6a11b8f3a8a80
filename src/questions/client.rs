use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Url;
use thiserror::Error;
use tracing::{info, warn};

use super::messages::{GenerateQuestionsResponse, QuestionRequest};

static NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s*").expect("valid numbering pattern"));

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("question request failed: {0}")]
    Request(String),

    #[error("question service returned status {0}")]
    Status(u16),

    #[error("question service returned no questions")]
    EmptyResponse,
}

/// Produces the ordered question list a session is built from
#[async_trait::async_trait]
pub trait QuestionSource: Send + Sync {
    async fn generate(&self, request: &QuestionRequest) -> Result<Vec<String>, QuestionError>;
}

impl QuestionRequest {
    /// Reject requests with blank fields before they leave the process
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.role.trim().is_empty() {
            return Err(QuestionError::MissingField("role"));
        }
        if self.experience.trim().is_empty() {
            return Err(QuestionError::MissingField("experience"));
        }
        if self.domain.trim().is_empty() {
            return Err(QuestionError::MissingField("industry"));
        }
        Ok(())
    }
}

/// Strip list numbering and drop blank entries, keeping order
pub fn normalize_questions<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|line| NUMBERING.replace(line.as_ref(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// JSON client for `POST /generate-questions`
#[derive(Clone)]
pub struct HttpQuestionClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpQuestionClient {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { endpoint, http })
    }
}

#[async_trait::async_trait]
impl QuestionSource for HttpQuestionClient {
    async fn generate(&self, request: &QuestionRequest) -> Result<Vec<String>, QuestionError> {
        request.validate()?;

        info!(
            "Requesting {} questions for {} ({} years, {})",
            request.difficulty, request.role, request.experience, request.domain
        );

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| QuestionError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            warn!("Question service returned {}", resp.status());
            return Err(QuestionError::Status(resp.status().as_u16()));
        }

        let body = resp
            .json::<GenerateQuestionsResponse>()
            .await
            .map_err(|e| QuestionError::Request(e.to_string()))?;

        let questions = normalize_questions(body.questions);
        if questions.is_empty() {
            return Err(QuestionError::EmptyResponse);
        }

        info!("Received {} questions", questions.len());
        Ok(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::Difficulty;

    #[test]
    fn test_normalize_strips_numbering() {
        let raw = vec![
            "1. What is ownership?",
            "2) Explain borrowing.",
            "",
            "   ",
            "10.   Describe lifetimes.",
            "Why traits?",
        ];

        let questions = normalize_questions(raw);

        assert_eq!(
            questions,
            vec![
                "What is ownership?",
                "Explain borrowing.",
                "Describe lifetimes.",
                "Why traits?",
            ]
        );
    }

    #[test]
    fn test_normalize_keeps_inner_numbers() {
        let questions = normalize_questions(["How would you scale to 1000 users?"]);
        assert_eq!(questions, vec!["How would you scale to 1000 users?"]);
    }

    #[test]
    fn test_validate_reports_first_blank_field() {
        let request = QuestionRequest {
            role: "Backend engineer".to_string(),
            experience: " ".to_string(),
            domain: "fintech".to_string(),
            difficulty: Difficulty::Advanced,
        };

        assert!(matches!(
            request.validate(),
            Err(QuestionError::MissingField("experience"))
        ));
    }
}

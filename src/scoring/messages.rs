use serde::{Deserialize, Serialize};

/// Success body returned by the scoring service
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub question: Option<String>,
    pub final_score: f64,
    pub body_language: String,
    pub answer_quality: String,
}

/// Error body returned by the scoring service on 4xx/5xx
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeErrorResponse {
    pub error: String,
}

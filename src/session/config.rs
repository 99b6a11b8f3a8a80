use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for an interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (e.g., "interview-6f1c...")
    pub session_id: String,

    /// Length of the recording window per answer
    /// Default: 120 seconds
    pub answer_time_limit: Duration,

    /// MIME type of the recorded payload, forwarded to the scoring service
    pub content_type: String,
}

impl SessionConfig {
    pub fn answer_time_limit_secs(&self) -> u64 {
        self.answer_time_limit.as_secs()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("interview-{}", uuid::Uuid::new_v4()),
            answer_time_limit: Duration::from_secs(120), // 2 minutes per answer
            content_type: "video/mp4".to_string(),
        }
    }
}

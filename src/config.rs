use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::session::SessionConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub interview: InterviewConfig,
    pub scoring: ScoringConfig,
    pub questions: QuestionsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct InterviewConfig {
    pub answer_time_limit_secs: u64,
    pub content_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoringConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct QuestionsConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load `path` (any format the config crate knows) with `INTERVIEW__*`
    /// environment overrides, e.g. `INTERVIEW__SCORING__URL`
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("interview.answer_time_limit_secs", 120)?
            .set_default("interview.content_type", "video/mp4")?
            .set_default("scoring.timeout_secs", 120)?
            .set_default("questions.timeout_secs", 30)?
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("INTERVIEW").separator("__"))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }
}

impl InterviewConfig {
    /// Per-session settings with a freshly generated session id
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            answer_time_limit: Duration::from_secs(self.answer_time_limit_secs),
            content_type: self.content_type.clone(),
            ..SessionConfig::default()
        }
    }
}

impl ScoringConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl QuestionsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

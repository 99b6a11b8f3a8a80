pub mod client;
pub mod messages;

pub use client::{HttpScoringClient, ScoreReport, ScoringClient, ScoringError};
pub use messages::{AnalyzeErrorResponse, AnalyzeResponse};

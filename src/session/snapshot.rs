use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{AnswerStatus, SessionState, NOT_APPLICABLE_NOTE};

/// Read-only view of one question for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionView {
    pub ordinal: usize,
    pub text: String,
    pub status: AnswerStatus,
    pub score: Option<f64>,
    pub answer_quality: Option<String>,
    pub body_language: Option<String>,
    pub error_message: Option<String>,
    /// Whether a finished take is held for this question
    pub has_recording: bool,
}

/// Read-only view of a whole session, taken after every mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub questions: Vec<QuestionView>,
    pub current_index: usize,
    pub time_remaining_secs: u64,
    pub is_recording: bool,
    /// Scoring calls dispatched but not yet applied
    pub in_flight: usize,
    pub last_error: Option<String>,
    /// Every record is terminal, so `finish` would succeed
    pub can_finish: bool,
    /// Present once the session is finished
    pub results: Option<SessionResults>,
}

/// Final outcome for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub ordinal: usize,
    pub question: String,
    pub answer_quality: String,
    pub body_language: String,
    pub final_score: f64,
}

/// Frozen results of a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    pub results: Vec<QuestionResult>,
    /// Mean of every question's score, 0 for skipped or failed answers
    pub overall_score: f64,
    pub finished_at: DateTime<Utc>,
}

impl QuestionView {
    pub(crate) fn collect(state: &SessionState) -> Vec<Self> {
        state
            .questions()
            .iter()
            .filter_map(|q| {
                let record = state.record(q.ordinal)?;
                Some(Self {
                    ordinal: q.ordinal,
                    text: q.text.clone(),
                    status: record.status,
                    score: record.score,
                    answer_quality: record.answer_quality.clone(),
                    body_language: record.body_language.clone(),
                    error_message: record.error_message.clone(),
                    has_recording: record.recorded_payload.is_some(),
                })
            })
            .collect()
    }
}

impl SessionResults {
    /// Build results if every record has reached a terminal status
    pub fn from_state(state: &SessionState, finished_at: DateTime<Utc>) -> Option<Self> {
        let overall_score = state.overall_score()?;

        let results = state
            .questions()
            .iter()
            .filter_map(|q| {
                let record = state.record(q.ordinal)?;
                let note = |n: &Option<String>| {
                    n.clone()
                        .unwrap_or_else(|| NOT_APPLICABLE_NOTE.to_string())
                };
                Some(QuestionResult {
                    ordinal: q.ordinal,
                    question: q.text.clone(),
                    answer_quality: note(&record.answer_quality),
                    body_language: note(&record.body_language),
                    final_score: record.aggregate_score(),
                })
            })
            .collect();

        Some(Self {
            results,
            overall_score,
            finished_at,
        })
    }
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::SessionError;
use crate::capture::RecordingPayload;

/// Placeholder notes while a scoring call is outstanding
pub const PROCESSING_NOTE: &str = "Processing...";
/// Notes written when a scoring call fails
pub const FAILED_NOTE: &str = "Failed to process";
pub const SKIPPED_NOTE: &str = "Skipped";
pub const NOT_APPLICABLE_NOTE: &str = "N/A";

/// An interview question at a fixed position in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub ordinal: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    #[default]
    Unanswered,
    Recording,
    Recorded,
    Submitting,
    Scored,
    Skipped,
    FailedFinal,
}

impl AnswerStatus {
    /// No further progress happens without an explicit user retry
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AnswerStatus::Scored | AnswerStatus::Skipped | AnswerStatus::FailedFinal
        )
    }

    /// A recording window is open or a scoring call is outstanding
    pub fn is_busy(self) -> bool {
        matches!(self, AnswerStatus::Recording | AnswerStatus::Submitting)
    }

    /// Statuses from which a new recording or submission may not start
    pub fn blocks_entry(self) -> bool {
        self.is_busy() || matches!(self, AnswerStatus::Scored | AnswerStatus::Skipped)
    }
}

/// Recording/submission/scoring progress for one question
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerRecord {
    pub status: AnswerStatus,
    pub recorded_payload: Option<RecordingPayload>,
    pub score: Option<f64>,
    pub answer_quality: Option<String>,
    pub body_language: Option<String>,
    pub error_message: Option<String>,
}

impl AnswerRecord {
    /// Back to a fresh `Unanswered` record
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Score used for the session average; anything non-numeric counts as 0
    pub fn aggregate_score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// Ordered questions, one answer record per question, and the current pointer
#[derive(Debug, Clone)]
pub struct SessionState {
    questions: Vec<Question>,
    records: BTreeMap<usize, AnswerRecord>,
    current_index: usize,
}

impl SessionState {
    pub fn new<I, S>(questions: I) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let questions: Vec<Question> = questions
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| Question {
                ordinal,
                text: text.into(),
            })
            .collect();

        if questions.is_empty() {
            return Err(SessionError::EmptyQuestionList);
        }

        let records = questions
            .iter()
            .map(|q| (q.ordinal, AnswerRecord::default()))
            .collect();

        Ok(Self {
            questions,
            records,
            current_index: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, ordinal: usize) -> Option<&Question> {
        self.questions.get(ordinal)
    }

    pub fn record(&self, ordinal: usize) -> Option<&AnswerRecord> {
        self.records.get(&ordinal)
    }

    pub(crate) fn record_mut(&mut self, ordinal: usize) -> Option<&mut AnswerRecord> {
        self.records.get_mut(&ordinal)
    }

    /// Records in ordinal order
    pub fn records(&self) -> impl Iterator<Item = (usize, &AnswerRecord)> {
        self.records.iter().map(|(ordinal, record)| (*ordinal, record))
    }

    pub fn status(&self, ordinal: usize) -> Option<AnswerStatus> {
        self.record(ordinal).map(|r| r.status)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub(crate) fn set_current_index(&mut self, ordinal: usize) -> Result<(), SessionError> {
        if ordinal >= self.len() {
            return Err(SessionError::QuestionOutOfRange {
                ordinal,
                len: self.len(),
            });
        }
        self.current_index = ordinal;
        Ok(())
    }

    /// Ordinals that still block finishing the session
    pub fn pending_ordinals(&self) -> Vec<usize> {
        self.records()
            .filter(|(_, r)| !r.status.is_terminal())
            .map(|(ordinal, _)| ordinal)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.records.values().all(|r| r.status.is_terminal())
    }

    /// Mean score over all questions, available once every record is terminal
    pub fn overall_score(&self) -> Option<f64> {
        if !self.is_complete() {
            return None;
        }

        let total: f64 = self.records.values().map(AnswerRecord::aggregate_score).sum();
        Some(total / self.len() as f64)
    }

    /// First `Unanswered` question after `from`, wrapping around to the start
    pub fn next_unanswered_after(&self, from: usize) -> Option<usize> {
        let len = self.len();
        (1..len)
            .map(|offset| (from + offset) % len)
            .find(|ordinal| self.status(*ordinal) == Some(AnswerStatus::Unanswered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_blocked_while_busy_or_final() {
        use AnswerStatus::*;

        for status in [Recording, Submitting] {
            assert!(status.is_busy());
            assert!(status.blocks_entry());
        }
        for status in [Scored, Skipped] {
            assert!(!status.is_busy());
            assert!(status.blocks_entry());
        }
        for status in [Unanswered, Recorded, FailedFinal] {
            assert!(!status.blocks_entry());
        }
    }

    #[test]
    fn test_new_rejects_empty_question_list() {
        let result = SessionState::new(Vec::<String>::new());
        assert!(matches!(result, Err(SessionError::EmptyQuestionList)));
    }

    #[test]
    fn test_new_creates_one_unanswered_record_per_question() {
        let state = SessionState::new(["a", "b", "c"]).unwrap();

        let ordinals: Vec<usize> = state.records().map(|(ordinal, _)| ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert!(state
            .records()
            .all(|(_, r)| r.status == AnswerStatus::Unanswered));
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.current_question().text, "a");
    }

    #[test]
    fn test_next_unanswered_wraps_around() {
        let mut state = SessionState::new(["a", "b", "c", "d"]).unwrap();
        state.record_mut(2).unwrap().status = AnswerStatus::Skipped;
        state.record_mut(3).unwrap().status = AnswerStatus::Submitting;

        assert_eq!(state.next_unanswered_after(1), Some(0));
        assert_eq!(state.next_unanswered_after(0), Some(1));
    }

    #[test]
    fn test_next_unanswered_none_when_all_taken() {
        let mut state = SessionState::new(["a", "b"]).unwrap();
        state.record_mut(1).unwrap().status = AnswerStatus::Scored;

        assert_eq!(state.next_unanswered_after(0), None);
    }

    #[test]
    fn test_overall_score_requires_every_record_terminal() {
        let mut state = SessionState::new(["a", "b"]).unwrap();
        let first = state.record_mut(0).unwrap();
        first.status = AnswerStatus::Scored;
        first.score = Some(6.0);

        assert_eq!(state.overall_score(), None);
        assert_eq!(state.pending_ordinals(), vec![1]);

        state.record_mut(1).unwrap().status = AnswerStatus::FailedFinal;

        assert_eq!(state.overall_score(), Some(3.0));
        assert!(state.pending_ordinals().is_empty());
    }

    #[test]
    fn test_set_current_index_out_of_range() {
        let mut state = SessionState::new(["a"]).unwrap();
        let result = state.set_current_index(1);
        assert!(matches!(
            result,
            Err(SessionError::QuestionOutOfRange { ordinal: 1, len: 1 })
        ));
    }
}

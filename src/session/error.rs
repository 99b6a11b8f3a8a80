use thiserror::Error;

use super::state::AnswerStatus;
use crate::capture::CaptureError;

/// Errors surfaced synchronously to the caller of a session intent
///
/// None of these are fatal; the controller also keeps the latest message for
/// presentation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("an interview session needs at least one question")]
    EmptyQuestionList,

    #[error("Question {} has already been answered or is being processed ({status:?}).", .ordinal + 1)]
    QuestionBusyOrAnswered { ordinal: usize, status: AnswerStatus },

    #[error("Please record a video for question {} first!", .ordinal + 1)]
    NoRecordingPresent { ordinal: usize },

    #[error("no recording in progress")]
    NotRecording,

    #[error("Please answer or skip all questions before finishing ({} pending).", .pending.len())]
    IncompleteSession { pending: Vec<usize> },

    #[error("question {ordinal} is out of range (session has {len} questions)")]
    QuestionOutOfRange { ordinal: usize, len: usize },

    #[error("session already finished")]
    SessionFinished,

    #[error("session is closed")]
    SessionClosed,

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

//! Interview session orchestration
//!
//! This module provides the `SessionController` that manages:
//! - Per-question answer status (record, submit, retry, skip)
//! - The bounded recording window and its capture device
//! - Scoring calls that resolve after the user has moved on
//! - Session completion and the overall score

mod config;
mod controller;
mod error;
mod event;
mod handle;
mod snapshot;
mod state;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use error::SessionError;
pub use event::{ControllerEvent, Intent, Navigation};
pub use handle::SessionHandle;
pub use snapshot::{QuestionResult, QuestionView, SessionResults, SessionSnapshot};
pub use state::{
    AnswerRecord, AnswerStatus, Question, SessionState, FAILED_NOTE, NOT_APPLICABLE_NOTE,
    PROCESSING_NOTE, SKIPPED_NOTE,
};

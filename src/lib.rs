pub mod capture;
pub mod config;
pub mod http;
pub mod questions;
pub mod scoring;
pub mod session;
pub mod timer;

pub use capture::{CaptureDevice, CaptureError, CaptureFeed, RecordingPayload, StreamCaptureDevice};
pub use config::Config;
pub use http::{create_router, AppState};
pub use questions::{Difficulty, HttpQuestionClient, QuestionRequest, QuestionSource};
pub use scoring::{HttpScoringClient, ScoreReport, ScoringClient, ScoringError};
pub use session::{
    AnswerStatus, Intent, Navigation, SessionConfig, SessionController, SessionError,
    SessionHandle, SessionResults, SessionSnapshot,
};
pub use timer::{CountdownEvent, CountdownTimer};

//! Client side of the question-generation service
//!
//! Sessions are built from the ordered list this service returns. The
//! language-model call itself happens behind the service; we only validate the
//! request and tidy up what comes back.

mod client;
mod messages;

pub use client::{normalize_questions, HttpQuestionClient, QuestionError, QuestionSource};
pub use messages::{Difficulty, GenerateQuestionsResponse, QuestionRequest};

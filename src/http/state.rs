use crate::capture::{CaptureFeed, StreamCaptureDevice};
use crate::questions::QuestionSource;
use crate::scoring::ScoringClient;
use crate::session::{SessionConfig, SessionController, SessionError, SessionHandle};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A running session plus the feed its browser client uploads media into
#[derive(Clone)]
pub struct SessionEntry {
    pub handle: SessionHandle,
    pub feed: CaptureFeed,
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active interview sessions (session_id → session)
    pub sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,

    /// Scoring service shared by every session
    pub scorer: Arc<dyn ScoringClient>,

    /// Question generator used when a session is created from a profile
    pub questions: Arc<dyn QuestionSource>,

    /// Settings copied into each new session (the id is regenerated)
    pub session_template: SessionConfig,
}

impl AppState {
    pub fn new(
        scorer: Arc<dyn ScoringClient>,
        questions: Arc<dyn QuestionSource>,
        session_template: SessionConfig,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            scorer,
            questions,
            session_template,
        }
    }

    /// Build a controller for `questions`, start it, and register it
    pub async fn create_session(&self, questions: Vec<String>) -> Result<SessionEntry, SessionError> {
        let config = SessionConfig {
            session_id: SessionConfig::default().session_id,
            ..self.session_template.clone()
        };

        let device = StreamCaptureDevice::new(
            format!("browser-{}", config.session_id),
            config.content_type.clone(),
        );
        let feed = device.feed();

        let controller = SessionController::new(
            questions,
            config,
            Box::new(device),
            Arc::clone(&self.scorer),
        )?;

        let entry = SessionEntry {
            handle: SessionHandle::spawn(controller),
            feed,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(entry.handle.session_id().to_string(), entry.clone());

        Ok(entry)
    }

    pub async fn session(&self, session_id: &str) -> Option<SessionEntry> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    pub async fn remove_session(&self, session_id: &str) -> Option<SessionEntry> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id)
    }
}

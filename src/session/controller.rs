use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::config::SessionConfig;
use super::error::SessionError;
use super::event::{ControllerEvent, Intent, Navigation};
use super::snapshot::{QuestionView, SessionResults, SessionSnapshot};
use super::state::{
    AnswerStatus, SessionState, FAILED_NOTE, NOT_APPLICABLE_NOTE, PROCESSING_NOTE, SKIPPED_NOTE,
};
use crate::capture::{CaptureDevice, RecordingPayload};
use crate::scoring::{ScoreReport, ScoringClient, ScoringError};
use crate::timer::{CountdownEvent, CountdownId, CountdownTimer};

/// The live recording window: which question it belongs to and which
/// countdown guards it
#[derive(Debug, Clone, Copy)]
struct RecordingAttempt {
    ordinal: usize,
    countdown: CountdownId,
}

/// Orchestrates one interview session
///
/// Single writer: every mutation of the session state goes through `&mut self`,
/// either from a user intent or from an event pulled off the controller's own
/// queue. Timer ticks and scoring results are posted into that queue by
/// background tasks and only take effect when handled here.
pub struct SessionController {
    config: SessionConfig,
    state: SessionState,
    device: Box<dyn CaptureDevice>,
    scorer: Arc<dyn ScoringClient>,
    timer: CountdownTimer<ControllerEvent>,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    events_rx: mpsc::UnboundedReceiver<ControllerEvent>,
    recording: Option<RecordingAttempt>,
    time_remaining_secs: u64,
    in_flight: usize,
    last_error: Option<String>,
    started_at: DateTime<Utc>,
    results: Option<SessionResults>,
    closed: bool,
}

impl SessionController {
    /// Create a session over an ordered, non-empty question list
    pub fn new<I, S>(
        questions: I,
        config: SessionConfig,
        device: Box<dyn CaptureDevice>,
        scorer: Arc<dyn ScoringClient>,
    ) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = SessionState::new(questions)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let timer = CountdownTimer::new(events_tx.clone());

        info!(
            "Creating interview session: {} ({} questions, {}s per answer, device {})",
            config.session_id,
            state.len(),
            config.answer_time_limit_secs(),
            device.name()
        );

        Ok(Self {
            time_remaining_secs: config.answer_time_limit_secs(),
            config,
            state,
            device,
            scorer,
            timer,
            events_tx,
            events_rx,
            recording: None,
            in_flight: 0,
            last_error: None,
            started_at: Utc::now(),
            results: None,
            closed: false,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn results(&self) -> Option<&SessionResults> {
        self.results.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn time_remaining_secs(&self) -> u64 {
        self.time_remaining_secs
    }

    /// Scoring calls dispatched whose results have not been applied yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.config.session_id.clone(),
            started_at: self.started_at,
            questions: QuestionView::collect(&self.state),
            current_index: self.state.current_index(),
            time_remaining_secs: self.time_remaining_secs,
            is_recording: self.is_recording(),
            in_flight: self.in_flight,
            last_error: self.last_error.clone(),
            can_finish: self.results.is_none() && self.state.is_complete(),
            results: self.results.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------------

    pub async fn apply(&mut self, intent: Intent) -> Result<(), SessionError> {
        match intent {
            Intent::StartRecording => self.start_recording().await,
            Intent::StopRecording => self.stop_recording().await,
            Intent::Submit => self.submit().await,
            Intent::Retry => self.retry().await,
            Intent::Skip => self.skip().await,
            Intent::Navigate(target) => self.navigate(target).await,
            Intent::Finish => self.finish().await.map(|_| ()),
        }
    }

    /// Open a recording window on the current question
    pub async fn start_recording(&mut self) -> Result<(), SessionError> {
        let result = self.try_start_recording().await;
        self.note_outcome(result)
    }

    /// Close the recording window early and keep the take
    pub async fn stop_recording(&mut self) -> Result<(), SessionError> {
        let result = match self.ensure_open() {
            Ok(()) => match self.recording.take() {
                Some(attempt) => self.finalize_recording(attempt).await,
                None => Err(SessionError::NotRecording),
            },
            Err(e) => Err(e),
        };
        self.note_outcome(result)
    }

    /// Send the current question's take for scoring and move on
    pub async fn submit(&mut self) -> Result<(), SessionError> {
        let result = self.try_submit().await;
        self.note_outcome(result)
    }

    /// Throw away the current question's take (or failed result) so it can be
    /// recorded again
    pub async fn retry(&mut self) -> Result<(), SessionError> {
        let result = self.try_retry().await;
        self.note_outcome(result)
    }

    /// Give up on the current question for good
    pub async fn skip(&mut self) -> Result<(), SessionError> {
        let result = self.try_skip();
        self.note_outcome(result)
    }

    pub async fn navigate(&mut self, target: Navigation) -> Result<(), SessionError> {
        let result = self.try_navigate(target).await;
        self.note_outcome(result)
    }

    /// Freeze the session and compute the overall score
    pub async fn finish(&mut self) -> Result<SessionResults, SessionError> {
        let result = self.try_finish().await;
        self.note_outcome(result)
    }

    /// Abandon the session: release the device and stop the countdown
    ///
    /// Scoring calls already dispatched keep running; their results are
    /// applied if the controller is still around to receive them.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }

        self.release_device().await;
        self.closed = true;

        info!(
            "Interview session closed: {} ({} scoring calls in flight)",
            self.config.session_id, self.in_flight
        );
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Wait for the next queued event
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        self.events_rx.recv().await
    }

    /// Wait for the next event and apply it
    pub async fn process_next_event(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.handle_event(event).await;
                true
            }
            None => false,
        }
    }

    /// Apply everything already queued without waiting
    pub async fn process_pending_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event).await;
            handled += 1;
        }
        handled
    }

    pub async fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Countdown(CountdownEvent::Tick { id, remaining_secs }) => {
                if self.is_current_countdown(id) {
                    self.time_remaining_secs = remaining_secs;
                } else {
                    debug!("Ignoring tick from superseded countdown {:?}", id);
                }
            }
            ControllerEvent::Countdown(CountdownEvent::Expired { id }) => {
                if !self.is_current_countdown(id) {
                    debug!("Ignoring expiry from superseded countdown {:?}", id);
                    return;
                }
                let Some(attempt) = self.recording.take() else {
                    return;
                };

                info!(
                    "Recording window expired for question {}; stopping automatically",
                    attempt.ordinal + 1
                );
                self.time_remaining_secs = 0;
                if let Err(e) = self.finalize_recording(attempt).await {
                    warn!("Automatic stop failed: {}", e);
                    self.last_error = Some(e.to_string());
                }
            }
            ControllerEvent::Scored { ordinal, result } => self.apply_score(ordinal, result),
        }
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    async fn try_start_recording(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;

        let ordinal = self.state.current_index();
        let status = self.current_status();
        if status.blocks_entry() {
            return Err(SessionError::QuestionBusyOrAnswered { ordinal, status });
        }

        if self.device.is_acquired() {
            warn!("Capture device still live before a new recording; discarding");
            self.device.discard().await;
        }
        self.device.acquire().await?;

        if let Some(record) = self.state.record_mut(ordinal) {
            // Recorded and FailedFinal takes are replaced by the new one
            record.reset();
            record.status = AnswerStatus::Recording;
        }

        let limit = self.config.answer_time_limit_secs();
        let countdown = self.timer.start(limit);
        self.recording = Some(RecordingAttempt { ordinal, countdown });
        self.time_remaining_secs = limit;

        info!(
            "Recording started for question {} ({}s window)",
            ordinal + 1,
            limit
        );

        Ok(())
    }

    /// Shared by manual stop and countdown expiry
    async fn finalize_recording(&mut self, attempt: RecordingAttempt) -> Result<(), SessionError> {
        self.timer.cancel();
        let outcome = self.device.stop().await;

        let Some(record) = self.state.record_mut(attempt.ordinal) else {
            return Ok(());
        };

        match outcome {
            Ok(Some(payload)) => {
                info!(
                    "Recording finished for question {} ({} bytes)",
                    attempt.ordinal + 1,
                    payload.len()
                );
                record.status = AnswerStatus::Recorded;
                record.recorded_payload = Some(payload);
                Ok(())
            }
            Ok(None) => {
                record.reset();
                Err(SessionError::NoRecordingPresent {
                    ordinal: attempt.ordinal,
                })
            }
            Err(e) => {
                error!("Failed to finalize recording: {}", e);
                record.reset();
                Err(e.into())
            }
        }
    }

    async fn try_submit(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;

        let ordinal = self.state.current_index();
        let status = self.current_status();
        match status {
            AnswerStatus::Recorded => {}
            AnswerStatus::Unanswered | AnswerStatus::FailedFinal => {
                return Err(SessionError::NoRecordingPresent { ordinal })
            }
            _ => return Err(SessionError::QuestionBusyOrAnswered { ordinal, status }),
        }

        let question_text = self.state.current_question().text.clone();
        let len = self.state.len();
        let record = self
            .state
            .record_mut(ordinal)
            .ok_or(SessionError::QuestionOutOfRange { ordinal, len })?;
        let Some(payload) = record.recorded_payload.clone() else {
            return Err(SessionError::NoRecordingPresent { ordinal });
        };

        record.status = AnswerStatus::Submitting;
        record.answer_quality = Some(PROCESSING_NOTE.to_string());
        record.body_language = Some(PROCESSING_NOTE.to_string());
        record.score = None;
        record.error_message = None;

        self.release_device().await;
        self.time_remaining_secs = self.config.answer_time_limit_secs();
        self.advance_from(ordinal);
        self.dispatch_scoring(ordinal, question_text, payload);

        Ok(())
    }

    fn dispatch_scoring(&mut self, ordinal: usize, question_text: String, payload: RecordingPayload) {
        let scorer = Arc::clone(&self.scorer);
        let events = self.events_tx.clone();
        self.in_flight += 1;

        info!(
            "Dispatching scoring for question {} ({} in flight)",
            ordinal + 1,
            self.in_flight
        );

        tokio::spawn(async move {
            let result = scorer.submit(&question_text, payload).await;
            if events.send(ControllerEvent::Scored { ordinal, result }).is_err() {
                warn!(
                    "Scoring result for question {} arrived after the session ended",
                    ordinal + 1
                );
            }
        });
    }

    /// Applied by ordinal, whatever the current question is by now
    fn apply_score(&mut self, ordinal: usize, result: Result<ScoreReport, ScoringError>) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let Some(record) = self.state.record_mut(ordinal) else {
            warn!("Scoring result for unknown question {}", ordinal);
            return;
        };
        if record.status != AnswerStatus::Submitting {
            warn!(
                "Dropping scoring result for question {} in status {:?}",
                ordinal + 1,
                record.status
            );
            return;
        }

        match result {
            Ok(report) => {
                info!(
                    "Question {} scored {:.2}",
                    ordinal + 1,
                    report.final_score
                );
                record.status = AnswerStatus::Scored;
                record.score = Some(report.final_score);
                record.answer_quality = Some(report.answer_quality);
                record.body_language = Some(report.body_language);
                record.error_message = None;
                record.recorded_payload = None;
            }
            Err(e) => {
                error!("Scoring failed for question {}: {}", ordinal + 1, e);
                record.status = AnswerStatus::FailedFinal;
                record.score = Some(0.0);
                record.answer_quality = Some(FAILED_NOTE.to_string());
                record.body_language = Some(FAILED_NOTE.to_string());
                record.error_message = Some(e.to_string());
                self.last_error = Some(format!(
                    "Failed to analyze video for question {}. Please try again or skip this question.",
                    ordinal + 1
                ));
            }
        }
    }

    async fn try_retry(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;

        let ordinal = self.state.current_index();
        let status = self.current_status();
        match status {
            AnswerStatus::Unanswered => return Ok(()),
            AnswerStatus::Recording => {
                self.release_device().await;
            }
            AnswerStatus::Recorded | AnswerStatus::FailedFinal => {
                if let Some(record) = self.state.record_mut(ordinal) {
                    record.reset();
                }
            }
            AnswerStatus::Submitting | AnswerStatus::Scored | AnswerStatus::Skipped => {
                return Err(SessionError::QuestionBusyOrAnswered { ordinal, status });
            }
        }

        self.time_remaining_secs = self.config.answer_time_limit_secs();
        info!("Question {} reset for another take", ordinal + 1);

        Ok(())
    }

    fn try_skip(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;

        let ordinal = self.state.current_index();
        let status = self.current_status();
        if status != AnswerStatus::Unanswered {
            return Err(SessionError::QuestionBusyOrAnswered { ordinal, status });
        }

        if let Some(record) = self.state.record_mut(ordinal) {
            record.status = AnswerStatus::Skipped;
            record.score = Some(0.0);
            record.answer_quality = Some(SKIPPED_NOTE.to_string());
            record.body_language = Some(NOT_APPLICABLE_NOTE.to_string());
        }

        info!("Question {} skipped", ordinal + 1);
        self.advance_from(ordinal);

        Ok(())
    }

    async fn try_navigate(&mut self, target: Navigation) -> Result<(), SessionError> {
        self.ensure_open()?;

        let current = self.state.current_index();
        let len = self.state.len();
        let target = match target {
            Navigation::Next if current + 1 < len => current + 1,
            Navigation::Previous if current > 0 => current - 1,
            Navigation::Next | Navigation::Previous => return Ok(()),
            Navigation::To(ordinal) if ordinal >= len => {
                return Err(SessionError::QuestionOutOfRange { ordinal, len })
            }
            Navigation::To(ordinal) => ordinal,
        };

        if target == current {
            return Ok(());
        }

        // Leaving mid-recording throws the take away
        self.release_device().await;
        self.state.set_current_index(target)?;
        self.time_remaining_secs = self.config.answer_time_limit_secs();

        debug!("Navigated to question {}", target + 1);

        Ok(())
    }

    async fn try_finish(&mut self) -> Result<SessionResults, SessionError> {
        self.ensure_open()?;

        let Some(results) = SessionResults::from_state(&self.state, Utc::now()) else {
            return Err(SessionError::IncompleteSession {
                pending: self.state.pending_ordinals(),
            });
        };

        self.release_device().await;
        self.results = Some(results.clone());

        info!(
            "Interview session finished: {} (overall score {:.2})",
            self.config.session_id, results.overall_score
        );

        Ok(results)
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::SessionClosed);
        }
        if self.results.is_some() {
            return Err(SessionError::SessionFinished);
        }
        Ok(())
    }

    fn current_status(&self) -> AnswerStatus {
        self.state
            .status(self.state.current_index())
            .unwrap_or_default()
    }

    fn is_current_countdown(&self, id: CountdownId) -> bool {
        self.recording.is_some_and(|attempt| attempt.countdown == id)
    }

    /// Move to the next unanswered question, if any is left
    fn advance_from(&mut self, ordinal: usize) {
        if let Some(next) = self.state.next_unanswered_after(ordinal) {
            if self.state.set_current_index(next).is_ok() {
                debug!("Advanced to question {}", next + 1);
            }
        }
    }

    /// Cancel the countdown, discard any live capture, and put an abandoned
    /// recording back to `Unanswered`
    async fn release_device(&mut self) {
        self.timer.cancel();

        if let Some(attempt) = self.recording.take() {
            if let Some(record) = self.state.record_mut(attempt.ordinal) {
                if record.status == AnswerStatus::Recording {
                    record.reset();
                }
            }
            info!(
                "Recording discarded for question {}",
                attempt.ordinal + 1
            );
        }

        if self.device.is_acquired() {
            self.device.discard().await;
        }
    }

    fn note_outcome<T>(&mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(e) => {
                warn!("Session {}: {}", self.config.session_id, e);
                self.last_error = Some(e.to_string());
            }
        }
        result
    }
}

// Shared fakes for integration tests
//
// ScriptedDevice stands in for the browser camera, ScriptedScorer answers
// immediately, and GatedScorer holds each answer until the test releases it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use interview_coach::capture::{CaptureDevice, CaptureError, RecordingPayload};
use interview_coach::scoring::{ScoreReport, ScoringClient, ScoringError};
use interview_coach::session::{SessionConfig, SessionController};
use tokio::sync::oneshot;

pub const QUESTIONS: [&str; 3] = [
    "Tell me about yourself.",
    "Describe a difficult bug you fixed.",
    "Where do you see yourself in five years?",
];

pub fn test_config() -> SessionConfig {
    SessionConfig {
        session_id: "test-session".to_string(),
        answer_time_limit: Duration::from_secs(120),
        content_type: "video/mp4".to_string(),
    }
}

pub fn report(score: f64) -> ScoreReport {
    ScoreReport {
        answer_quality: format!("Answer quality {score}"),
        body_language: format!("Body language {score}"),
        final_score: score,
    }
}

// ============================================================================
// Capture device
// ============================================================================

#[derive(Default)]
struct ProbeInner {
    acquires: AtomicUsize,
    stops: AtomicUsize,
    discards: AtomicUsize,
    live: AtomicBool,
    next_acquire_error: Mutex<Option<CaptureError>>,
}

/// Test-side view of a [`ScriptedDevice`] after it moved into a controller
#[derive(Clone, Default)]
pub struct DeviceProbe {
    inner: Arc<ProbeInner>,
}

impl DeviceProbe {
    pub fn acquires(&self) -> usize {
        self.inner.acquires.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.inner.stops.load(Ordering::SeqCst)
    }

    pub fn discards(&self) -> usize {
        self.inner.discards.load(Ordering::SeqCst)
    }

    pub fn is_live(&self) -> bool {
        self.inner.live.load(Ordering::SeqCst)
    }

    /// Make the next `acquire()` fail with `error`
    pub fn fail_next_acquire(&self, error: CaptureError) {
        *self.inner.next_acquire_error.lock().unwrap() = Some(error);
    }
}

/// Capture device that produces a small fixed payload per take
pub struct ScriptedDevice {
    probe: DeviceProbe,
    takes: usize,
}

impl ScriptedDevice {
    pub fn new() -> (Self, DeviceProbe) {
        let probe = DeviceProbe::default();
        (
            Self {
                probe: probe.clone(),
                takes: 0,
            },
            probe,
        )
    }
}

#[async_trait::async_trait]
impl CaptureDevice for ScriptedDevice {
    async fn acquire(&mut self) -> Result<(), CaptureError> {
        if let Some(error) = self.probe.inner.next_acquire_error.lock().unwrap().take() {
            return Err(error);
        }
        if self.probe.is_live() {
            return Err(CaptureError::DeviceUnavailable("already live".to_string()));
        }

        self.probe.inner.acquires.fetch_add(1, Ordering::SeqCst);
        self.probe.inner.live.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&mut self) -> Result<Option<RecordingPayload>, CaptureError> {
        if !self.probe.inner.live.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }

        self.probe.inner.stops.fetch_add(1, Ordering::SeqCst);
        self.takes += 1;
        let bytes = format!("take-{}", self.takes).into_bytes();
        Ok(Some(RecordingPayload::new(bytes, "video/mp4", 1_000)))
    }

    async fn discard(&mut self) {
        if self.probe.inner.live.swap(false, Ordering::SeqCst) {
            self.probe.inner.discards.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_acquired(&self) -> bool {
        self.probe.is_live()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// Scorers
// ============================================================================

/// Resolves immediately with a per-question outcome; unknown questions score 5
#[derive(Default)]
pub struct ScriptedScorer {
    outcomes: Mutex<HashMap<String, Result<ScoreReport, ScoringError>>>,
    calls: AtomicUsize,
}

impl ScriptedScorer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answer(&self, question: &str, outcome: Result<ScoreReport, ScoringError>) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(question.to_string(), outcome);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ScoringClient for ScriptedScorer {
    async fn submit(
        &self,
        question_text: &str,
        _payload: RecordingPayload,
    ) -> Result<ScoreReport, ScoringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .unwrap()
            .get(question_text)
            .cloned()
            .unwrap_or_else(|| Ok(report(5.0)))
    }
}

type Gate = oneshot::Sender<Result<ScoreReport, ScoringError>>;

/// Holds every scoring call until the test opens that question's gate
#[derive(Default)]
pub struct GatedScorer {
    pending: Mutex<HashMap<String, oneshot::Receiver<Result<ScoreReport, ScoringError>>>>,
    gates: Mutex<HashMap<String, Gate>>,
    payloads: Mutex<Vec<(String, RecordingPayload)>>,
}

impl GatedScorer {
    pub fn new<'a>(questions: impl IntoIterator<Item = &'a str>) -> Arc<Self> {
        let scorer = Self::default();
        for question in questions {
            scorer.arm(question);
        }
        Arc::new(scorer)
    }

    /// Install a fresh gate for `question`, e.g. before a second submission
    pub fn arm(&self, question: &str) {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(question.to_string(), tx);
        self.pending.lock().unwrap().insert(question.to_string(), rx);
    }

    pub fn release(&self, question: &str, outcome: Result<ScoreReport, ScoringError>) {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .remove(question)
            .unwrap_or_else(|| panic!("no gate armed for {question:?}"));
        let _ = gate.send(outcome);
    }

    /// Questions submitted so far, with the payload each one carried
    pub fn submissions(&self) -> Vec<(String, RecordingPayload)> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ScoringClient for GatedScorer {
    async fn submit(
        &self,
        question_text: &str,
        payload: RecordingPayload,
    ) -> Result<ScoreReport, ScoringError> {
        self.payloads
            .lock()
            .unwrap()
            .push((question_text.to_string(), payload));

        let gate = self.pending.lock().unwrap().remove(question_text);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ScoringError::NetworkFailure("gate dropped".to_string()))),
            None => Err(ScoringError::NetworkFailure(format!(
                "no gate for {question_text:?}"
            ))),
        }
    }
}

// ============================================================================
// Controller helpers
// ============================================================================

pub fn controller_with(
    scorer: Arc<dyn ScoringClient>,
) -> (SessionController, DeviceProbe) {
    let (device, probe) = ScriptedDevice::new();
    let controller = SessionController::new(QUESTIONS, test_config(), Box::new(device), scorer)
        .expect("three questions");
    (controller, probe)
}

/// Record and stop a take on the current question
pub async fn record_take(controller: &mut SessionController) {
    controller.start_recording().await.expect("start recording");
    controller.stop_recording().await.expect("stop recording");
}

/// Handle events until every dispatched scoring call has been applied
pub async fn settle(controller: &mut SessionController) {
    while controller.in_flight() > 0 {
        assert!(controller.process_next_event().await, "event queue closed");
    }
}

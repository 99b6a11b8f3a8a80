use serde::{Deserialize, Serialize};

use crate::scoring::{ScoreReport, ScoringError};
use crate::timer::CountdownEvent;

/// External events delivered into the controller's queue
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// Tick or expiry from the recording countdown
    Countdown(CountdownEvent),
    /// A scoring call resolved; tagged with the ordinal it was dispatched for
    Scored {
        ordinal: usize,
        result: Result<ScoreReport, ScoringError>,
    },
}

impl From<CountdownEvent> for ControllerEvent {
    fn from(event: CountdownEvent) -> Self {
        ControllerEvent::Countdown(event)
    }
}

/// Where to move the current-question pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Navigation {
    Next,
    Previous,
    To(usize),
}

/// User intents accepted by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    StartRecording,
    StopRecording,
    Submit,
    Retry,
    Skip,
    Navigate(Navigation),
    Finish,
}

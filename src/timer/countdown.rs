use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

/// Identifies one `start()` of a [`CountdownTimer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountdownId(pub u64);

/// Events emitted by a running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// One whole second elapsed
    Tick { id: CountdownId, remaining_secs: u64 },
    /// The countdown reached zero; emitted exactly once per start
    Expired { id: CountdownId },
}

impl CountdownEvent {
    pub fn id(&self) -> CountdownId {
        match self {
            CountdownEvent::Tick { id, .. } | CountdownEvent::Expired { id } => *id,
        }
    }
}

/// Cancellable, restartable countdown
///
/// Events are posted into the owner's event queue, so the owner sees them in
/// order with everything else it handles. Each start gets a fresh id; events
/// that were already queued when a countdown was cancelled still carry the old
/// id and can be ignored by comparing against the id returned from `start()`.
pub struct CountdownTimer<E> {
    events: mpsc::UnboundedSender<E>,
    task: Option<JoinHandle<()>>,
    next_id: u64,
}

impl<E> CountdownTimer<E>
where
    E: From<CountdownEvent> + Send + 'static,
{
    pub fn new(events: mpsc::UnboundedSender<E>) -> Self {
        Self {
            events,
            task: None,
            next_id: 0,
        }
    }

    /// Start a countdown, cancelling any running one
    pub fn start(&mut self, duration_secs: u64) -> CountdownId {
        self.cancel();

        self.next_id += 1;
        let id = CountdownId(self.next_id);
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut ticker = interval_at(Instant::now() + period, period);
            let mut remaining = duration_secs;

            while remaining > 0 {
                ticker.tick().await;
                remaining -= 1;

                if events
                    .send(CountdownEvent::Tick { id, remaining_secs: remaining }.into())
                    .is_err()
                {
                    return;
                }
            }

            debug!("Countdown {:?} expired", id);
            let _ = events.send(CountdownEvent::Expired { id }.into());
        });

        self.task = Some(task);
        id
    }

    /// Stop the running countdown; no further events are sent
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Check if a countdown is still counting
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl<E> Drop for CountdownTimer<E> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

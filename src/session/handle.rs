use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::controller::SessionController;
use super::error::SessionError;
use super::event::{ControllerEvent, Intent};
use super::snapshot::SessionSnapshot;

const COMMAND_CHANNEL_CAPACITY: usize = 32;

enum Command {
    Apply {
        intent: Intent,
        reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Close {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

enum Step {
    Command(Option<Command>),
    Event(ControllerEvent),
}

/// Cloneable handle to a controller running on its own task
///
/// Intents and controller events are handled one at a time on that task, so
/// several HTTP requests can share a session without locking it.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: String,
    commands: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Move the controller onto a task and return a handle to it
    pub fn spawn(controller: SessionController) -> Self {
        let session_id = controller.session_id().to_string();
        let (commands, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        tokio::spawn(run(controller, command_rx));

        Self {
            session_id,
            commands,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Apply an intent and return the snapshot taken right after it
    pub async fn apply(&self, intent: Intent) -> Result<SessionSnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Apply { intent, reply }).await?;
        response.await.map_err(|_| SessionError::SessionClosed)?
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        response.await.map_err(|_| SessionError::SessionClosed)
    }

    /// Close the session and stop its task
    pub async fn close(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Close { reply }).await?;
        response.await.map_err(|_| SessionError::SessionClosed)
    }

    async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::SessionClosed)
    }
}

async fn run(mut controller: SessionController, mut commands: mpsc::Receiver<Command>) {
    info!("Session task started: {}", controller.session_id());

    loop {
        let step = tokio::select! {
            command = commands.recv() => Step::Command(command),
            Some(event) = controller.next_event() => Step::Event(event),
        };

        match step {
            Step::Event(event) => controller.handle_event(event).await,
            Step::Command(Some(Command::Apply { intent, reply })) => {
                debug!("Applying {:?} to {}", intent, controller.session_id());
                let result = controller.apply(intent).await.map(|_| controller.snapshot());
                let _ = reply.send(result);
            }
            Step::Command(Some(Command::Snapshot { reply })) => {
                let _ = reply.send(controller.snapshot());
            }
            Step::Command(Some(Command::Close { reply })) => {
                controller.close().await;
                let _ = reply.send(controller.snapshot());
                break;
            }
            Step::Command(None) => {
                // Every handle dropped
                controller.close().await;
                break;
            }
        }
    }

    info!("Session task stopped: {}", controller.session_id());
}

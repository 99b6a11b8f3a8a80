// Capture device fed by a remote client
//
// The browser owns the camera; it streams encoded media chunks to us while a
// recording window is open. This device drains those chunks from a channel
// into a single payload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::device::{CaptureDevice, CaptureError, CapturePreview, RecordingPayload};

const CHUNK_CHANNEL_CAPACITY: usize = 64;

struct FeedInner {
    sender: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
    permission_granted: AtomicBool,
    connected: AtomicBool,
    preview: watch::Receiver<CapturePreview>,
}

/// Producer side of a [`StreamCaptureDevice`]
///
/// Cloneable; handed to whatever transport receives media from the client.
#[derive(Clone)]
pub struct CaptureFeed {
    inner: Arc<FeedInner>,
}

impl CaptureFeed {
    /// Push an encoded media chunk into the live capture
    pub async fn push(&self, chunk: Vec<u8>) -> Result<(), CaptureError> {
        let sender = self.lock_sender().clone();
        let Some(sender) = sender else {
            return Err(CaptureError::NotAcquired);
        };

        sender
            .send(chunk)
            .await
            .map_err(|_| CaptureError::NotAcquired)
    }

    /// Record the client's answer to the camera/microphone permission prompt
    pub fn set_permission(&self, granted: bool) {
        info!("Capture permission {}", if granted { "granted" } else { "denied" });
        self.inner.permission_granted.store(granted, Ordering::SeqCst);
    }

    /// Mark the client as connected or gone
    pub fn set_connected(&self, connected: bool) {
        self.inner.connected.store(connected, Ordering::SeqCst);
    }

    /// Current preview of the live capture
    pub fn preview(&self) -> CapturePreview {
        self.inner.preview.borrow().clone()
    }

    /// Subscribe to preview updates
    pub fn watch_preview(&self) -> watch::Receiver<CapturePreview> {
        self.inner.preview.clone()
    }

    fn lock_sender(&self) -> MutexGuard<'_, Option<mpsc::Sender<Vec<u8>>>> {
        self.inner
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Capture device whose media arrives through a [`CaptureFeed`]
pub struct StreamCaptureDevice {
    name: String,
    content_type: String,
    feed: CaptureFeed,
    preview_tx: Arc<watch::Sender<CapturePreview>>,
    buffer_task: Option<JoinHandle<RecordingPayload>>,
}

impl StreamCaptureDevice {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>) -> Self {
        let (preview_tx, preview_rx) = watch::channel(CapturePreview::default());

        let feed = CaptureFeed {
            inner: Arc::new(FeedInner {
                sender: Mutex::new(None),
                permission_granted: AtomicBool::new(true),
                connected: AtomicBool::new(true),
                preview: preview_rx,
            }),
        };

        Self {
            name: name.into(),
            content_type: content_type.into(),
            feed,
            preview_tx: Arc::new(preview_tx),
            buffer_task: None,
        }
    }

    /// Producer handle for this device
    pub fn feed(&self) -> CaptureFeed {
        self.feed.clone()
    }

    fn close_feed(&self) {
        self.feed.lock_sender().take();
    }
}

#[async_trait::async_trait]
impl CaptureDevice for StreamCaptureDevice {
    async fn acquire(&mut self) -> Result<(), CaptureError> {
        if self.buffer_task.is_some() {
            return Err(CaptureError::DeviceUnavailable(
                "a capture is already in progress".to_string(),
            ));
        }
        if !self.feed.inner.permission_granted.load(Ordering::SeqCst) {
            return Err(CaptureError::PermissionDenied);
        }
        if !self.feed.inner.connected.load(Ordering::SeqCst) {
            return Err(CaptureError::DeviceUnavailable(
                "no capture client connected".to_string(),
            ));
        }

        let (chunk_tx, mut chunk_rx) = mpsc::channel::<Vec<u8>>(CHUNK_CHANNEL_CAPACITY);
        *self.feed.lock_sender() = Some(chunk_tx);

        let preview_tx = Arc::clone(&self.preview_tx);
        let content_type = self.content_type.clone();
        preview_tx.send_replace(CapturePreview {
            acquired: true,
            ..CapturePreview::default()
        });

        let buffer_task = tokio::spawn(async move {
            let started = Instant::now();
            let mut bytes = Vec::new();
            let mut chunks = 0;

            while let Some(chunk) = chunk_rx.recv().await {
                bytes.extend_from_slice(&chunk);
                chunks += 1;
                debug!("Buffered chunk {} ({} bytes total)", chunks, bytes.len());

                preview_tx.send_modify(|preview| {
                    preview.bytes_buffered = bytes.len();
                    preview.chunks = chunks;
                });
            }

            RecordingPayload::new(bytes, content_type, started.elapsed().as_millis() as u64)
        });

        self.buffer_task = Some(buffer_task);
        info!("Capture device acquired: {}", self.name);

        Ok(())
    }

    async fn stop(&mut self) -> Result<Option<RecordingPayload>, CaptureError> {
        let Some(task) = self.buffer_task.take() else {
            return Ok(None);
        };

        // Closing the feed lets the buffer task drain and return
        self.close_feed();
        let result = task.await;
        self.preview_tx.send_replace(CapturePreview::default());

        match result {
            Ok(payload) if payload.is_empty() => {
                info!("Capture device released: {} (no media received)", self.name);
                Ok(None)
            }
            Ok(payload) => {
                info!(
                    "Capture device released: {} ({} bytes, {}ms)",
                    self.name,
                    payload.len(),
                    payload.duration_ms
                );
                Ok(Some(payload))
            }
            Err(e) => {
                warn!("Capture buffer task failed: {}", e);
                Err(CaptureError::Finalize(e.to_string()))
            }
        }
    }

    async fn discard(&mut self) {
        self.close_feed();

        if let Some(task) = self.buffer_task.take() {
            task.abort();
            info!("Capture device discarded: {}", self.name);
        }

        self.preview_tx.send_replace(CapturePreview::default());
    }

    fn is_acquired(&self) -> bool {
        self.buffer_task.is_some()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for StreamCaptureDevice {
    fn drop(&mut self) {
        if let Some(task) = self.buffer_task.take() {
            warn!("Capture device dropped while acquired: {}", self.name);
            task.abort();
        }
    }
}

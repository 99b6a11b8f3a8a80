use serde::Serialize;
use thiserror::Error;

/// Errors raised while acquiring or finalising a capture device
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Camera/microphone access was denied. Please check your permissions.")]
    PermissionDenied,

    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Capture device is not acquired")]
    NotAcquired,

    #[error("Failed to finalize recording: {0}")]
    Finalize(String),
}

/// A finished recording, opaque to everything except the scoring service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingPayload {
    /// Encoded media bytes as produced by the client
    pub bytes: Vec<u8>,
    /// MIME type forwarded to the scoring service
    pub content_type: String,
    /// Wall-clock length of the capture window in milliseconds
    pub duration_ms: u64,
}

impl RecordingPayload {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            duration_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Advisory view of a live capture, for presentation code only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapturePreview {
    pub acquired: bool,
    pub bytes_buffered: usize,
    pub chunks: usize,
}

/// Capture device trait
///
/// Only one acquisition may be live at a time. The session controller owns the
/// device and calls `stop()` or `discard()` on every exit path.
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Request device access and start buffering
    async fn acquire(&mut self) -> Result<(), CaptureError>;

    /// Finalize the live capture into a payload and release the device
    ///
    /// Returns `Ok(None)` when nothing was acquired or no media arrived.
    async fn stop(&mut self) -> Result<Option<RecordingPayload>, CaptureError>;

    /// Release the device, dropping anything buffered
    async fn discard(&mut self);

    /// Check if an acquisition is currently live
    fn is_acquired(&self) -> bool;

    /// Get device name for logging
    fn name(&self) -> &str;
}

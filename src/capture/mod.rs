pub mod device;
pub mod stream;

pub use device::{CaptureDevice, CaptureError, CapturePreview, RecordingPayload};
pub use stream::{CaptureFeed, StreamCaptureDevice};

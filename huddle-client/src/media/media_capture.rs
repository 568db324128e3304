use crate::media::{MediaError, MediaHandle};
use async_trait::async_trait;

/// Platform capture capability. Acquisition may wait on a permission prompt,
/// so callers run it off the event loop.
///
/// Implementations that can observe the user ending a screen capture from
/// outside the app should send `ClientCommand::StopScreenShare`.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    async fn acquire_camera_and_mic(&self) -> Result<MediaHandle, MediaError>;

    async fn acquire_screen_capture(&self) -> Result<MediaHandle, MediaError>;
}

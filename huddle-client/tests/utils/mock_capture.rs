use async_trait::async_trait;
use huddle_client::{LocalTrack, MediaCapture, MediaError, MediaHandle, TrackKind};
use std::time::Duration;

pub fn camera_media(owner: &str) -> MediaHandle {
    MediaHandle::new(
        format!("cam-{owner}"),
        vec![
            LocalTrack::new(format!("mic-{owner}"), TrackKind::Audio),
            LocalTrack::new(format!("webcam-{owner}"), TrackKind::Video),
        ],
    )
}

pub fn screen_media(owner: &str) -> MediaHandle {
    MediaHandle::new(
        format!("screen-{owner}"),
        vec![LocalTrack::new(format!("display-{owner}"), TrackKind::Video)],
    )
}

/// Capture backend that hands out synthetic media after an optional delay.
pub struct MockCapture {
    pub owner: String,
    pub camera_delay: Duration,
    pub camera_error: Option<MediaError>,
}

impl MockCapture {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_owned(),
            camera_delay: Duration::ZERO,
            camera_error: None,
        }
    }
}

#[async_trait]
impl MediaCapture for MockCapture {
    async fn acquire_camera_and_mic(&self) -> Result<MediaHandle, MediaError> {
        tokio::time::sleep(self.camera_delay).await;
        match &self.camera_error {
            Some(e) => Err(e.clone()),
            None => Ok(camera_media(&self.owner)),
        }
    }

    async fn acquire_screen_capture(&self) -> Result<MediaHandle, MediaError> {
        Ok(screen_media(&self.owner))
    }
}

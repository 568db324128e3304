use crate::error::Result;
use crate::manager::{ClientEvent, PeerSessionManager};
use crate::media::{MediaError, MediaHandle, TrackKind};
use crate::session::{NegotiationState, SessionKey, SessionKind};
use huddle_core::MediaKind;
use tracing::debug;

impl PeerSessionManager {
    /// Camera and microphone became available. Sessions negotiated without
    /// them get the media attached and renegotiate; deferred offers go out.
    pub async fn local_media_ready(&mut self, media: MediaHandle) {
        self.camera = Some(media.clone());
        self.camera_unavailable = false;
        self.status("Camera and microphone ready");

        for key in self.sessions.keys_of_kind(SessionKind::Camera) {
            if let Err(e) = self.sync_late_media(key, &media).await {
                self.terminate(key, &format!("could not add local media: {e}")).await;
            }
        }
    }

    async fn sync_late_media(&mut self, key: SessionKey, media: &MediaHandle) -> Result<()> {
        let Some(session) = self.sessions.get_mut(&key) else {
            return Ok(());
        };
        if session.media_attached && !session.offer_deferred {
            return Ok(());
        }
        if !session.media_attached {
            session.transport.attach_media(media).await?;
            session.media_attached = true;
        }

        let (state, deferred) = (session.state, session.offer_deferred);
        match state {
            NegotiationState::Stable => self.send_offer(key, false).await?,
            NegotiationState::Idle if deferred => {
                self.send_offer(key, false).await?;
            }
            NegotiationState::Idle => {
                debug!("Media attached to {}; the answer will carry it", key);
            }
            NegotiationState::HaveLocalOffer | NegotiationState::HaveRemoteOffer => {
                session.renegotiation_pending = true;
            }
            NegotiationState::Failed | NegotiationState::Closed => {}
        }
        Ok(())
    }

    /// Camera acquisition failed; the call continues receive-only.
    pub async fn local_media_failed(&mut self, error: MediaError) {
        self.camera_unavailable = true;
        self.status(format!("Camera unavailable: {error}"));
        self.emit(ClientEvent::MediaFailed {
            kind: MediaKind::Camera,
            error,
        });

        for key in self.sessions.keys_of_kind(SessionKind::Camera) {
            let deferred = self.sessions.get(&key).is_some_and(|s| s.offer_deferred);
            if !deferred {
                continue;
            }
            if let Err(e) = self.send_offer(key, false).await {
                self.terminate(key, &format!("offer failed: {e}")).await;
            }
        }
    }

    /// Flips the microphone. Returns the new state, or `None` without a camera
    /// capture.
    pub fn toggle_audio(&mut self) -> Option<bool> {
        self.toggle_track(TrackKind::Audio, "Microphone")
    }

    pub fn toggle_video(&mut self) -> Option<bool> {
        self.toggle_track(TrackKind::Video, "Camera")
    }

    fn toggle_track(&mut self, kind: TrackKind, label: &str) -> Option<bool> {
        let camera = self.camera.as_ref()?;
        let enabled = camera.set_enabled(kind, !camera.is_enabled(kind))?;
        self.status(format!("{label} {}", if enabled { "on" } else { "off" }));
        Some(enabled)
    }
}

use crate::error::Result;
use crate::manager::PeerSessionManager;
use crate::session::{NegotiationState, SessionKey, SessionKind};
use huddle_core::{ConnectionId, DescriptionPayload, MediaKind, RelayKind, RenegotiationPayload};
use std::collections::BTreeMap;
use tracing::debug;

impl PeerSessionManager {
    /// Starts negotiating a session of `kind` with `peer`. Without local media
    /// for it the offer is deferred until the capture is ready (or has failed,
    /// for the camera).
    pub async fn initiate_offer(&mut self, peer: ConnectionId, kind: MediaKind) {
        let key = SessionKey::new(peer, SessionKind::offering(kind));
        if let Err(e) = self.try_initiate_offer(key).await {
            self.terminate(key, &format!("offer failed: {e}")).await;
        }
    }

    async fn try_initiate_offer(&mut self, key: SessionKey) -> Result<()> {
        self.ensure_session(key).await?;

        let media_ready = match key.kind {
            SessionKind::Camera => self.camera.is_some() || self.camera_unavailable,
            _ => self.screen.is_some(),
        };
        if !media_ready {
            if let Some(session) = self.sessions.get_mut(&key) {
                session.offer_deferred = true;
            }
            debug!("Deferring offer on {} until local media is ready", key);
            return Ok(());
        }
        self.send_offer(key, false).await
    }

    /// Creates and relays an offer for an existing session. If an exchange is
    /// already in flight the offer is queued behind it instead.
    pub(crate) async fn send_offer(&mut self, key: SessionKey, ice_restart: bool) -> Result<()> {
        let display_name = self.config.display_name.clone();
        let streams = self.stream_tags(key.kind);
        let Some(session) = self.sessions.get_mut(&key) else {
            return Ok(());
        };
        if session.state.is_negotiating() {
            session.renegotiation_pending = true;
            return Ok(());
        }

        let next = session.state.local_offer()?;
        let renegotiation = session.is_established();
        let sdp = session.transport.create_offer(ice_restart).await?;
        session.state = next;
        session.offer_deferred = false;
        session.renegotiation_pending = false;
        session.offer_is_renegotiation = renegotiation;
        session.local_description = Some(sdp.clone());
        debug!("Sending offer on {} (restart: {})", key, ice_restart);

        if renegotiation && key.kind == SessionKind::Camera {
            self.relay(
                RelayKind::RenegotiateOffer,
                key.peer,
                &RenegotiationPayload { sdp },
            );
        } else {
            self.relay(
                RelayKind::Offer,
                key.peer,
                &DescriptionPayload {
                    sdp,
                    kind: key.kind.media_kind(),
                    display_name: Some(display_name),
                    streams,
                },
            );
        }
        Ok(())
    }

    /// Sends any offer that was waiting for the session to settle.
    pub(crate) async fn after_stable(&mut self, key: SessionKey) {
        let media_ready = self.local_media_for(key.kind).is_some()
            || (key.kind == SessionKind::Camera && self.camera_unavailable);
        let Some(session) = self.sessions.get(&key) else {
            return;
        };
        if session.state != NegotiationState::Stable {
            return;
        }
        if session.renegotiation_pending || (session.offer_deferred && media_ready) {
            if let Err(e) = self.send_offer(key, false).await {
                self.terminate(key, &format!("renegotiation failed: {e}")).await;
            }
        }
    }

    /// Explicit stream tags advertised alongside offers and answers.
    pub(crate) fn stream_tags(&self, kind: SessionKind) -> BTreeMap<String, MediaKind> {
        let mut tags = BTreeMap::new();
        match kind {
            SessionKind::Camera => {
                if let Some(camera) = &self.camera {
                    tags.insert(camera.stream_id.clone(), MediaKind::Camera);
                }
            }
            SessionKind::ScreenOutgoing => {
                if let Some(screen) = &self.screen {
                    tags.insert(screen.stream_id.clone(), MediaKind::Screen);
                }
            }
            SessionKind::ScreenIncoming => {}
        }
        tags
    }
}

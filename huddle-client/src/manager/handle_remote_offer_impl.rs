use crate::error::Result;
use crate::manager::PeerSessionManager;
use crate::session::{NegotiationState, SessionKey, SessionKind};
use crate::transport::SdpKind;
use huddle_core::{ConnectionId, DescriptionPayload, MediaKind, RelayKind, RenegotiationPayload};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// An offer received through signaling.
#[derive(Debug, Clone)]
pub struct RemoteOffer {
    pub peer: ConnectionId,
    pub kind: MediaKind,
    pub sdp: String,
    pub display_name: Option<String>,
    pub streams: BTreeMap<String, MediaKind>,
    /// Arrived as `renegotiate-offer`; answered with `renegotiate-answer`.
    pub renegotiation: bool,
}

impl RemoteOffer {
    pub fn from_description(peer: ConnectionId, payload: DescriptionPayload) -> Self {
        Self {
            peer,
            kind: payload.kind,
            sdp: payload.sdp,
            display_name: payload.display_name,
            streams: payload.streams,
            renegotiation: false,
        }
    }

    pub fn renegotiation(peer: ConnectionId, payload: RenegotiationPayload) -> Self {
        Self {
            peer,
            kind: MediaKind::Camera,
            sdp: payload.sdp,
            display_name: None,
            streams: BTreeMap::new(),
            renegotiation: true,
        }
    }
}

impl PeerSessionManager {
    pub async fn handle_remote_offer(&mut self, offer: RemoteOffer) {
        let key = SessionKey::new(offer.peer, SessionKind::answering(offer.kind));
        if let Err(e) = self.try_handle_remote_offer(key, offer).await {
            self.terminate(key, &format!("could not answer offer: {e}")).await;
        }
    }

    async fn try_handle_remote_offer(&mut self, key: SessionKey, offer: RemoteOffer) -> Result<()> {
        self.learn_peer(offer.peer, offer.display_name.as_deref());
        self.ensure_session(key).await?;
        self.apply_stream_tags(offer.peer, &offer.streams);

        let polite = self.is_polite(offer.peer);
        let Some(session) = self.sessions.get_mut(&key) else {
            return Ok(());
        };
        match session.state {
            NegotiationState::HaveLocalOffer if polite => {
                debug!("Offer collision on {}, rolling back local offer", key);
                let next = session.state.rollback()?;
                session.transport.rollback().await?;
                session.state = next;
                if session.offer_is_renegotiation {
                    session.renegotiation_pending = true;
                }
            }
            NegotiationState::HaveLocalOffer => {
                debug!("Offer collision on {}, keeping local offer", key);
                return Ok(());
            }
            NegotiationState::Idle | NegotiationState::Stable => {}
            state => {
                warn!("Dropping offer on {} while {:?}", key, state);
                return Ok(());
            }
        }

        let next = session.state.remote_offer()?;
        session
            .transport
            .set_remote_description(SdpKind::Offer, offer.sdp.clone())
            .await?;
        session.state = next;
        session.remote_description = Some(offer.sdp);

        self.drain_candidates(key).await;

        let display_name = self.config.display_name.clone();
        let streams = self.stream_tags(key.kind);
        let Some(session) = self.sessions.get_mut(&key) else {
            return Ok(());
        };
        let next = session.state.local_answer()?;
        let sdp = session.transport.create_answer().await?;
        session.state = next;
        session.local_description = Some(sdp.clone());
        session.offer_deferred = false;
        debug!("Answering offer on {}", key);

        if offer.renegotiation {
            self.relay(
                RelayKind::RenegotiateAnswer,
                key.peer,
                &RenegotiationPayload { sdp },
            );
        } else {
            self.relay(
                RelayKind::Answer,
                key.peer,
                &DescriptionPayload {
                    sdp,
                    kind: offer.kind,
                    display_name: Some(display_name),
                    streams,
                },
            );
        }

        self.after_stable(key).await;
        Ok(())
    }
}

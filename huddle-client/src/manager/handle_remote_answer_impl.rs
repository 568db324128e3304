use crate::error::Result;
use crate::manager::PeerSessionManager;
use crate::session::{NegotiationState, SessionKey, SessionKind};
use crate::transport::SdpKind;
use huddle_core::{ConnectionId, DescriptionPayload, MediaKind, RenegotiationPayload};
use std::collections::BTreeMap;
use tracing::warn;

/// An answer received through signaling.
#[derive(Debug, Clone)]
pub struct RemoteAnswer {
    pub peer: ConnectionId,
    pub kind: MediaKind,
    pub sdp: String,
    pub streams: BTreeMap<String, MediaKind>,
}

impl RemoteAnswer {
    pub fn from_description(peer: ConnectionId, payload: DescriptionPayload) -> Self {
        Self {
            peer,
            kind: payload.kind,
            sdp: payload.sdp,
            streams: payload.streams,
        }
    }

    pub fn renegotiation(peer: ConnectionId, payload: RenegotiationPayload) -> Self {
        Self {
            peer,
            kind: MediaKind::Camera,
            sdp: payload.sdp,
            streams: BTreeMap::new(),
        }
    }
}

impl PeerSessionManager {
    /// Applies an answer to our outstanding offer. Answers for unknown
    /// sessions, or arriving when no offer is outstanding, are dropped.
    pub async fn handle_remote_answer(&mut self, answer: RemoteAnswer) {
        let key = SessionKey::new(answer.peer, SessionKind::offering(answer.kind));
        match self.sessions.get(&key).map(|s| s.state) {
            Some(NegotiationState::HaveLocalOffer) => {}
            Some(state) => {
                warn!("Dropping stale answer on {} while {:?}", key, state);
                return;
            }
            None => {
                warn!("Dropping answer for unknown session {}", key);
                return;
            }
        }

        self.apply_stream_tags(answer.peer, &answer.streams);
        if let Err(e) = self.try_apply_answer(key, answer.sdp).await {
            self.terminate(key, &format!("could not apply answer: {e}")).await;
        }
    }

    async fn try_apply_answer(&mut self, key: SessionKey, sdp: String) -> Result<()> {
        let Some(session) = self.sessions.get_mut(&key) else {
            return Ok(());
        };
        let next = session.state.remote_answer()?;
        session
            .transport
            .set_remote_description(SdpKind::Answer, sdp.clone())
            .await?;
        session.state = next;
        session.remote_description = Some(sdp);

        self.drain_candidates(key).await;
        self.after_stable(key).await;
        Ok(())
    }
}

use crate::manager::PeerSessionManager;
use crate::session::{SessionKey, SessionKind};
use huddle_core::{
    CandidateDirection, CandidatePayload, ConnectionId, IceCandidate, MediaKind, RelayKind,
};
use tracing::{debug, warn};

impl PeerSessionManager {
    /// Applies a remote candidate, or buffers it until the session has a
    /// remote description.
    pub async fn add_remote_candidate(&mut self, peer: ConnectionId, payload: CandidatePayload) {
        let Some(key) = self.candidate_session(peer, payload.kind, payload.direction) else {
            debug!("Dropping {} candidate from {}: no session", payload.kind, peer);
            return;
        };
        let Some(session) = self.sessions.get_mut(&key) else {
            return;
        };

        if !session.has_remote_description() {
            session.queue_candidate(payload.candidate);
            debug!(
                "Buffered candidate on {} ({} pending)",
                key,
                session.pending_candidate_count()
            );
            return;
        }
        if let Err(e) = session.transport.add_ice_candidate(payload.candidate).await {
            warn!("Rejected candidate on {}: {}", key, e);
        }
    }

    /// The sender's direction is flipped to find our end of the session.
    /// Untagged screen candidates go to the outgoing session when there is one.
    fn candidate_session(
        &self,
        peer: ConnectionId,
        kind: MediaKind,
        direction: Option<CandidateDirection>,
    ) -> Option<SessionKey> {
        use SessionKind::*;

        let ours: &[SessionKind] = match (kind, direction.map(CandidateDirection::flipped)) {
            (MediaKind::Camera, _) => &[Camera],
            (MediaKind::Screen, Some(CandidateDirection::Outbound)) => &[ScreenOutgoing],
            (MediaKind::Screen, Some(CandidateDirection::Inbound)) => &[ScreenIncoming],
            (MediaKind::Screen, None) => &[ScreenOutgoing, ScreenIncoming],
        };
        ours.iter()
            .map(|kind| SessionKey::new(peer, *kind))
            .find(|key| self.sessions.contains(key))
    }

    pub(crate) async fn drain_candidates(&mut self, key: SessionKey) {
        let Some(session) = self.sessions.get_mut(&key) else {
            return;
        };
        let pending = session.take_pending_candidates();
        if !pending.is_empty() {
            debug!("Applying {} buffered candidates on {}", pending.len(), key);
        }
        for candidate in pending {
            if let Err(e) = session.transport.add_ice_candidate(candidate).await {
                warn!("Rejected buffered candidate on {}: {}", key, e);
            }
        }
    }

    pub(crate) fn send_local_candidate(&self, key: SessionKey, candidate: IceCandidate) {
        self.relay(
            RelayKind::IceCandidate,
            key.peer,
            &CandidatePayload {
                candidate,
                kind: key.kind.media_kind(),
                direction: key.kind.candidate_direction(),
            },
        );
    }
}

use crate::session::{NegotiationState, SessionKey};
use crate::transport::{ConnectionState, SessionTransport};
use huddle_core::IceCandidate;
use std::collections::VecDeque;

/// One negotiated connection with a remote participant.
pub struct MediaSession {
    pub key: SessionKey,
    /// Identifies the transport instance; bumped whenever it is replaced.
    pub generation: u64,
    pub state: NegotiationState,
    pub connection_state: ConnectionState,
    pub transport: Box<dyn SessionTransport>,
    pub local_description: Option<String>,
    pub remote_description: Option<String>,
    pending_candidates: VecDeque<IceCandidate>,
    pub media_attached: bool,
    /// An offer was requested before local media was available.
    pub offer_deferred: bool,
    /// Local changes need another offer once the current exchange settles.
    pub renegotiation_pending: bool,
    /// The outstanding local offer renegotiates an established session.
    pub offer_is_renegotiation: bool,
    pub restart_attempted: bool,
}

impl MediaSession {
    pub fn new(key: SessionKey, generation: u64, transport: Box<dyn SessionTransport>) -> Self {
        Self {
            key,
            generation,
            state: NegotiationState::Idle,
            connection_state: ConnectionState::New,
            transport,
            local_description: None,
            remote_description: None,
            pending_candidates: VecDeque::new(),
            media_attached: false,
            offer_deferred: false,
            renegotiation_pending: false,
            offer_is_renegotiation: false,
            restart_attempted: false,
        }
    }

    pub fn has_remote_description(&self) -> bool {
        self.remote_description.is_some()
    }

    /// Negotiated at least once, so further offers renegotiate.
    pub fn is_established(&self) -> bool {
        self.remote_description.is_some() && self.local_description.is_some()
    }

    pub fn queue_candidate(&mut self, candidate: IceCandidate) {
        self.pending_candidates.push_back(candidate);
    }

    pub fn pending_candidate_count(&self) -> usize {
        self.pending_candidates.len()
    }

    /// Buffered candidates in arrival order.
    pub fn take_pending_candidates(&mut self) -> Vec<IceCandidate> {
        self.pending_candidates.drain(..).collect()
    }

    /// Swaps in a fresh transport, resetting all negotiation progress.
    /// Returns the old transport so the caller can close it.
    pub fn replace_transport(
        &mut self,
        generation: u64,
        transport: Box<dyn SessionTransport>,
    ) -> Box<dyn SessionTransport> {
        let fresh = MediaSession::new(self.key, generation, transport);
        std::mem::replace(self, fresh).transport
    }
}

use huddle_core::{CandidateDirection, ConnectionId, MediaKind};
use std::fmt;

/// Role of a session relative to the local participant. Outgoing and incoming
/// screen sessions with the same peer are distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKind {
    Camera,
    ScreenOutgoing,
    ScreenIncoming,
}

impl SessionKind {
    pub fn media_kind(self) -> MediaKind {
        match self {
            SessionKind::Camera => MediaKind::Camera,
            SessionKind::ScreenOutgoing | SessionKind::ScreenIncoming => MediaKind::Screen,
        }
    }

    /// Direction tag attached to outgoing candidates. Camera sessions are
    /// symmetric and carry none.
    pub fn candidate_direction(self) -> Option<CandidateDirection> {
        match self {
            SessionKind::Camera => None,
            SessionKind::ScreenOutgoing => Some(CandidateDirection::Outbound),
            SessionKind::ScreenIncoming => Some(CandidateDirection::Inbound),
        }
    }

    /// Session that receives a remote offer of `kind`.
    pub fn answering(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Camera => SessionKind::Camera,
            MediaKind::Screen => SessionKind::ScreenIncoming,
        }
    }

    /// Session that sends an offer of `kind`.
    pub fn offering(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Camera => SessionKind::Camera,
            MediaKind::Screen => SessionKind::ScreenOutgoing,
        }
    }

    /// Whether the local side may start negotiation on this session.
    pub fn can_offer(self) -> bool {
        !matches!(self, SessionKind::ScreenIncoming)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey {
    pub peer: ConnectionId,
    pub kind: SessionKind,
}

impl SessionKey {
    pub fn new(peer: ConnectionId, kind: SessionKind) -> Self {
        Self { peer, kind }
    }

    pub fn camera(peer: ConnectionId) -> Self {
        Self::new(peer, SessionKind::Camera)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{}", self.kind, self.peer)
    }
}

use crate::classifier::Classification;
use crate::media::MediaError;
use crate::presentation::ViewMode;
use huddle_core::{ConnectionId, MediaKind, RoomId};

/// Notifications for the embedding UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Joined {
        connection_id: ConnectionId,
        room_id: RoomId,
    },
    /// Human readable progress line.
    Status(String),
    MediaFailed {
        kind: MediaKind,
        error: MediaError,
    },
    PeerJoined {
        peer: ConnectionId,
        display_name: String,
    },
    PeerLeft {
        peer: ConnectionId,
    },
    PresenterChanged {
        peer: ConnectionId,
        presenting: bool,
    },
    StreamAdded {
        peer: ConnectionId,
        stream_id: String,
        classification: Classification,
    },
    StreamReclassified {
        peer: ConnectionId,
        stream_id: String,
        classification: Classification,
    },
    StreamRemoved {
        peer: ConnectionId,
        stream_id: String,
    },
    ViewModeChanged(ViewMode),
    /// The signaling connection dropped; a reconnect is under way.
    SignalingLost,
}

use huddle_core::{ConnectionId, ParticipantInfo, RelayEnvelope, RelayKind, RoomId};
use tokio::sync::oneshot;

/// Commands fed into the hub by websocket connections.
#[derive(Debug)]
pub enum HubCommand {
    Join {
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: String,
    },

    /// Explicit leave; the socket stays open.
    Leave { connection_id: ConnectionId },

    Relay {
        from: ConnectionId,
        kind: RelayKind,
        envelope: RelayEnvelope,
    },

    ScreenShare {
        connection_id: ConnectionId,
        active: bool,
    },

    SyncRequest { connection_id: ConnectionId },

    /// The websocket closed.
    Disconnect { connection_id: ConnectionId },

    /// Current members of a room, for diagnostics and tests.
    RoomMembers {
        room_id: RoomId,
        reply: oneshot::Sender<Vec<ParticipantInfo>>,
    },
}

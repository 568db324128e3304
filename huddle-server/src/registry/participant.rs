use huddle_core::{ConnectionId, ParticipantInfo, RoomId};

/// Registry-owned record of a joined connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub display_name: String,
    pub room_id: RoomId,
    pub is_presenting: bool,
}

impl Participant {
    pub fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            connection_id: self.connection_id,
            display_name: self.display_name.clone(),
            is_presenting: self.is_presenting,
        }
    }
}

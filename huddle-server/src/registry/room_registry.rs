use crate::registry::Participant;
use huddle_core::{ConnectionId, ParticipantInfo, RoomId};
use std::collections::HashMap;

/// Result of a successful `join`.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub joined: ParticipantInfo,
    /// Everyone else in the room, in join order.
    pub others: Vec<ParticipantInfo>,
}

/// In-memory membership table. Rooms exist only while they have members.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    participants: HashMap<ConnectionId, Participant>,
    rooms: HashMap<RoomId, Vec<ConnectionId>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `connection_id` in `room_id`. A connection that is already a
    /// member somewhere must be removed with [`leave`](Self::leave) first.
    pub fn join(
        &mut self,
        connection_id: ConnectionId,
        room_id: RoomId,
        display_name: String,
    ) -> JoinOutcome {
        let members = self.rooms.entry(room_id.clone()).or_default();
        let others = members
            .iter()
            .filter_map(|id| self.participants.get(id))
            .map(Participant::info)
            .collect();
        members.push(connection_id);

        let participant = Participant {
            connection_id,
            display_name,
            room_id,
            is_presenting: false,
        };
        let joined = participant.info();
        self.participants.insert(connection_id, participant);

        JoinOutcome { joined, others }
    }

    /// Removes the participant. Returns `None` if it was already gone.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        let participant = self.participants.remove(connection_id)?;

        if let Some(members) = self.rooms.get_mut(&participant.room_id) {
            members.retain(|id| id != connection_id);
            if members.is_empty() {
                self.rooms.remove(&participant.room_id);
            }
        }

        Some(participant)
    }

    /// Updates the presenter flag. Returns the participant only when the flag
    /// actually changed.
    pub fn set_presenting(
        &mut self,
        connection_id: &ConnectionId,
        presenting: bool,
    ) -> Option<&Participant> {
        let participant = self.participants.get_mut(connection_id)?;
        if participant.is_presenting == presenting {
            return None;
        }
        participant.is_presenting = presenting;
        Some(participant)
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Participant> {
        self.participants.get(connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.participants.contains_key(connection_id)
    }

    /// Members of the room other than `connection_id`.
    pub fn room_peers(&self, connection_id: &ConnectionId) -> Vec<ConnectionId> {
        let Some(participant) = self.participants.get(connection_id) else {
            return Vec::new();
        };
        self.members_of(&participant.room_id)
            .into_iter()
            .filter(|id| id != connection_id)
            .collect()
    }

    pub fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms.get(room_id).cloned().unwrap_or_default()
    }

    pub fn room_snapshot(&self, room_id: &RoomId) -> Vec<ParticipantInfo> {
        self.members_of(room_id)
            .iter()
            .filter_map(|id| self.participants.get(id))
            .map(Participant::info)
            .collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }
}

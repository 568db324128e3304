use crate::registry::RoomRegistry;
use crate::signaling::{HubCommand, SignalingOutput};
use huddle_core::{
    ConnectionId, Forwarded, ParticipantInfo, RelayEnvelope, RelayKind, RoomId, ServerMessage,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Single event loop owning the room registry. Every membership change and
/// every relayed message passes through here, so per-sender ordering is
/// preserved and the registry needs no locking.
pub struct SignalingHub {
    registry: RoomRegistry,
    command_rx: mpsc::Receiver<HubCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl SignalingHub {
    pub fn new(command_rx: mpsc::Receiver<HubCommand>, signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry: RoomRegistry::new(),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!("Signaling hub started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Signaling hub finished");
    }

    async fn handle_command(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Join {
                connection_id,
                room_id,
                display_name,
            } => self.join(connection_id, room_id, display_name).await,

            HubCommand::Leave { connection_id } | HubCommand::Disconnect { connection_id } => {
                self.leave(&connection_id).await
            }

            HubCommand::Relay {
                from,
                kind,
                envelope,
            } => self.relay(from, kind, envelope).await,

            HubCommand::ScreenShare {
                connection_id,
                active,
            } => self.screen_share(&connection_id, active).await,

            HubCommand::SyncRequest { connection_id } => self.sync_request(&connection_id).await,

            HubCommand::RoomMembers { room_id, reply } => {
                let _ = reply.send(self.registry.room_snapshot(&room_id));
            }
        }
    }

    async fn join(&mut self, connection_id: ConnectionId, room_id: RoomId, display_name: String) {
        if self.registry.contains(&connection_id) {
            info!("{} re-joined; dropping previous membership", connection_id);
            self.leave(&connection_id).await;
        }

        info!("{} ({}) joined room '{}'", display_name, connection_id, room_id);
        let outcome = self.registry.join(connection_id, room_id, display_name);

        for peer in &outcome.others {
            self.signaling
                .send(
                    peer.connection_id,
                    ServerMessage::ParticipantJoined(outcome.joined.clone()),
                )
                .await;
        }

        self.signaling
            .send(connection_id, ServerMessage::ExistingParticipants(outcome.others))
            .await;
    }

    async fn leave(&mut self, connection_id: &ConnectionId) {
        let Some(participant) = self.registry.leave(connection_id) else {
            debug!("Leave for unknown connection {}", connection_id);
            return;
        };

        info!(
            "{} ({}) left room '{}'",
            participant.display_name, connection_id, participant.room_id
        );

        self.broadcast_to_room(
            &participant.room_id,
            None,
            ServerMessage::ParticipantLeft(participant.info()),
        )
        .await;
    }

    async fn relay(&mut self, from: ConnectionId, kind: RelayKind, envelope: RelayEnvelope) {
        if !self.registry.contains(&from) {
            warn!("Dropping {} from {}: sender has not joined a room", kind, from);
            return;
        }

        let target = envelope.target_connection_id;
        if !self.registry.contains(&target) {
            debug!("Dropping {} from {}: target {} is gone", kind, from, target);
            return;
        }

        debug!("Relaying {} {} -> {}", kind, from, target);
        let forwarded = Forwarded {
            from,
            payload: envelope.payload,
        };
        self.signaling
            .send(target, ServerMessage::forwarded(kind, forwarded))
            .await;
    }

    async fn screen_share(&mut self, connection_id: &ConnectionId, active: bool) {
        let Some(participant) = self.registry.set_presenting(connection_id, active) else {
            debug!("Ignoring redundant screen-share state from {}", connection_id);
            return;
        };

        let info: ParticipantInfo = participant.info();
        let room_id = participant.room_id.clone();
        let msg = if active {
            ServerMessage::ParticipantStartedScreen(info)
        } else {
            ServerMessage::ParticipantStoppedScreen(info)
        };

        self.broadcast_to_room(&room_id, Some(connection_id), msg).await;
    }

    async fn sync_request(&mut self, connection_id: &ConnectionId) {
        let Some(participant) = self.registry.get(connection_id) else {
            warn!("Sync request from {} outside any room", connection_id);
            return;
        };

        info!("Sync request from {}", connection_id);
        let room_id = participant.room_id.clone();
        let msg = ServerMessage::SyncRequest {
            from: *connection_id,
            display_name: participant.display_name.clone(),
        };

        self.broadcast_to_room(&room_id, Some(connection_id), msg).await;
    }

    async fn broadcast_to_room(
        &self,
        room_id: &RoomId,
        except: Option<&ConnectionId>,
        msg: ServerMessage,
    ) {
        for member in self.registry.members_of(room_id) {
            if Some(&member) == except {
                continue;
            }
            self.signaling.send(member, msg.clone()).await;
        }
    }
}

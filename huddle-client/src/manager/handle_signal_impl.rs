use crate::manager::{ClientEvent, PeerSessionManager, RemoteAnswer, RemoteOffer};
use crate::session::SessionKey;
use huddle_core::{
    CandidatePayload, ClientMessage, ConnectionId, DescriptionPayload, Forwarded, MediaKind,
    ParticipantInfo, RenegotiationPayload, ServerMessage,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

impl PeerSessionManager {
    /// Dispatches one message from the signaling server. Malformed or
    /// out-of-order messages are logged and dropped.
    pub async fn handle_signal(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome { connection_id } => self.on_welcome(connection_id),
            ServerMessage::IceConfig { ice_servers } => {
                if !ice_servers.is_empty() {
                    debug!("Using {} ICE servers from the server", ice_servers.len());
                    self.ice_servers = ice_servers;
                }
            }
            ServerMessage::ExistingParticipants(participants) => {
                self.reconcile(participants).await;
            }
            ServerMessage::ParticipantJoined(info) => self.on_participant_joined(info).await,
            ServerMessage::ParticipantLeft(info) => {
                if self.remove_peer(info.connection_id).await {
                    self.status(format!("{} left", info.display_name));
                }
            }
            ServerMessage::ParticipantStartedScreen(info) => {
                self.on_presenter_changed(info, true).await;
            }
            ServerMessage::ParticipantStoppedScreen(info) => {
                self.on_presenter_changed(info, false).await;
            }
            ServerMessage::Offer(f) => {
                if let Some(p) = decode::<DescriptionPayload>("offer", &f) {
                    self.handle_remote_offer(RemoteOffer::from_description(f.from, p))
                        .await;
                }
            }
            ServerMessage::Answer(f) => {
                if let Some(p) = decode::<DescriptionPayload>("answer", &f) {
                    self.handle_remote_answer(RemoteAnswer::from_description(f.from, p))
                        .await;
                }
            }
            ServerMessage::IceCandidate(f) => {
                if let Some(p) = decode::<CandidatePayload>("ice-candidate", &f) {
                    self.add_remote_candidate(f.from, p).await;
                }
            }
            ServerMessage::RenegotiateOffer(f) => {
                if let Some(p) = decode::<RenegotiationPayload>("renegotiate-offer", &f) {
                    self.handle_remote_offer(RemoteOffer::renegotiation(f.from, p))
                        .await;
                }
            }
            ServerMessage::RenegotiateAnswer(f) => {
                if let Some(p) = decode::<RenegotiationPayload>("renegotiate-answer", &f) {
                    self.handle_remote_answer(RemoteAnswer::renegotiation(f.from, p))
                        .await;
                }
            }
            ServerMessage::SyncRequest { from, display_name } => {
                self.on_sync_request(from, display_name).await;
            }
        }
    }

    /// Joins the configured room. On a reconnect an active screen share is
    /// announced again since the server forgot it with the old connection.
    fn on_welcome(&mut self, connection_id: ConnectionId) {
        let reconnect = self.local_id.is_some();
        self.local_id = Some(connection_id);
        self.signals.send(ClientMessage::Join {
            room_id: self.config.room_id.clone(),
            display_name: self.config.display_name.clone(),
        });
        if reconnect && self.screen.is_some() {
            self.signals.send(ClientMessage::ScreenShareStarted {});
        }
        self.emit(ClientEvent::Joined {
            connection_id,
            room_id: self.config.room_id.clone(),
        });
        self.status(format!("Joined room {}", self.config.room_id));
    }

    /// The newcomer sends the camera offer, so we only prepare a session and
    /// wait. A screen share in progress is offered right away.
    async fn on_participant_joined(&mut self, info: ParticipantInfo) {
        let peer = info.connection_id;
        if self.local_id == Some(peer) {
            return;
        }
        self.learn_peer(peer, Some(&info.display_name));
        if self.peers.set_presenting(peer, info.is_presenting) {
            self.emit(ClientEvent::PresenterChanged {
                peer,
                presenting: info.is_presenting,
            });
        }
        if let Err(e) = self.ensure_session(SessionKey::camera(peer)).await {
            warn!("Could not prepare session for {}: {}", peer, e);
        }
        if self.screen.is_some() {
            self.initiate_offer(peer, MediaKind::Screen).await;
        }
        self.status(format!("{} joined", info.display_name));
        self.refresh_view_mode();
    }
}

fn decode<P: DeserializeOwned>(op: &str, forwarded: &Forwarded) -> Option<P> {
    match forwarded.decode() {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!("Dropping malformed {} from {}: {}", op, forwarded.from, e);
            None
        }
    }
}

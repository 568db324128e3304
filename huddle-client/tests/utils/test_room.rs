use crate::utils::MockTransportFactory;
use huddle_client::{
    ClientConfig, ClientEvent, PeerSessionManager, SessionKey, SessionKind, TransportEvent,
};
use huddle_core::{ClientMessage, ConnectionId, Forwarded, RoomId, ServerMessage};
use huddle_server::RoomRegistry;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

pub fn id(n: u128) -> ConnectionId {
    ConnectionId(Uuid::from_u128(n))
}

/// A session manager wired to mock transports, with all its channels exposed.
pub struct TestPeer {
    pub id: ConnectionId,
    pub name: String,
    pub manager: PeerSessionManager,
    pub factory: Arc<MockTransportFactory>,
    outbound: mpsc::UnboundedReceiver<ClientMessage>,
    transport_rx: mpsc::UnboundedReceiver<TransportEvent>,
    events_rx: mpsc::UnboundedReceiver<ClientEvent>,
    pub sent: Vec<ClientMessage>,
    pub events: Vec<ClientEvent>,
}

impl TestPeer {
    pub fn new(n: u128, name: &str) -> Self {
        let factory = MockTransportFactory::new();
        let (signal_tx, outbound) = mpsc::unbounded_channel();
        let (event_tx, events_rx) = mpsc::unbounded_channel();
        let config = ClientConfig::new("R1", name);
        let (manager, transport_rx) =
            PeerSessionManager::new(config, factory.clone(), Arc::new(signal_tx), event_tx);

        Self {
            id: id(n),
            name: name.to_owned(),
            manager,
            factory,
            outbound,
            transport_rx,
            events_rx,
            sent: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn key(&self, peer: ConnectionId, kind: SessionKind) -> SessionKey {
        SessionKey::new(peer, kind)
    }

    /// Moves pending client events into `events` and returns them all.
    pub fn collect_events(&mut self) -> &[ClientEvent] {
        while let Ok(event) = self.events_rx.try_recv() {
            self.events.push(event);
        }
        &self.events
    }

    pub fn count_events(&mut self, f: impl Fn(&ClientEvent) -> bool) -> usize {
        self.collect_events().iter().filter(|e| f(e)).count()
    }

    pub fn take_outbound(&mut self) -> Vec<ClientMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.outbound.try_recv() {
            self.sent.push(msg.clone());
            out.push(msg);
        }
        out
    }

    pub fn count_sent(&self, f: impl Fn(&ClientMessage) -> bool) -> usize {
        self.sent.iter().filter(|m| f(m)).count()
    }

    pub async fn process_transport_events(&mut self) -> bool {
        let mut progressed = false;
        while let Ok(event) = self.transport_rx.try_recv() {
            self.manager.handle_transport_event(event).await;
            progressed = true;
        }
        progressed
    }
}

/// In-memory room: routes client messages between peers the way the
/// signaling server would, using its registry for membership.
pub struct TestRoom {
    pub peers: Vec<TestPeer>,
    registry: RoomRegistry,
}

impl TestRoom {
    pub fn new(peers: Vec<TestPeer>) -> Self {
        Self {
            peers,
            registry: RoomRegistry::new(),
        }
    }

    pub fn index_of(&self, id: ConnectionId) -> Option<usize> {
        self.peers.iter().position(|p| p.id == id)
    }

    /// Greets peer `i`; it answers with a join.
    pub async fn connect(&mut self, i: usize) {
        let connection_id = self.peers[i].id;
        self.peers[i]
            .manager
            .handle_signal(ServerMessage::Welcome { connection_id })
            .await;
    }

    pub async fn connect_and_settle(&mut self, i: usize) {
        self.connect(i).await;
        self.pump().await;
    }

    /// Simulates the socket of peer `i` dropping.
    pub async fn drop_connection(&mut self, i: usize) {
        let _ = self.peers[i].take_outbound();
        let id = self.peers[i].id;
        self.server_leave(id).await;
        self.peers[i].manager.signaling_lost();
    }

    /// Routes messages and transport events until nothing moves.
    pub async fn pump(&mut self) {
        for _ in 0..1000 {
            let mut progressed = false;
            for i in 0..self.peers.len() {
                progressed |= self.peers[i].process_transport_events().await;
                for msg in self.peers[i].take_outbound() {
                    progressed = true;
                    self.route(i, msg).await;
                }
            }
            if !progressed {
                return;
            }
        }
        panic!("room did not settle");
    }

    pub async fn route(&mut self, from: usize, msg: ClientMessage) {
        let from_id = self.peers[from].id;
        match msg.into_relay() {
            Ok((kind, envelope)) => {
                if !self.registry.contains(&from_id)
                    || !self.registry.contains(&envelope.target_connection_id)
                {
                    return;
                }
                let Some(to) = self.index_of(envelope.target_connection_id) else {
                    return;
                };
                let forwarded = ServerMessage::forwarded(
                    kind,
                    Forwarded {
                        from: from_id,
                        payload: envelope.payload,
                    },
                );
                self.peers[to].manager.handle_signal(forwarded).await;
            }
            Err(ClientMessage::Join {
                room_id,
                display_name,
            }) => {
                self.server_leave(from_id).await;
                let outcome = self.registry.join(from_id, room_id, display_name);
                self.broadcast(from_id, ServerMessage::ParticipantJoined(outcome.joined))
                    .await;
                self.peers[from]
                    .manager
                    .handle_signal(ServerMessage::ExistingParticipants(outcome.others))
                    .await;
            }
            Err(ClientMessage::Leave {}) => self.server_leave(from_id).await,
            Err(ClientMessage::ScreenShareStarted {}) => {
                if let Some(p) = self.registry.set_presenting(&from_id, true) {
                    let info = p.info();
                    self.broadcast(from_id, ServerMessage::ParticipantStartedScreen(info))
                        .await;
                }
            }
            Err(ClientMessage::ScreenShareStopped {}) => {
                if let Some(p) = self.registry.set_presenting(&from_id, false) {
                    let info = p.info();
                    self.broadcast(from_id, ServerMessage::ParticipantStoppedScreen(info))
                        .await;
                }
            }
            Err(ClientMessage::SyncRequest {}) => {
                if let Some(p) = self.registry.get(&from_id) {
                    let msg = ServerMessage::SyncRequest {
                        from: from_id,
                        display_name: p.display_name.clone(),
                    };
                    self.broadcast(from_id, msg).await;
                }
            }
            Err(other) => panic!("unroutable message {other:?}"),
        }
    }

    /// Delivers `msg` as the server would to everyone sharing a room with `from`.
    pub async fn broadcast(&mut self, from: ConnectionId, msg: ServerMessage) {
        for peer in self.registry.room_peers(&from) {
            if let Some(i) = self.index_of(peer) {
                self.peers[i].manager.handle_signal(msg.clone()).await;
            }
        }
    }

    async fn server_leave(&mut self, id: ConnectionId) {
        let others = self.registry.room_peers(&id);
        let Some(participant) = self.registry.leave(&id) else {
            return;
        };
        let info = participant.info();
        for peer in others {
            if let Some(i) = self.index_of(peer) {
                self.peers[i]
                    .manager
                    .handle_signal(ServerMessage::ParticipantLeft(info.clone()))
                    .await;
            }
        }
    }

    pub fn members(&self) -> usize {
        self.registry.members_of(&RoomId::from("R1")).len()
    }
}

/// Kind of an offer message, if `msg` is one.
pub fn offer_kind(msg: &ClientMessage) -> Option<huddle_core::MediaKind> {
    match msg {
        ClientMessage::Offer(envelope) => {
            serde_json::from_value::<huddle_core::DescriptionPayload>(serde_json::Value::Object(
                envelope.payload.clone(),
            ))
            .ok()
            .map(|p| p.kind)
        }
        _ => None,
    }
}

pub fn is_stream_added(event: &ClientEvent, stream_id: &str) -> bool {
    matches!(event, ClientEvent::StreamAdded { stream_id: s, .. } if s == stream_id)
}

pub fn is_stream_removed(event: &ClientEvent, stream_id: &str) -> bool {
    matches!(event, ClientEvent::StreamRemoved { stream_id: s, .. } if s == stream_id)
}

pub fn is_peer_left(event: &ClientEvent, peer: ConnectionId) -> bool {
    matches!(event, ClientEvent::PeerLeft { peer: p } if *p == peer)
}

/// Two peers with cameras, joined and negotiated: Alice first, then Bob.
pub async fn connected_pair() -> TestRoom {
    let mut room = TestRoom::new(vec![TestPeer::new(1, "Alice"), TestPeer::new(2, "Bob")]);
    for i in 0..2 {
        let owner = room.peers[i].name.to_lowercase();
        room.peers[i]
            .manager
            .local_media_ready(crate::utils::camera_media(&owner))
            .await;
        room.connect_and_settle(i).await;
    }
    room
}

use crate::signaling::{HubCommand, SignalingHub, SignalingOutput};
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::{ConnectionId, IceServerConfig, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

const HUB_QUEUE_SIZE: usize = 1024;

struct SignalingInner {
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Websocket-facing half of the relay: owns one outbound queue per live
/// connection and forwards inbound commands to the hub.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) hub_tx: mpsc::Sender<HubCommand>,
}

impl SignalingService {
    pub fn new(hub_tx: mpsc::Sender<HubCommand>, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
            hub_tx,
        }
    }

    /// Builds the service together with its hub and spawns the hub loop.
    pub fn start(ice_servers: Vec<IceServerConfig>) -> Self {
        let (hub_tx, hub_rx) = mpsc::channel(HUB_QUEUE_SIZE);
        let service = Self::new(hub_tx, ice_servers);

        let hub = SignalingHub::new(hub_rx, Arc::new(service.clone()));
        tokio::spawn(hub.run());

        service
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn hub(&self) -> mpsc::Sender<HubCommand> {
        self.hub_tx.clone()
    }

    pub fn add_peer(&self, connection_id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(connection_id, tx);
    }

    pub fn remove_peer(&self, connection_id: &ConnectionId) {
        self.inner.peers.remove(connection_id);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.peers.len()
    }

    pub fn send_signal(&self, connection_id: ConnectionId, msg: &ServerMessage) {
        let Some(peer) = self.inner.peers.get(&connection_id) else {
            warn!(
                "Attempted to send signal to disconnected connection {}",
                connection_id
            );
            return;
        };

        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {:?}", connection_id, e);
                }
            }
            Err(e) => error!("Failed to serialize signal message: {}", e),
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send(&self, to: ConnectionId, msg: ServerMessage) {
        self.send_signal(to, &msg);
    }
}

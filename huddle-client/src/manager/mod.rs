mod candidate_impl;
mod client_event;
mod handle_remote_answer_impl;
mod handle_remote_offer_impl;
mod handle_signal_impl;
mod initiate_offer_impl;
mod local_media_impl;
mod reconcile_impl;
mod screen_share_impl;
mod session_lifecycle_impl;
mod signal_sink;
mod sync_impl;
mod transport_event_impl;

pub use client_event::*;
pub use handle_remote_answer_impl::RemoteAnswer;
pub use handle_remote_offer_impl::RemoteOffer;
pub use signal_sink::*;

use crate::classifier::StreamClassifier;
use crate::config::ClientConfig;
use crate::media::MediaHandle;
use crate::peers::PeerDirectory;
use crate::presentation::ViewMode;
use crate::session::{NegotiationState, SessionKey, SessionStore};
use crate::transport::{ConnectionState, TransportEvent, TransportFactory};
use huddle_core::{ConnectionId, IceServerConfig};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Owns every media session of the local participant and drives their
/// negotiation from signaling messages, transport events and local actions.
///
/// All methods are meant to be called from a single task; nothing here is
/// shared between threads.
pub struct PeerSessionManager {
    config: ClientConfig,
    local_id: Option<ConnectionId>,
    ice_servers: Vec<IceServerConfig>,
    sessions: SessionStore,
    peers: PeerDirectory,
    classifier: StreamClassifier,
    camera: Option<MediaHandle>,
    /// Camera acquisition failed; offers go out receive-only.
    camera_unavailable: bool,
    screen: Option<MediaHandle>,
    view_mode: ViewMode,
    next_generation: u64,
    factory: Arc<dyn TransportFactory>,
    signals: Arc<dyn SignalSink>,
    events: mpsc::UnboundedSender<ClientEvent>,
    transport_tx: mpsc::UnboundedSender<TransportEvent>,
}

impl PeerSessionManager {
    /// Returns the manager and the receiver its transports report to; feed
    /// that receiver back through [`PeerSessionManager::handle_transport_event`].
    pub fn new(
        config: ClientConfig,
        factory: Arc<dyn TransportFactory>,
        signals: Arc<dyn SignalSink>,
        events: mpsc::UnboundedSender<ClientEvent>,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (transport_tx, transport_rx) = mpsc::unbounded_channel();
        let manager = Self {
            ice_servers: config.ice_servers.clone(),
            config,
            local_id: None,
            sessions: SessionStore::new(),
            peers: PeerDirectory::new(),
            classifier: StreamClassifier::new(),
            camera: None,
            camera_unavailable: false,
            screen: None,
            view_mode: ViewMode::Grid,
            next_generation: 0,
            factory,
            signals,
            events,
            transport_tx,
        };
        (manager, transport_rx)
    }

    pub fn local_id(&self) -> Option<ConnectionId> {
        self.local_id
    }

    pub fn peers(&self) -> &PeerDirectory {
        &self.peers
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    pub fn is_sharing_screen(&self) -> bool {
        self.screen.is_some()
    }

    pub fn session_state(&self, key: &SessionKey) -> Option<NegotiationState> {
        self.sessions.get(key).map(|s| s.state)
    }

    pub fn connection_state(&self, key: &SessionKey) -> Option<ConnectionState> {
        self.sessions.get(key).map(|s| s.connection_state)
    }

    pub fn session_keys(&self) -> Vec<SessionKey> {
        self.sessions.all_keys()
    }

    pub fn pending_candidate_count(&self, key: &SessionKey) -> usize {
        self.sessions
            .get(key)
            .map_or(0, |s| s.pending_candidate_count())
    }

    /// On an offer collision the polite side rolls back its own offer. The
    /// participant with the greater connection id is polite.
    pub fn is_polite(&self, peer: ConnectionId) -> bool {
        self.local_id.is_none_or(|me| me > peer)
    }
}

use crate::error::Result;
use crate::manager::{ClientEvent, PeerSessionManager};
use crate::media::MediaHandle;
use crate::presentation::PresentationController;
use crate::session::{MediaSession, NegotiationState, SessionKey, SessionKind};
use crate::transport::{SessionTransport, TransportEventSink};
use huddle_core::{ClientMessage, ConnectionId, RelayEnvelope, RelayKind};
use serde::Serialize;
use tracing::{debug, error, info, warn};

impl PeerSessionManager {
    /// Creates the session for `key` unless it already exists. Local media
    /// matching the session's role is attached right away.
    pub(crate) async fn ensure_session(&mut self, key: SessionKey) -> Result<()> {
        if self.sessions.contains(&key) {
            return Ok(());
        }
        let (generation, transport, attached) = self.open_transport(key).await?;
        let mut session = MediaSession::new(key, generation, transport);
        session.media_attached = attached;
        if let Err(rejected) = self.sessions.insert(session) {
            close_quietly(key, rejected.transport).await;
        }
        debug!("Created session {}", key);
        Ok(())
    }

    /// Replaces the session's transport with a fresh one, keeping its slot.
    pub(crate) async fn reset_session(&mut self, key: SessionKey) -> Result<()> {
        if !self.sessions.contains(&key) {
            return self.ensure_session(key).await;
        }
        let (generation, transport, attached) = self.open_transport(key).await?;
        if let Some(session) = self.sessions.get_mut(&key) {
            let old = session.replace_transport(generation, transport);
            session.media_attached = attached;
            close_quietly(key, old).await;
        }
        self.drop_streams(key.peer, key.kind);
        self.refresh_view_mode();
        debug!("Reset session {}", key);
        Ok(())
    }

    async fn open_transport(
        &mut self,
        key: SessionKey,
    ) -> Result<(u64, Box<dyn SessionTransport>, bool)> {
        self.next_generation += 1;
        let generation = self.next_generation;
        let sink = TransportEventSink::new(key, generation, self.transport_tx.clone());
        let transport = self.factory.create(&self.ice_servers, sink).await?;

        let attached = match self.local_media_for(key.kind) {
            Some(media) => {
                transport.attach_media(&media).await?;
                true
            }
            None => false,
        };
        Ok((generation, transport, attached))
    }

    pub(crate) fn local_media_for(&self, kind: SessionKind) -> Option<MediaHandle> {
        match kind {
            SessionKind::Camera => self.camera.clone(),
            SessionKind::ScreenOutgoing => self.screen.clone(),
            SessionKind::ScreenIncoming => None,
        }
    }

    /// Closes and forgets one session, dropping the streams it delivered.
    pub async fn teardown(&mut self, key: SessionKey) -> bool {
        let Some(session) = self.sessions.remove(&key) else {
            return false;
        };
        debug!("Tearing down session {} ({:?})", key, session.state);
        close_quietly(key, session.transport).await;
        self.drop_streams(key.peer, key.kind);
        self.refresh_view_mode();
        true
    }

    /// Removes a peer with all its sessions. Safe to call repeatedly; only the
    /// first call has any effect.
    pub async fn remove_peer(&mut self, peer: ConnectionId) -> bool {
        let mut removed = false;
        for key in self.sessions.keys_for_peer(peer) {
            removed |= self.teardown(key).await;
        }
        self.classifier.forget_peer(peer);
        if self.peers.remove(peer).is_some() {
            info!("Peer {} removed", peer);
            self.emit(ClientEvent::PeerLeft { peer });
            removed = true;
        }
        self.refresh_view_mode();
        removed
    }

    /// Gives up on a session. Losing the camera session loses the peer.
    pub(crate) async fn terminate(&mut self, key: SessionKey, reason: &str) {
        warn!("Session {} failed: {}", key, reason);
        if let Some(session) = self.sessions.get_mut(&key)
            && !session.state.is_terminal()
        {
            session.state = NegotiationState::Failed;
        }
        match key.kind {
            SessionKind::Camera => {
                if self.remove_peer(key.peer).await {
                    self.status(format!("Lost connection to {}", key.peer));
                }
            }
            SessionKind::ScreenOutgoing | SessionKind::ScreenIncoming => {
                self.teardown(key).await;
            }
        }
    }

    /// Adds the peer to the directory if unknown, or refreshes its name.
    pub(crate) fn learn_peer(&mut self, peer: ConnectionId, display_name: Option<&str>) {
        if self.local_id == Some(peer) {
            return;
        }
        if self.peers.contains(peer) {
            if let Some(name) = display_name {
                self.peers.upsert(peer, name);
            }
            return;
        }
        let name = display_name.unwrap_or("Unknown");
        self.peers.upsert(peer, name);
        self.emit(ClientEvent::PeerJoined {
            peer,
            display_name: name.to_owned(),
        });
    }

    pub(crate) fn drop_streams(&mut self, peer: ConnectionId, source: SessionKind) {
        for stream_id in self.peers.prune_source(peer, source) {
            self.classifier.remove(peer, &stream_id);
            self.emit(ClientEvent::StreamRemoved { peer, stream_id });
        }
    }

    pub(crate) fn refresh_view_mode(&mut self) {
        let mode = PresentationController::view_mode(self.screen.is_some(), &self.peers);
        if mode != self.view_mode {
            self.view_mode = mode;
            self.emit(ClientEvent::ViewModeChanged(mode));
        }
    }

    pub(crate) fn relay<P: Serialize>(&self, kind: RelayKind, to: ConnectionId, payload: &P) {
        match RelayEnvelope::new(to, payload) {
            Ok(envelope) => self.signals.send(ClientMessage::relay(kind, envelope)),
            Err(e) => error!("Failed to encode {} for {}: {}", kind, to, e),
        }
    }

    pub(crate) fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }

    pub(crate) fn status(&self, text: impl Into<String>) {
        let text = text.into();
        info!("{}", text);
        self.emit(ClientEvent::Status(text));
    }
}

async fn close_quietly(key: SessionKey, transport: Box<dyn SessionTransport>) {
    if let Err(e) = transport.close().await {
        debug!("Closing transport of {} failed: {}", key, e);
    }
}

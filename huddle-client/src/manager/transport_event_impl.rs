use crate::manager::{ClientEvent, PeerSessionManager};
use crate::media::TrackKind;
use crate::session::{NegotiationState, SessionKey, SessionKind};
use crate::transport::{ConnectionState, RemoteTrack, TransportEvent, TransportEventKind};
use huddle_core::{ConnectionId, MediaKind};
use std::collections::BTreeMap;
use tracing::{debug, info};

impl PeerSessionManager {
    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        let current = self.sessions.get(&event.key).map(|s| s.generation);
        if current != Some(event.generation) {
            debug!("Ignoring event from retired transport of {}", event.key);
            return;
        }

        match event.kind {
            TransportEventKind::CandidateGenerated(candidate) => {
                self.send_local_candidate(event.key, candidate);
            }
            TransportEventKind::ConnectionStateChanged(state) => {
                self.on_connection_state(event.key, state).await;
            }
            TransportEventKind::TrackAdded(track) => self.on_track_added(event.key, track),
            TransportEventKind::TrackRemoved(track) => self.on_track_removed(event.key, track),
        }
    }

    /// Loss of connectivity triggers one ICE restart; a failure before the
    /// session has recovered from it, or on a session we cannot restart, is
    /// terminal. Reaching `Connected` again re-arms the restart.
    async fn on_connection_state(&mut self, key: SessionKey, state: ConnectionState) {
        let restart_enabled = self.config.ice_restart;
        let Some(session) = self.sessions.get_mut(&key) else {
            return;
        };
        if session.state.is_terminal() {
            return;
        }
        session.connection_state = state;

        match state {
            ConnectionState::Connected => {
                if session.restart_attempted {
                    info!("Session {} recovered", key);
                    session.restart_attempted = false;
                } else {
                    info!("Session {} connected", key);
                }
            }
            ConnectionState::Disconnected | ConnectionState::Failed => {
                let can_restart = restart_enabled
                    && key.kind.can_offer()
                    && !session.restart_attempted
                    && session.state == NegotiationState::Stable
                    && session.transport.supports_ice_restart();

                if can_restart {
                    session.restart_attempted = true;
                    info!("Session {} lost connectivity, restarting ICE", key);
                    if let Err(e) = self.send_offer(key, true).await {
                        self.terminate(key, &format!("ICE restart failed: {e}")).await;
                    }
                } else if state == ConnectionState::Failed {
                    self.terminate(key, "connection failed").await;
                }
            }
            ConnectionState::Closed => {
                session.state = NegotiationState::Closed;
                self.terminate(key, "connection closed").await;
            }
            ConnectionState::New | ConnectionState::Connecting => {}
        }
    }

    fn on_track_added(&mut self, key: SessionKey, track: RemoteTrack) {
        let peer = key.peer;
        self.learn_peer(peer, None);

        let explicit = (key.kind == SessionKind::ScreenIncoming).then_some(MediaKind::Screen);
        let classification = self.classifier.classify(
            peer,
            &track.stream_id,
            track.kind == TrackKind::Video,
            explicit,
        );

        if self
            .peers
            .add_track(peer, key.kind, &track.stream_id, &track.track_id, classification)
        {
            debug!("Stream {} from {} is {:?}", track.stream_id, peer, classification);
            self.emit(ClientEvent::StreamAdded {
                peer,
                stream_id: track.stream_id,
                classification,
            });
        } else {
            self.sync_classification(peer, &track.stream_id);
        }
        self.refresh_view_mode();
    }

    fn on_track_removed(&mut self, key: SessionKey, track: RemoteTrack) {
        if self
            .peers
            .remove_track(key.peer, &track.stream_id, &track.track_id)
        {
            self.classifier.remove(key.peer, &track.stream_id);
            self.emit(ClientEvent::StreamRemoved {
                peer: key.peer,
                stream_id: track.stream_id,
            });
            self.refresh_view_mode();
        }
    }

    /// Records explicit stream tags from an offer or answer.
    pub(crate) fn apply_stream_tags(
        &mut self,
        peer: ConnectionId,
        streams: &BTreeMap<String, MediaKind>,
    ) {
        for (stream_id, kind) in streams {
            if self.classifier.note_tag(peer, stream_id, *kind).is_some() {
                self.sync_classification(peer, stream_id);
            }
        }
        self.refresh_view_mode();
    }

    fn sync_classification(&mut self, peer: ConnectionId, stream_id: &str) {
        let Some(classification) = self.classifier.get(peer, stream_id) else {
            return;
        };
        let current = self
            .peers
            .get(peer)
            .and_then(|p| p.streams.iter().find(|s| s.stream_id == stream_id))
            .map(|s| s.classification);
        if current.is_some_and(|c| c != classification)
            && self.peers.reclassify(peer, stream_id, classification)
        {
            self.emit(ClientEvent::StreamReclassified {
                peer,
                stream_id: stream_id.to_owned(),
                classification,
            });
        }
    }
}

use crate::manager::{ClientEvent, PeerSessionManager};
use crate::session::SessionKind;
use huddle_core::{ConnectionId, MediaKind, ParticipantInfo};
use std::collections::HashSet;
use tracing::{debug, info};

impl PeerSessionManager {
    /// Brings local state in line with the room's member list.
    ///
    /// On the first join this simply offers to everyone. After a reconnect the
    /// remote side knows us under a new id, so members that are gone are
    /// removed, sessions with members still present are reset in place and
    /// renegotiated, and nothing is ever duplicated.
    pub(crate) async fn reconcile(&mut self, participants: Vec<ParticipantInfo>) {
        let listed: HashSet<ConnectionId> =
            participants.iter().map(|p| p.connection_id).collect();

        for peer in self.peers.ids() {
            if !listed.contains(&peer) {
                info!("Peer {} left while we were away", peer);
                self.remove_peer(peer).await;
            }
        }
        for key in self.sessions.all_keys() {
            if !listed.contains(&key.peer) {
                self.teardown(key).await;
            }
        }

        for info in participants {
            let peer = info.connection_id;
            if self.local_id == Some(peer) {
                continue;
            }
            self.learn_peer(peer, Some(&info.display_name));
            if self.peers.set_presenting(peer, info.is_presenting) {
                self.emit(ClientEvent::PresenterChanged {
                    peer,
                    presenting: info.is_presenting,
                });
            }

            for key in self.sessions.keys_for_peer(peer) {
                match key.kind {
                    // The presenter offers again once it sees us join.
                    SessionKind::ScreenIncoming => {
                        self.teardown(key).await;
                    }
                    SessionKind::Camera | SessionKind::ScreenOutgoing => {
                        debug!("Reusing session {}", key);
                        if let Err(e) = self.reset_session(key).await {
                            self.terminate(key, &format!("reset failed: {e}")).await;
                        }
                    }
                }
            }

            self.initiate_offer(peer, MediaKind::Camera).await;
            if self.screen.is_some() {
                self.initiate_offer(peer, MediaKind::Screen).await;
            }
        }
        self.refresh_view_mode();
    }

    /// The signaling connection dropped. Sessions are kept; media may still be
    /// flowing peer to peer until the reconnect reconciles them.
    pub fn signaling_lost(&mut self) {
        self.emit(ClientEvent::SignalingLost);
        self.status("Connection to the signaling server lost, reconnecting");
    }
}

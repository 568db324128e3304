use crate::manager::PeerSessionManager;
use huddle_core::{ClientMessage, ConnectionId, MediaKind};
use tracing::info;

impl PeerSessionManager {
    /// Drops every session and asks all peers to offer again from scratch.
    pub async fn request_sync(&mut self) {
        for key in self.sessions.all_keys() {
            self.teardown(key).await;
        }
        self.signals.send(ClientMessage::SyncRequest {});
        if self.screen.is_some() {
            for peer in self.peers.ids() {
                self.initiate_offer(peer, MediaKind::Screen).await;
            }
        }
        self.status("Resynchronizing with everyone");
    }

    /// A peer reset its side; rebuild ours and offer fresh sessions.
    pub(crate) async fn on_sync_request(&mut self, from: ConnectionId, display_name: String) {
        info!("{} requested a resync", display_name);
        self.learn_peer(from, Some(&display_name));
        for key in self.sessions.keys_for_peer(from) {
            self.teardown(key).await;
        }
        self.initiate_offer(from, MediaKind::Camera).await;
        if self.screen.is_some() {
            self.initiate_offer(from, MediaKind::Screen).await;
        }
    }

    /// Leaves the room and closes everything.
    pub async fn leave(&mut self) {
        self.signals.send(ClientMessage::Leave {});
        for peer in self.peers.ids() {
            self.remove_peer(peer).await;
        }
        for key in self.sessions.all_keys() {
            self.teardown(key).await;
        }
        self.screen = None;
        self.refresh_view_mode();
        self.status("Left the room");
    }
}

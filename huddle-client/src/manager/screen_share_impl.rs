use crate::manager::{ClientEvent, PeerSessionManager};
use crate::media::{MediaError, MediaHandle};
use crate::session::{SessionKey, SessionKind};
use huddle_core::{ClientMessage, MediaKind, ParticipantInfo};
use tracing::debug;

impl PeerSessionManager {
    /// Announces the share, then offers the screen to every known peer. The
    /// announcement goes first so receivers expect the incoming session.
    pub async fn start_screen_share(&mut self, media: MediaHandle) {
        if self.screen.is_some() {
            debug!("Already sharing the screen");
            return;
        }
        self.screen = Some(media);
        self.signals.send(ClientMessage::ScreenShareStarted {});

        for peer in self.peers.ids() {
            self.initiate_offer(peer, MediaKind::Screen).await;
        }
        self.status("Sharing screen");
        self.refresh_view_mode();
    }

    pub async fn stop_screen_share(&mut self) {
        if self.screen.take().is_none() {
            return;
        }
        for key in self.sessions.keys_of_kind(SessionKind::ScreenOutgoing) {
            self.teardown(key).await;
        }
        self.signals.send(ClientMessage::ScreenShareStopped {});
        self.status("Stopped sharing screen");
        self.refresh_view_mode();
    }

    pub fn screen_share_failed(&mut self, error: MediaError) {
        self.status(format!("Screen capture unavailable: {error}"));
        self.emit(ClientEvent::MediaFailed {
            kind: MediaKind::Screen,
            error,
        });
    }

    pub(crate) async fn on_presenter_changed(&mut self, info: ParticipantInfo, presenting: bool) {
        let peer = info.connection_id;
        self.learn_peer(peer, Some(&info.display_name));
        if self.peers.set_presenting(peer, presenting) {
            self.emit(ClientEvent::PresenterChanged { peer, presenting });
        }
        if !presenting {
            self.teardown(SessionKey::new(peer, SessionKind::ScreenIncoming))
                .await;
        }
        self.refresh_view_mode();
    }
}

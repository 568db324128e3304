use crate::media::TrackKind;
use crate::session::SessionKey;
use huddle_core::IceCandidate;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub stream_id: String,
    pub track_id: String,
    pub kind: TrackKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEventKind {
    CandidateGenerated(IceCandidate),
    ConnectionStateChanged(ConnectionState),
    TrackAdded(RemoteTrack),
    TrackRemoved(RemoteTrack),
}

/// Event raised by a session transport. `generation` identifies the transport
/// instance so events from a replaced transport can be discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportEvent {
    pub key: SessionKey,
    pub generation: u64,
    pub kind: TransportEventKind,
}

/// Handed to each transport at creation; tags everything it emits.
#[derive(Debug, Clone)]
pub struct TransportEventSink {
    key: SessionKey,
    generation: u64,
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl TransportEventSink {
    pub fn new(
        key: SessionKey,
        generation: u64,
        tx: mpsc::UnboundedSender<TransportEvent>,
    ) -> Self {
        Self {
            key,
            generation,
            tx,
        }
    }

    pub fn key(&self) -> SessionKey {
        self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn emit(&self, kind: TransportEventKind) {
        let _ = self.tx.send(TransportEvent {
            key: self.key,
            generation: self.generation,
            kind,
        });
    }
}

use crate::classifier::Classification;
use crate::session::SessionKind;
use huddle_core::{ConnectionId, MediaKind};

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteStream {
    pub stream_id: String,
    pub classification: Classification,
    /// Session the stream arrived on.
    pub source: SessionKind,
    pub track_ids: Vec<String>,
}

impl RemoteStream {
    pub fn kind(&self) -> MediaKind {
        self.classification.kind()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemotePeer {
    pub connection_id: ConnectionId,
    pub display_name: String,
    /// The server announced this peer as presenting.
    pub presenting: bool,
    pub streams: Vec<RemoteStream>,
}

/// Remote participants and their streams, in the order they became known.
#[derive(Debug, Default)]
pub struct PeerDirectory {
    peers: Vec<RemotePeer>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peers(&self) -> &[RemotePeer] {
        &self.peers
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.peers.iter().map(|p| p.connection_id).collect()
    }

    pub fn get(&self, peer: ConnectionId) -> Option<&RemotePeer> {
        self.peers.iter().find(|p| p.connection_id == peer)
    }

    fn get_mut(&mut self, peer: ConnectionId) -> Option<&mut RemotePeer> {
        self.peers.iter_mut().find(|p| p.connection_id == peer)
    }

    pub fn contains(&self, peer: ConnectionId) -> bool {
        self.get(peer).is_some()
    }

    /// Adds the peer or refreshes its name. Returns true when it was new.
    pub fn upsert(&mut self, peer: ConnectionId, display_name: &str) -> bool {
        if let Some(existing) = self.get_mut(peer) {
            existing.display_name = display_name.to_owned();
            return false;
        }
        self.peers.push(RemotePeer {
            connection_id: peer,
            display_name: display_name.to_owned(),
            presenting: false,
            streams: Vec::new(),
        });
        true
    }

    pub fn remove(&mut self, peer: ConnectionId) -> Option<RemotePeer> {
        let index = self.peers.iter().position(|p| p.connection_id == peer)?;
        Some(self.peers.remove(index))
    }

    pub fn set_presenting(&mut self, peer: ConnectionId, presenting: bool) -> bool {
        match self.get_mut(peer) {
            Some(p) if p.presenting != presenting => {
                p.presenting = presenting;
                true
            }
            _ => false,
        }
    }

    /// Records a remote track. Returns true when it opened a new stream.
    pub fn add_track(
        &mut self,
        peer: ConnectionId,
        source: SessionKind,
        stream_id: &str,
        track_id: &str,
        classification: Classification,
    ) -> bool {
        let Some(p) = self.get_mut(peer) else {
            return false;
        };
        if let Some(stream) = p.streams.iter_mut().find(|s| s.stream_id == stream_id) {
            if !stream.track_ids.iter().any(|t| t == track_id) {
                stream.track_ids.push(track_id.to_owned());
            }
            return false;
        }
        p.streams.push(RemoteStream {
            stream_id: stream_id.to_owned(),
            classification,
            source,
            track_ids: vec![track_id.to_owned()],
        });
        true
    }

    /// Removes a track. Returns true when its stream has no tracks left and
    /// was dropped.
    pub fn remove_track(&mut self, peer: ConnectionId, stream_id: &str, track_id: &str) -> bool {
        let Some(p) = self.get_mut(peer) else {
            return false;
        };
        let Some(index) = p.streams.iter().position(|s| s.stream_id == stream_id) else {
            return false;
        };
        let stream = &mut p.streams[index];
        stream.track_ids.retain(|t| t != track_id);
        if stream.track_ids.is_empty() {
            p.streams.remove(index);
            return true;
        }
        false
    }

    /// Drops every stream that arrived on `source`, returning their ids.
    pub fn prune_source(&mut self, peer: ConnectionId, source: SessionKind) -> Vec<String> {
        let Some(p) = self.get_mut(peer) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<_>, Vec<_>) =
            p.streams.drain(..).partition(|s| s.source == source);
        p.streams = kept;
        removed.into_iter().map(|s| s.stream_id).collect()
    }

    pub fn reclassify(
        &mut self,
        peer: ConnectionId,
        stream_id: &str,
        classification: Classification,
    ) -> bool {
        let stream = self
            .get_mut(peer)
            .and_then(|p| p.streams.iter_mut().find(|s| s.stream_id == stream_id));
        match stream {
            Some(s) => {
                s.classification = classification;
                true
            }
            None => false,
        }
    }

    pub fn has_screen_stream(&self) -> bool {
        self.peers
            .iter()
            .flat_map(|p| p.streams.iter())
            .any(|s| s.kind() == MediaKind::Screen)
    }

    pub fn has_announced_presenter(&self) -> bool {
        self.peers.iter().any(|p| p.presenting)
    }
}

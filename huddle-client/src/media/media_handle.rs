use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// One captured track. The enabled flag is shared by every session the
/// track is fanned out to.
#[derive(Debug, Clone)]
pub struct LocalTrack {
    pub id: String,
    pub kind: TrackKind,
    enabled: Arc<AtomicBool>,
}

impl LocalTrack {
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

/// Opaque handle to a local capture (camera+microphone or screen).
#[derive(Debug, Clone)]
pub struct MediaHandle {
    pub stream_id: String,
    pub tracks: Vec<LocalTrack>,
}

impl MediaHandle {
    pub fn new(stream_id: impl Into<String>, tracks: Vec<LocalTrack>) -> Self {
        Self {
            stream_id: stream_id.into(),
            tracks,
        }
    }

    /// Enables or disables every track of `kind`. Returns the resulting state,
    /// or `None` when the capture has no such track.
    pub fn set_enabled(&self, kind: TrackKind, enabled: bool) -> Option<bool> {
        let mut found = false;
        for track in self.tracks.iter().filter(|t| t.kind == kind) {
            track.enabled.store(enabled, Ordering::Relaxed);
            found = true;
        }
        found.then_some(enabled)
    }

    pub fn is_enabled(&self, kind: TrackKind) -> bool {
        self.tracks
            .iter()
            .filter(|t| t.kind == kind)
            .any(LocalTrack::is_enabled)
    }
}

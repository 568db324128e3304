use huddle_core::{ConnectionId, MediaKind};
use std::collections::HashMap;

/// Result of classifying a remote stream. Explicit results came from
/// signaling; heuristic ones were guessed from arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Explicit(MediaKind),
    Heuristic(MediaKind),
}

impl Classification {
    pub fn kind(self) -> MediaKind {
        match self {
            Classification::Explicit(kind) | Classification::Heuristic(kind) => kind,
        }
    }

    pub fn is_explicit(self) -> bool {
        matches!(self, Classification::Explicit(_))
    }
}

struct CachedStream {
    classification: Classification,
    has_video: bool,
}

/// Decides whether a remote stream is a camera or a screen share.
///
/// Explicit information wins: a stream arriving on an incoming screen session,
/// or one tagged in an offer/answer. Otherwise the first video stream of a peer
/// is its camera and any further distinct video stream is a screen.
/// Results are cached per peer and stream id; a cached camera may later be upgraded to
/// screen by an explicit tag but never the reverse.
#[derive(Default)]
pub struct StreamClassifier {
    tags: HashMap<(ConnectionId, String), MediaKind>,
    cache: HashMap<(ConnectionId, String), CachedStream>,
}

impl StreamClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a tag from signaling. Returns the new classification when the
    /// tag changes an already classified stream.
    pub fn note_tag(
        &mut self,
        peer: ConnectionId,
        stream_id: &str,
        kind: MediaKind,
    ) -> Option<Classification> {
        let key = (peer, stream_id.to_owned());
        self.tags.insert(key.clone(), kind);

        let cached = self.cache.get_mut(&key)?;
        if kind != MediaKind::Screen {
            return None;
        }
        match cached.classification {
            Classification::Explicit(MediaKind::Screen) => None,
            _ => {
                cached.classification = Classification::Explicit(MediaKind::Screen);
                Some(cached.classification)
            }
        }
    }

    /// Classifies a stream when one of its tracks arrives. `explicit` is the
    /// kind implied by the session the track arrived on, if any.
    pub fn classify(
        &mut self,
        peer: ConnectionId,
        stream_id: &str,
        is_video: bool,
        explicit: Option<MediaKind>,
    ) -> Classification {
        let known_video_streams = self.video_streams_of(peer, stream_id);
        let key = (peer, stream_id.to_owned());

        if let Some(cached) = self.cache.get_mut(&key) {
            cached.has_video |= is_video;
            if explicit == Some(MediaKind::Screen) && !cached.classification.is_explicit() {
                cached.classification = Classification::Explicit(MediaKind::Screen);
            }
            return cached.classification;
        }

        let tagged = self.tags.get(&key).copied();
        let classification = match explicit.or(tagged) {
            Some(kind) => Classification::Explicit(kind),
            None if is_video && known_video_streams > 0 => {
                Classification::Heuristic(MediaKind::Screen)
            }
            None => Classification::Heuristic(MediaKind::Camera),
        };

        self.cache.insert(
            key,
            CachedStream {
                classification,
                has_video: is_video,
            },
        );
        classification
    }

    pub fn get(&self, peer: ConnectionId, stream_id: &str) -> Option<Classification> {
        self.cache
            .get(&(peer, stream_id.to_owned()))
            .map(|c| c.classification)
    }

    pub fn remove(&mut self, peer: ConnectionId, stream_id: &str) {
        let key = (peer, stream_id.to_owned());
        if self.cache.remove(&key).is_some() {
            self.tags.remove(&key);
        }
    }

    pub fn forget_peer(&mut self, peer: ConnectionId) {
        self.cache.retain(|(p, _), _| *p != peer);
        self.tags.retain(|(p, _), _| *p != peer);
    }

    fn video_streams_of(&self, peer: ConnectionId, except: &str) -> usize {
        self.cache
            .iter()
            .filter(|((p, id), c)| *p == peer && c.has_video && id.as_str() != except)
            .count()
    }
}

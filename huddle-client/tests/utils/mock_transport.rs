use anyhow::anyhow;
use async_trait::async_trait;
use huddle_client::{
    ConnectionState, MediaHandle, RemoteTrack, SdpKind, SessionKey, SessionTransport, TrackKind,
    TransportEventKind, TransportEventSink, TransportFactory,
};
use huddle_core::{IceCandidate, IceServerConfig};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Everything a mock transport was asked to do.
#[derive(Debug, Default)]
pub struct MockRecord {
    pub attached: Vec<String>,
    pub local: Option<String>,
    pub remote: Option<String>,
    pub applied_candidates: Vec<IceCandidate>,
    pub offers: usize,
    pub restarts: usize,
    pub answers: usize,
    pub rollbacks: usize,
    pub closed: bool,
    tracks: Vec<(String, String, TrackKind)>,
    announced: HashSet<String>,
    candidates_sent: usize,
}

/// Shared state of one mock transport, kept by the factory so tests can
/// inspect it and inject events after the manager took ownership.
pub struct MockTransportState {
    pub key: SessionKey,
    pub generation: u64,
    sink: TransportEventSink,
    record: Mutex<MockRecord>,
}

impl MockTransportState {
    pub fn record<R>(&self, f: impl FnOnce(&MockRecord) -> R) -> R {
        f(&self.record.lock().unwrap())
    }

    pub fn set_connection_state(&self, state: ConnectionState) {
        self.sink
            .emit(TransportEventKind::ConnectionStateChanged(state));
    }

    pub fn end_remote_track(&self, stream_id: &str, track_id: &str, kind: TrackKind) {
        self.sink.emit(TransportEventKind::TrackRemoved(RemoteTrack {
            stream_id: stream_id.to_owned(),
            track_id: track_id.to_owned(),
            kind,
        }));
    }

    /// Descriptions list the attached tracks so the far end can raise
    /// track events for them: `offer|stream:track:v,stream:track:a`.
    fn describe(&self, kind: &str) -> String {
        let record = self.record.lock().unwrap();
        let tracks: Vec<String> = record
            .tracks
            .iter()
            .map(|(stream, track, kind)| {
                let k = match kind {
                    TrackKind::Audio => "a",
                    TrackKind::Video => "v",
                };
                format!("{stream}:{track}:{k}")
            })
            .collect();
        format!("{kind}|{}", tracks.join(","))
    }

    fn local_candidate(&self) {
        let n = {
            let mut record = self.record.lock().unwrap();
            record.candidates_sent += 1;
            record.candidates_sent
        };
        self.sink
            .emit(TransportEventKind::CandidateGenerated(IceCandidate {
                candidate: format!("candidate:{}:{}", self.generation, n),
                sdp_mid: Some("0".to_owned()),
                sdp_m_line_index: Some(0),
            }));
    }
}

pub struct MockTransport(Arc<MockTransportState>);

#[async_trait]
impl SessionTransport for MockTransport {
    async fn attach_media(&self, media: &MediaHandle) -> huddle_client::Result<()> {
        let mut record = self.0.record.lock().unwrap();
        record.attached.push(media.stream_id.clone());
        for track in &media.tracks {
            record
                .tracks
                .push((media.stream_id.clone(), track.id.clone(), track.kind));
        }
        Ok(())
    }

    async fn create_offer(&self, ice_restart: bool) -> huddle_client::Result<String> {
        let sdp = self.0.describe(if ice_restart { "restart" } else { "offer" });
        {
            let mut record = self.0.record.lock().unwrap();
            record.offers += 1;
            if ice_restart {
                record.restarts += 1;
            }
            record.local = Some(sdp.clone());
        }
        self.0.local_candidate();
        Ok(sdp)
    }

    async fn create_answer(&self) -> huddle_client::Result<String> {
        let sdp = self.0.describe("answer");
        {
            let mut record = self.0.record.lock().unwrap();
            record.answers += 1;
            record.local = Some(sdp.clone());
        }
        self.0.local_candidate();
        Ok(sdp)
    }

    async fn set_remote_description(&self, _kind: SdpKind, sdp: String) -> huddle_client::Result<()> {
        let mut added = Vec::new();
        {
            let mut record = self.0.record.lock().unwrap();
            let tracks = sdp.split_once('|').map(|(_, t)| t).unwrap_or_default();
            for entry in tracks.split(',').filter(|e| !e.is_empty()) {
                let mut parts = entry.split(':');
                let (Some(stream), Some(track), Some(kind)) =
                    (parts.next(), parts.next(), parts.next())
                else {
                    return Err(anyhow!("malformed mock sdp: {sdp}").into());
                };
                if record.announced.insert(track.to_owned()) {
                    added.push(RemoteTrack {
                        stream_id: stream.to_owned(),
                        track_id: track.to_owned(),
                        kind: if kind == "a" {
                            TrackKind::Audio
                        } else {
                            TrackKind::Video
                        },
                    });
                }
            }
            record.remote = Some(sdp);
        }
        for track in added {
            self.0.sink.emit(TransportEventKind::TrackAdded(track));
        }
        Ok(())
    }

    async fn rollback(&self) -> huddle_client::Result<()> {
        let mut record = self.0.record.lock().unwrap();
        record.rollbacks += 1;
        record.local = None;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> huddle_client::Result<()> {
        let mut record = self.0.record.lock().unwrap();
        if record.remote.is_none() {
            return Err(anyhow!("candidate before remote description").into());
        }
        record.applied_candidates.push(candidate);
        Ok(())
    }

    async fn close(&self) -> huddle_client::Result<()> {
        self.0.record.lock().unwrap().closed = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct MockTransportFactory {
    created: Mutex<Vec<Arc<MockTransportState>>>,
}

impl MockTransportFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The most recent transport created for `key`.
    pub fn latest(&self, key: SessionKey) -> Arc<MockTransportState> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|t| t.key == key)
            .cloned()
            .unwrap_or_else(|| panic!("no transport created for {key}"))
    }

    pub fn created_for(&self, key: SessionKey) -> usize {
        self.created
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.key == key)
            .count()
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn create(
        &self,
        _ice_servers: &[IceServerConfig],
        events: TransportEventSink,
    ) -> huddle_client::Result<Box<dyn SessionTransport>> {
        let state = Arc::new(MockTransportState {
            key: events.key(),
            generation: events.generation(),
            sink: events,
            record: Mutex::new(MockRecord::default()),
        });
        self.created.lock().unwrap().push(state.clone());
        Ok(Box::new(MockTransport(state)))
    }
}

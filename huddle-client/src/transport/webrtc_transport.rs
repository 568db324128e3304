use crate::error::Result;
use crate::media::{MediaHandle, TrackKind};
use crate::transport::{
    ConnectionState, RemoteTrack, SdpKind, SessionTransport, TransportEventKind,
    TransportEventSink, TransportFactory,
};
use anyhow::Context;
use async_trait::async_trait;
use huddle_core::{IceCandidate, IceServerConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::offer_answer_options::RTCOfferOptions;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::{RTCRtpTransceiver, RTCRtpTransceiverInit};
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// `SessionTransport` backed by a native `RTCPeerConnection`.
pub struct WebRtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    media_attached: AtomicBool,
}

impl WebRtcTransport {
    pub async fn new(ice_servers: &[IceServerConfig], events: TransportEventSink) -> Result<Self> {
        let peer_connection = Self::build_peer_connection(ice_servers)
            .await
            .context("failed to create peer connection")?;
        let peer_connection = Arc::new(peer_connection);
        let key = events.key();

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();
                Box::pin(async move {
                    info!("Peer connection state for {}: {:?}", key, s);
                    let state = match s {
                        RTCPeerConnectionState::Unspecified | RTCPeerConnectionState::New => {
                            ConnectionState::New
                        }
                        RTCPeerConnectionState::Connecting => ConnectionState::Connecting,
                        RTCPeerConnectionState::Connected => ConnectionState::Connected,
                        RTCPeerConnectionState::Disconnected => ConnectionState::Disconnected,
                        RTCPeerConnectionState::Failed => ConnectionState::Failed,
                        RTCPeerConnectionState::Closed => ConnectionState::Closed,
                    };
                    events.emit(TransportEventKind::ConnectionStateChanged(state));
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                events.emit(TransportEventKind::CandidateGenerated(IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                }));
            })
        }));

        let track_events = events;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let events = track_events.clone();
                Box::pin(async move {
                    let remote = RemoteTrack {
                        stream_id: track.stream_id(),
                        track_id: track.id(),
                        kind: match track.kind() {
                            RTPCodecType::Audio => TrackKind::Audio,
                            _ => TrackKind::Video,
                        },
                    };
                    debug!("Remote track {} on stream {}", remote.track_id, remote.stream_id);
                    events.emit(TransportEventKind::TrackAdded(remote.clone()));

                    // Decoding is left to the embedding application; the track is
                    // drained so its end can be observed.
                    tokio::spawn(async move {
                        while track.read_rtp().await.is_ok() {}
                        events.emit(TransportEventKind::TrackRemoved(remote));
                    });
                })
            },
        ));

        Ok(Self {
            peer_connection,
            media_attached: AtomicBool::new(false),
        })
    }

    async fn build_peer_connection(
        ice_servers: &[IceServerConfig],
    ) -> anyhow::Result<RTCPeerConnection> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|s| RTCIceServer {
                    urls: s.urls.clone(),
                    username: s.username.clone().unwrap_or_default(),
                    credential: s.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        Ok(api.new_peer_connection(rtc_config).await?)
    }

    async fn ensure_receive_transceivers(&self) -> anyhow::Result<()> {
        if !self.peer_connection.get_transceivers().await.is_empty() {
            return Ok(());
        }
        for kind in [RTPCodecType::Audio, RTPCodecType::Video] {
            self.peer_connection
                .add_transceiver_from_kind(
                    kind,
                    Some(RTCRtpTransceiverInit {
                        direction: RTCRtpTransceiverDirection::Recvonly,
                        send_encodings: vec![],
                    }),
                )
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionTransport for WebRtcTransport {
    async fn attach_media(&self, media: &MediaHandle) -> Result<()> {
        if self.media_attached.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        for track in &media.tracks {
            let mime_type = match track.kind {
                TrackKind::Audio => MIME_TYPE_OPUS,
                TrackKind::Video => MIME_TYPE_VP8,
            };
            let local = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: mime_type.to_owned(),
                    ..Default::default()
                },
                track.id.clone(),
                media.stream_id.clone(),
            ));
            let sender = self
                .peer_connection
                .add_track(local as Arc<dyn TrackLocal + Send + Sync>)
                .await
                .context("failed to add local track")?;

            // RTCP has to be read for the interceptors to work.
            tokio::spawn(async move {
                let mut buf = vec![0u8; 1500];
                while sender.read(&mut buf).await.is_ok() {}
            });
        }
        Ok(())
    }

    async fn create_offer(&self, ice_restart: bool) -> Result<String> {
        self.ensure_receive_transceivers().await?;
        let offer = self
            .peer_connection
            .create_offer(Some(RTCOfferOptions {
                ice_restart,
                ..Default::default()
            }))
            .await
            .context("failed to create offer")?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .context("failed to set local offer")?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .context("failed to create answer")?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .context("failed to set local answer")?;
        Ok(answer.sdp)
    }

    async fn set_remote_description(&self, kind: SdpKind, sdp: String) -> Result<()> {
        let desc = match kind {
            SdpKind::Offer => RTCSessionDescription::offer(sdp),
            SdpKind::Answer => RTCSessionDescription::answer(sdp),
        }
        .context("invalid remote description")?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .context("failed to set remote description")?;
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        let mut desc = RTCSessionDescription::default();
        desc.sdp_type = RTCSdpType::Rollback;
        self.peer_connection
            .set_local_description(desc)
            .await
            .context("failed to roll back local offer")?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.peer_connection
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: None,
            })
            .await
            .context("failed to add ICE candidate")?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection
            .close()
            .await
            .context("failed to close peer connection")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WebRtcTransportFactory;

#[async_trait]
impl TransportFactory for WebRtcTransportFactory {
    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        events: TransportEventSink,
    ) -> Result<Box<dyn SessionTransport>> {
        Ok(Box::new(WebRtcTransport::new(ice_servers, events).await?))
    }
}

use crate::error::Result;
use crate::media::MediaHandle;
use crate::transport::TransportEventSink;
use async_trait::async_trait;
use huddle_core::{IceCandidate, IceServerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpKind {
    Offer,
    Answer,
}

/// One peer connection as seen by the session manager. Offer and answer
/// creation also install the result as the local description.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    async fn attach_media(&self, media: &MediaHandle) -> Result<()>;

    /// Creates an offer; with no media attached it asks to receive audio and
    /// video only.
    async fn create_offer(&self, ice_restart: bool) -> Result<String>;

    async fn create_answer(&self) -> Result<String>;

    async fn set_remote_description(&self, kind: SdpKind, sdp: String) -> Result<()>;

    /// Discards the pending local offer.
    async fn rollback(&self) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    fn supports_ice_restart(&self) -> bool {
        true
    }

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        events: TransportEventSink,
    ) -> Result<Box<dyn SessionTransport>>;
}

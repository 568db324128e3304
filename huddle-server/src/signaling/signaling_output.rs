use async_trait::async_trait;
use huddle_core::{ConnectionId, ServerMessage};

/// Outbound side of the signaling channel, implemented by the websocket
/// service so the hub can address clients by connection id.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send(&self, to: ConnectionId, msg: ServerMessage);
}

use huddle_core::ClientMessage;
use tokio::sync::mpsc;
use tracing::debug;

/// Outbound path to the signaling server.
pub trait SignalSink: Send + Sync {
    fn send(&self, msg: ClientMessage);
}

impl SignalSink for mpsc::UnboundedSender<ClientMessage> {
    fn send(&self, msg: ClientMessage) {
        if mpsc::UnboundedSender::send(self, msg).is_err() {
            debug!("Signaling channel closed, dropping outbound message");
        }
    }
}

use async_trait::async_trait;
use huddle_core::{ConnectionId, ServerMessage};
use huddle_server::SignalingOutput;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

#[derive(Debug, Clone)]
pub struct Delivered {
    pub to: ConnectionId,
    pub msg: ServerMessage,
}

/// Mock SignalingOutput that captures every outgoing message.
#[derive(Clone)]
pub struct MockSignalingOutput {
    tx: mpsc::UnboundedSender<Delivered>,
    delivered: Arc<Mutex<Vec<Delivered>>>,
}

impl MockSignalingOutput {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Delivered>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            delivered: Arc::new(Mutex::new(Vec::new())),
        };
        (signaling, rx)
    }

    /// Everything delivered to `to`, in delivery order.
    pub async fn messages_for(&self, to: &ConnectionId) -> Vec<ServerMessage> {
        self.delivered
            .lock()
            .await
            .iter()
            .filter(|d| &d.to == to)
            .map(|d| d.msg.clone())
            .collect()
    }

    pub async fn count_matching<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Delivered) -> bool,
    {
        self.delivered
            .lock()
            .await
            .iter()
            .filter(|d| predicate(d))
            .count()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send(&self, to: ConnectionId, msg: ServerMessage) {
        tracing::debug!("[MockSignaling] send to {}: {:?}", to, msg);

        let delivered = Delivered { to, msg };
        self.delivered.lock().await.push(delivered.clone());
        let _ = self.tx.send(delivered);
    }
}

use crate::utils::{Delivered, MockSignalingOutput};
use huddle_core::{
    ClientMessage, ConnectionId, ParticipantInfo, RelayEnvelope, RelayKind, RoomId, ServerMessage,
};
use huddle_server::{HubCommand, SignalingHub};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

pub struct TestHub {
    pub cmd_tx: mpsc::Sender<HubCommand>,
    pub delivered_rx: mpsc::UnboundedReceiver<Delivered>,
    pub signaling: MockSignalingOutput,
}

pub fn create_test_hub() -> TestHub {
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    let (signaling, delivered_rx) = MockSignalingOutput::new();

    let hub = SignalingHub::new(cmd_rx, Arc::new(signaling.clone()));
    tokio::spawn(hub.run());

    TestHub {
        cmd_tx,
        delivered_rx,
        signaling,
    }
}

impl TestHub {
    pub async fn join(&self, connection_id: ConnectionId, room: &str, name: &str) {
        self.cmd_tx
            .send(HubCommand::Join {
                connection_id,
                room_id: RoomId::from(room),
                display_name: name.to_owned(),
            })
            .await
            .expect("hub alive");
    }

    pub async fn leave(&self, connection_id: ConnectionId) {
        self.cmd_tx
            .send(HubCommand::Leave { connection_id })
            .await
            .expect("hub alive");
    }

    pub async fn relay<P: serde::Serialize>(
        &self,
        from: ConnectionId,
        kind: RelayKind,
        target: ConnectionId,
        payload: &P,
    ) {
        let envelope = RelayEnvelope::new(target, payload).expect("object payload");
        let (kind, envelope) = ClientMessage::relay(kind, envelope)
            .into_relay()
            .expect("relay message");
        self.cmd_tx
            .send(HubCommand::Relay {
                from,
                kind,
                envelope,
            })
            .await
            .expect("hub alive");
    }

    pub async fn screen_share(&self, connection_id: ConnectionId, active: bool) {
        self.cmd_tx
            .send(HubCommand::ScreenShare {
                connection_id,
                active,
            })
            .await
            .expect("hub alive");
    }

    /// Round-trips through the hub, so every earlier command has been handled.
    pub async fn members(&self, room: &str) -> Vec<ParticipantInfo> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(HubCommand::RoomMembers {
                room_id: RoomId::from(room),
                reply,
            })
            .await
            .expect("hub alive");
        rx.await.expect("hub replied")
    }

    pub async fn next_for(&mut self, to: ConnectionId) -> ServerMessage {
        loop {
            let delivered = timeout(Duration::from_secs(2), self.delivered_rx.recv())
                .await
                .expect("timed out waiting for a signal")
                .expect("signaling closed");
            if delivered.to == to {
                return delivered.msg;
            }
        }
    }
}

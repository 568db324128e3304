use crate::{HubCommand, SignalingService};
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, ConnectionId, RelayKind, ServerMessage};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    let connection_id = ConnectionId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, connection_id, service))
}

async fn handle_socket(socket: WebSocket, connection_id: ConnectionId, service: SignalingService) {
    info!("New WebSocket connection: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(connection_id, tx);
    service.send_signal(connection_id, &ServerMessage::Welcome { connection_id });
    service.send_signal(
        connection_id,
        &ServerMessage::IceConfig {
            ice_servers: service.get_ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let hub = service.hub();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(signal) => {
                                let cmd = into_command(connection_id, signal);
                                if let Err(e) = hub.send(cmd).await {
                                    error!("Signaling hub died: {}", e);
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Invalid ClientMessage from {}: {}", connection_id, e)
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }

            let _ = hub.send(HubCommand::Disconnect { connection_id }).await;
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // The recv task may have been aborted before it could report the close.
    let _ = service
        .hub()
        .send(HubCommand::Disconnect { connection_id })
        .await;

    service.remove_peer(&connection_id);
    info!("WebSocket disconnected: {}", connection_id);
}

fn into_command(connection_id: ConnectionId, msg: ClientMessage) -> HubCommand {
    let relay = |kind, envelope| HubCommand::Relay {
        from: connection_id,
        kind,
        envelope,
    };

    match msg {
        ClientMessage::Join {
            room_id,
            display_name,
        } => HubCommand::Join {
            connection_id,
            room_id,
            display_name,
        },
        ClientMessage::Leave {} => HubCommand::Leave { connection_id },
        ClientMessage::Offer(envelope) => relay(RelayKind::Offer, envelope),
        ClientMessage::Answer(envelope) => relay(RelayKind::Answer, envelope),
        ClientMessage::IceCandidate(envelope) => relay(RelayKind::IceCandidate, envelope),
        ClientMessage::RenegotiateOffer(envelope) => relay(RelayKind::RenegotiateOffer, envelope),
        ClientMessage::RenegotiateAnswer(envelope) => {
            relay(RelayKind::RenegotiateAnswer, envelope)
        }
        ClientMessage::ScreenShareStarted {} => HubCommand::ScreenShare {
            connection_id,
            active: true,
        },
        ClientMessage::ScreenShareStopped {} => HubCommand::ScreenShare {
            connection_id,
            active: false,
        },
        ClientMessage::SyncRequest {} => HubCommand::SyncRequest { connection_id },
    }
}

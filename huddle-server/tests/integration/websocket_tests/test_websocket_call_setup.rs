use futures::{SinkExt, StreamExt};
use huddle_core::{
    ClientMessage, ConnectionId, DescriptionPayload, MediaKind, RelayEnvelope, RoomId,
    ServerMessage,
};
use huddle_server::{SignalingService, router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::integration::init_tracing;

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server() -> (SocketAddr, SignalingService) {
    let service = SignalingService::start(vec![huddle_core::IceServerConfig::stun(
        "stun:stun.example:3478",
    )]);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(service.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, service)
}

async fn recv(ws: &mut Ws) -> ServerMessage {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("valid server message");
        }
    }
}

async fn send(ws: &mut Ws, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).unwrap();
    ws.send(Message::Text(json.into())).await.unwrap();
}

async fn connect(addr: SocketAddr) -> (Ws, ConnectionId) {
    let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();

    let id = match recv(&mut ws).await {
        ServerMessage::Welcome { connection_id } => connection_id,
        other => panic!("expected welcome, got {:?}", other),
    };
    match recv(&mut ws).await {
        ServerMessage::IceConfig { ice_servers } => {
            assert_eq!(ice_servers[0].urls, vec!["stun:stun.example:3478"]);
        }
        other => panic!("expected ice-config, got {:?}", other),
    }
    (ws, id)
}

fn join(name: &str) -> ClientMessage {
    ClientMessage::Join {
        room_id: RoomId::from("R1"),
        display_name: name.to_owned(),
    }
}

#[tokio::test]
async fn test_websocket_call_setup() {
    init_tracing();

    let (addr, service) = spawn_server().await;
    let (mut alice, alice_id) = connect(addr).await;
    let (mut bob, bob_id) = connect(addr).await;
    assert_eq!(service.connection_count(), 2);

    send(&mut alice, &join("Alice")).await;
    assert_eq!(
        recv(&mut alice).await,
        ServerMessage::ExistingParticipants(vec![])
    );

    send(&mut bob, &join("Bob")).await;
    match recv(&mut bob).await {
        ServerMessage::ExistingParticipants(list) => {
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].connection_id, alice_id);
        }
        other => panic!("unexpected: {:?}", other),
    }
    match recv(&mut alice).await {
        ServerMessage::ParticipantJoined(info) => assert_eq!(info.connection_id, bob_id),
        other => panic!("unexpected: {:?}", other),
    }

    let offer = DescriptionPayload {
        sdp: "v=0".into(),
        kind: MediaKind::Camera,
        display_name: Some("Bob".into()),
        streams: Default::default(),
    };
    let envelope = RelayEnvelope::new(alice_id, &offer).unwrap();
    send(&mut bob, &ClientMessage::Offer(envelope)).await;

    match recv(&mut alice).await {
        ServerMessage::Offer(forwarded) => {
            assert_eq!(forwarded.from, bob_id);
            assert_eq!(forwarded.decode::<DescriptionPayload>().unwrap(), offer);
        }
        other => panic!("unexpected: {:?}", other),
    }

    // Dropping Bob's socket is announced as a leave.
    drop(bob);
    match recv(&mut alice).await {
        ServerMessage::ParticipantLeft(info) => assert_eq!(info.connection_id, bob_id),
        other => panic!("unexpected: {:?}", other),
    }
    timeout(Duration::from_secs(2), async {
        while service.connection_count() != 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("bob's outbound channel was not released");
}

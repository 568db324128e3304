use crate::integration::init_tracing;
use crate::utils::{TestPeer, TestRoom, camera_media, is_stream_added, offer_kind};
use huddle_client::{
    Classification, ClientEvent, MediaError, NegotiationState, SessionKey, TrackKind,
};
use huddle_core::{ClientMessage, MediaKind};

#[tokio::test]
async fn test_late_camera_renegotiates_established_session() {
    init_tracing();
    let mut room = TestRoom::new(vec![TestPeer::new(1, "Alice"), TestPeer::new(2, "Bob")]);
    room.peers[1]
        .manager
        .local_media_ready(camera_media("bob"))
        .await;
    room.connect_and_settle(0).await;
    room.connect_and_settle(1).await;

    let (alice_id, bob_id) = (room.peers[0].id, room.peers[1].id);
    assert_eq!(
        room.peers[0]
            .manager
            .session_state(&SessionKey::camera(bob_id)),
        Some(NegotiationState::Stable)
    );
    assert_eq!(room.peers[1].count_events(|e| is_stream_added(e, "cam-alice")), 0);

    // Alice's camera shows up after she already answered receive-only.
    room.peers[0]
        .manager
        .local_media_ready(camera_media("alice"))
        .await;
    room.pump().await;

    let alice = &room.peers[0];
    assert_eq!(
        alice.count_sent(|m| matches!(m, ClientMessage::RenegotiateOffer(_))),
        1
    );
    assert_eq!(alice.factory.created_for(SessionKey::camera(bob_id)), 1);

    let bob = &mut room.peers[1];
    assert_eq!(
        bob.manager.session_state(&SessionKey::camera(alice_id)),
        Some(NegotiationState::Stable)
    );
    assert!(bob.collect_events().iter().any(|e| matches!(
        e,
        ClientEvent::StreamAdded {
            stream_id,
            classification: Classification::Heuristic(MediaKind::Camera),
            ..
        } if stream_id == "cam-alice"
    )));
}

#[tokio::test]
async fn test_deferred_offer_goes_out_when_media_arrives() {
    init_tracing();
    let mut room = TestRoom::new(vec![TestPeer::new(1, "Alice"), TestPeer::new(2, "Bob")]);
    room.peers[0]
        .manager
        .local_media_ready(camera_media("alice"))
        .await;
    room.connect_and_settle(0).await;
    room.connect_and_settle(1).await;

    let alice_id = room.peers[0].id;
    let key = SessionKey::camera(alice_id);
    assert_eq!(room.peers[1].count_sent(|m| offer_kind(m).is_some()), 0);
    assert_eq!(
        room.peers[1].manager.session_state(&key),
        Some(NegotiationState::Idle)
    );

    room.peers[1]
        .manager
        .local_media_ready(camera_media("bob"))
        .await;
    room.pump().await;

    let bob = &mut room.peers[1];
    assert_eq!(bob.count_sent(|m| offer_kind(m) == Some(MediaKind::Camera)), 1);
    assert_eq!(bob.manager.session_state(&key), Some(NegotiationState::Stable));
    assert_eq!(bob.count_events(|e| is_stream_added(e, "cam-alice")), 1);
    assert_eq!(room.peers[0].count_events(|e| is_stream_added(e, "cam-bob")), 1);
}

#[tokio::test]
async fn test_media_failure_continues_receive_only() {
    init_tracing();
    let mut room = TestRoom::new(vec![TestPeer::new(1, "Alice"), TestPeer::new(2, "Bob")]);
    room.peers[0]
        .manager
        .local_media_ready(camera_media("alice"))
        .await;
    room.connect_and_settle(0).await;
    room.connect_and_settle(1).await;

    room.peers[1]
        .manager
        .local_media_failed(MediaError::PermissionDenied)
        .await;
    room.pump().await;

    let alice_id = room.peers[0].id;
    let bob = &mut room.peers[1];
    assert_eq!(
        bob.count_events(|e| matches!(
            e,
            ClientEvent::MediaFailed {
                kind: MediaKind::Camera,
                error: MediaError::PermissionDenied,
            }
        )),
        1
    );
    assert_eq!(
        bob.manager.session_state(&SessionKey::camera(alice_id)),
        Some(NegotiationState::Stable)
    );
    assert!(
        bob.factory
            .latest(SessionKey::camera(alice_id))
            .record(|r| r.attached.is_empty())
    );
    assert_eq!(bob.count_events(|e| is_stream_added(e, "cam-alice")), 1);
}

#[tokio::test]
async fn test_toggles_flip_local_tracks() {
    init_tracing();
    let mut peer = TestPeer::new(1, "Alice");
    assert_eq!(peer.manager.toggle_audio(), None);

    let media = camera_media("alice");
    peer.manager.local_media_ready(media.clone()).await;

    assert_eq!(peer.manager.toggle_audio(), Some(false));
    assert!(!media.is_enabled(TrackKind::Audio));
    assert!(media.is_enabled(TrackKind::Video));
    assert_eq!(peer.manager.toggle_video(), Some(false));
    assert_eq!(peer.manager.toggle_audio(), Some(true));
}

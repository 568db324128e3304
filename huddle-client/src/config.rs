use huddle_core::utils::default_stun_urls;
use huddle_core::{IceServerConfig, RoomId};
use std::time::Duration;

/// Client settings. ICE servers pushed by the signaling server replace
/// `ice_servers` once received.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub signaling_url: String,
    pub room_id: RoomId,
    pub display_name: String,
    pub ice_servers: Vec<IceServerConfig>,
    /// Attempt one ICE restart before giving up on a failed session.
    pub ice_restart: bool,
    pub reconnect_delay: Duration,
    /// Consecutive failed connection attempts tolerated; `None` retries forever.
    pub max_reconnect_attempts: Option<u32>,
}

impl ClientConfig {
    pub fn new(room_id: impl Into<RoomId>, display_name: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            display_name: display_name.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signaling_url: "ws://127.0.0.1:5000/ws".to_owned(),
            room_id: RoomId::from("lobby"),
            display_name: "Guest".to_owned(),
            ice_servers: default_stun_urls()
                .into_iter()
                .map(IceServerConfig::stun)
                .collect(),
            ice_restart: true,
            reconnect_delay: Duration::from_secs(2),
            max_reconnect_attempts: Some(10),
        }
    }
}

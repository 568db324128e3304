use crate::error::ModelError;
use crate::model::connection::ConnectionId;
use crate::model::ice::IceServerConfig;
use crate::model::participant::ParticipantInfo;
use crate::model::room::RoomId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Addressed relay body sent by a client. Everything except the target is
/// opaque to the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelayEnvelope {
    pub target_connection_id: ConnectionId,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl RelayEnvelope {
    pub fn new<P: Serialize>(target: ConnectionId, payload: &P) -> Result<Self, ModelError> {
        match serde_json::to_value(payload)? {
            Value::Object(payload) => Ok(Self {
                target_connection_id: target,
                payload,
            }),
            _ => Err(ModelError::PayloadNotAnObject),
        }
    }
}

/// A relay body as delivered to its target, tagged with the sender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Forwarded {
    pub from: ConnectionId,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Forwarded {
    pub fn decode<P: DeserializeOwned>(&self) -> Result<P, ModelError> {
        Ok(serde_json::from_value(Value::Object(self.payload.clone()))?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayKind {
    Offer,
    Answer,
    IceCandidate,
    RenegotiateOffer,
    RenegotiateAnswer,
}

impl fmt::Display for RelayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelayKind::Offer => "offer",
            RelayKind::Answer => "answer",
            RelayKind::IceCandidate => "ice-candidate",
            RelayKind::RenegotiateOffer => "renegotiate-offer",
            RelayKind::RenegotiateAnswer => "renegotiate-answer",
        };
        f.write_str(name)
    }
}

/// Messages a client sends to the signaling server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    Join {
        room_id: RoomId,
        display_name: String,
    },
    Leave {},
    Offer(RelayEnvelope),
    Answer(RelayEnvelope),
    IceCandidate(RelayEnvelope),
    RenegotiateOffer(RelayEnvelope),
    RenegotiateAnswer(RelayEnvelope),
    ScreenShareStarted {},
    ScreenShareStopped {},
    SyncRequest {},
}

impl ClientMessage {
    pub fn relay(kind: RelayKind, envelope: RelayEnvelope) -> Self {
        match kind {
            RelayKind::Offer => ClientMessage::Offer(envelope),
            RelayKind::Answer => ClientMessage::Answer(envelope),
            RelayKind::IceCandidate => ClientMessage::IceCandidate(envelope),
            RelayKind::RenegotiateOffer => ClientMessage::RenegotiateOffer(envelope),
            RelayKind::RenegotiateAnswer => ClientMessage::RenegotiateAnswer(envelope),
        }
    }

    /// Splits a relayable message into its kind and envelope.
    pub fn into_relay(self) -> Result<(RelayKind, RelayEnvelope), Self> {
        match self {
            ClientMessage::Offer(e) => Ok((RelayKind::Offer, e)),
            ClientMessage::Answer(e) => Ok((RelayKind::Answer, e)),
            ClientMessage::IceCandidate(e) => Ok((RelayKind::IceCandidate, e)),
            ClientMessage::RenegotiateOffer(e) => Ok((RelayKind::RenegotiateOffer, e)),
            ClientMessage::RenegotiateAnswer(e) => Ok((RelayKind::RenegotiateAnswer, e)),
            other => Err(other),
        }
    }
}

/// Messages the signaling server sends to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    Welcome {
        connection_id: ConnectionId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    ExistingParticipants(Vec<ParticipantInfo>),
    ParticipantJoined(ParticipantInfo),
    ParticipantLeft(ParticipantInfo),
    ParticipantStartedScreen(ParticipantInfo),
    ParticipantStoppedScreen(ParticipantInfo),
    Offer(Forwarded),
    Answer(Forwarded),
    IceCandidate(Forwarded),
    RenegotiateOffer(Forwarded),
    RenegotiateAnswer(Forwarded),
    SyncRequest {
        from: ConnectionId,
        display_name: String,
    },
}

impl ServerMessage {
    pub fn forwarded(kind: RelayKind, forwarded: Forwarded) -> Self {
        match kind {
            RelayKind::Offer => ServerMessage::Offer(forwarded),
            RelayKind::Answer => ServerMessage::Answer(forwarded),
            RelayKind::IceCandidate => ServerMessage::IceCandidate(forwarded),
            RelayKind::RenegotiateOffer => ServerMessage::RenegotiateOffer(forwarded),
            RelayKind::RenegotiateAnswer => ServerMessage::RenegotiateAnswer(forwarded),
        }
    }
}

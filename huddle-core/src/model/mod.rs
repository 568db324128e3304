mod connection;
mod ice;
mod media;
mod participant;
mod payload;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use ice::{IceCandidate, IceServerConfig};
pub use media::{CandidateDirection, MediaKind};
pub use participant::ParticipantInfo;
pub use payload::{CandidatePayload, DescriptionPayload, RenegotiationPayload};
pub use room::RoomId;
pub use signaling::{ClientMessage, Forwarded, RelayEnvelope, RelayKind, ServerMessage};

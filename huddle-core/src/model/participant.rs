use crate::model::connection::ConnectionId;
use serde::{Deserialize, Serialize};

/// Public view of a room member as sent over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub connection_id: ConnectionId,
    pub display_name: String,
    #[serde(default)]
    pub is_presenting: bool,
}

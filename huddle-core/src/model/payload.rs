//! Bodies of relayed messages. The server never decodes these; only clients do.

use crate::model::ice::IceCandidate;
use crate::model::media::{CandidateDirection, MediaKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `offer` and `answer`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionPayload {
    pub sdp: String,
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Explicit stream tags: stream id → kind of the capture it carries.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub streams: BTreeMap<String, MediaKind>,
}

/// Body of `ice-candidate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePayload {
    pub candidate: IceCandidate,
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<CandidateDirection>,
}

/// Body of `renegotiate-offer` and `renegotiate-answer` (camera sessions only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RenegotiationPayload {
    pub sdp: String,
}

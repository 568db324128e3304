use serde::{Deserialize, Serialize};
use std::fmt;

/// Which local capture a session carries.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Camera,
    Screen,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Camera => f.write_str("camera"),
            MediaKind::Screen => f.write_str("screen"),
        }
    }
}

/// Direction of the session a candidate was gathered on, seen from the sender.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateDirection {
    Outbound,
    Inbound,
}

impl CandidateDirection {
    /// The same session seen from the other end.
    pub fn flipped(self) -> Self {
        match self {
            CandidateDirection::Outbound => CandidateDirection::Inbound,
            CandidateDirection::Inbound => CandidateDirection::Outbound,
        }
    }
}

use crate::media::MediaError;
use crate::session::InvalidTransition;
use huddle_core::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("signaling connection failed: {0}")]
    Signaling(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("gave up reconnecting after {0} attempts")]
    ReconnectExhausted(u32),

    #[error(transparent)]
    Transport(#[from] anyhow::Error),

    #[error(transparent)]
    Negotiation(#[from] InvalidTransition),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid connection id '{0}'")]
    InvalidConnectionId(String),

    #[error("relay payload must be a JSON object")]
    PayloadNotAnObject,

    #[error("malformed relay payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

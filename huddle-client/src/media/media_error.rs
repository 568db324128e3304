use thiserror::Error;

/// Why a capture could not be acquired. Each cause needs a different fix from
/// the user, so they are reported separately.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MediaError {
    #[error("permission to use the device was denied")]
    PermissionDenied,

    #[error("the device is in use by another application")]
    DeviceBusy,

    #[error("no suitable capture device was found")]
    DeviceNotFound,

    #[error("media capture failed: {0}")]
    Other(String),
}

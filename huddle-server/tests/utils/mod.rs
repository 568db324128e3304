pub mod hub_helpers;
pub mod mock_signaling;

pub use hub_helpers::*;
pub use mock_signaling::*;

mod media_session;
mod negotiation_state;
mod session_key;
mod session_store;

pub use media_session::*;
pub use negotiation_state::*;
pub use session_key::*;
pub use session_store::*;

mod hub;
mod hub_command;
mod signaling_output;
mod signaling_service;
mod ws_handler;

pub use hub::*;
pub use hub_command::*;
pub use signaling_output::*;
pub use signaling_service::*;
pub use ws_handler::*;

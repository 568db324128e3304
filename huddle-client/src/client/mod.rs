mod client_command;
mod meeting_client;

pub use client_command::*;
pub use meeting_client::*;

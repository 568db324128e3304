mod classifier;
mod client;
mod config;
mod error;
mod manager;
mod media;
mod peers;
mod presentation;
mod session;
mod transport;

pub use classifier::*;
pub use client::*;
pub use config::*;
pub use error::*;
pub use manager::*;
pub use media::*;
pub use peers::*;
pub use presentation::*;
pub use session::*;
pub use transport::*;

mod app;
mod config;
mod registry;
mod signaling;

pub use app::*;
pub use config::*;
pub use registry::*;
pub use signaling::*;

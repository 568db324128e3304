mod peer_directory;

pub use peer_directory::*;

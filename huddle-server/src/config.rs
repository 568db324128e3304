use clap::Parser;
use huddle_core::IceServerConfig;
use huddle_core::utils::{DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};
use std::net::SocketAddr;

/// Signaling server settings, from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "huddle-server", version, about = "Room signaling relay for huddle calls")]
pub struct ServerConfig {
    /// Address the HTTP/websocket listener binds to
    #[arg(long, env = "HUDDLE_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// STUN/TURN URLs handed to clients (repeatable or comma separated)
    #[arg(
        long = "ice-server",
        env = "HUDDLE_ICE_SERVERS",
        value_delimiter = ',',
        default_values = [DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2]
    )]
    pub ice_servers: Vec<String>,
}

impl ServerConfig {
    pub fn ice_server_configs(&self) -> Vec<IceServerConfig> {
        self.ice_servers
            .iter()
            .map(|url| IceServerConfig::stun(url.as_str()))
            .collect()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            ice_servers: vec![DEFAULT_STUN_ADDR.to_owned(), DEFAULT_STUN_ADDR_2.to_owned()],
        }
    }
}

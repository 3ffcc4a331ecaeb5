use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use verneg_core::NegotiationOptions;
use verneg_logger::LogSettings;

/// Top-level configuration of the sample server.
///
/// Every section is optional; `VERNEG__SERVER__PORT=8080` style variables override the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LogSettings,
    pub negotiation: NegotiationOptions,
    pub versioning: VersioningConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    /// Seconds in-flight requests get to finish after a shutdown signal.
    pub shutdown_grace_seconds: u64,
}

impl ServerConfig {
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, shutdown_grace_seconds: 30 }
    }
}

/// Where the requested API version is read from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Request header carrying the version, e.g. `api-version: 2`.
    pub header: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self { header: "api-version".to_owned() }
    }
}

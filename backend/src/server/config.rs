//! HTTP server configuration object.

use std::net::SocketAddr;
use std::path::PathBuf;

use recordkeeper::inbound::http::session_config::SessionSettings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) client_dir: PathBuf,
    pub(crate) assets_dir: PathBuf,
}

impl ServerConfig {
    /// Serve from the working directory's `build/client` and `assets`
    /// unless overridden.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            client_dir: PathBuf::from("build/client"),
            assets_dir: PathBuf::from("assets"),
        }
    }

    /// Directories for the client bundle (served under `/client`) and static
    /// assets (served under `/assets`).
    #[must_use]
    pub fn with_static_dirs(mut self, client_dir: PathBuf, assets_dir: PathBuf) -> Self {
        self.client_dir = client_dir;
        self.assets_dir = assets_dir;
        self
    }
}

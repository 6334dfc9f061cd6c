//! Node configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a curator node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Base URL of the content store's write endpoint.
    pub store_url: String,

    /// Gateway base used to derive playback addresses.
    pub gateway_url: String,

    /// Directory holding the identity key.
    pub data_dir: PathBuf,

    /// Upper bound on any single store request.
    pub request_timeout: Duration,
}

impl NodeConfig {
    pub fn new(store_url: String, gateway_url: String) -> Self {
        Self {
            store_url,
            gateway_url,
            data_dir: default_data_dir(),
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Override the data directory.
    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = dir;
        self
    }

    /// Override the store request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Default data directory for the node.
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("cc", "riff", "curator")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./curator-data"))
}

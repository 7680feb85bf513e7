use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub wikipedia: WikipediaConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Poster storage configuration.
///
/// The cache file and the per-year poster directories all live under `root`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

impl StorageConfig {
    /// Path of the pipe-delimited cache file.
    pub fn cache_file(&self) -> PathBuf {
        self.root.join("posters.csv")
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("posters")
}

/// Wikipedia endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WikipediaConfig {
    /// Scheme and host of the wiki, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User-Agent sent with every outbound request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://en.wikipedia.org".to_string()
}

fn default_user_agent() -> String {
    format!("posterd/{}", env!("CARGO_PKG_VERSION"))
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u32 {
    30
}

use libris_core::config::Config;
use serde::Deserialize;

/// Library service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing JWT access and refresh tokens.
    pub jwt_secret: String,
    /// TCP port for the HTTP server (default 3114). Env var: `LIBRARY_PORT`.
    #[serde(default = "default_port")]
    pub library_port: u16,
    /// Directory holding uploaded files, served at `/media`.
    #[serde(default = "default_media_root")]
    pub media_root: String,
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: u64,
    /// Request body cap for upload routes.
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

fn default_port() -> u16 {
    3114
}

fn default_media_root() -> String {
    "./media".to_owned()
}

fn default_access_ttl() -> u64 {
    300
}

fn default_refresh_ttl() -> u64 {
    86_400
}

fn default_max_upload() -> usize {
    10 * 1024 * 1024
}

impl Config for LibraryConfig {}

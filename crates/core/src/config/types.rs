use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub metadata: Option<MetadataConfig>,
    #[serde(default)]
    pub sports: Option<SportsConfig>,
    #[serde(default)]
    pub downloads: Option<DownloadsConfig>,
    #[serde(default)]
    pub torrent_index: Option<TorrentIndexConfig>,
    #[serde(default)]
    pub vision: Option<VisionConfig>,
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
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("reelgate.db")
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Session lifetime in hours (session method only).
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,
}

fn default_session_ttl_hours() -> u32 {
    720
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    Session,
}

/// Metadata provider (TMDB-style) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    /// API key (required). Passed as a query parameter.
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Image base URL for posters/backdrops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
}

/// Sports-stream directory configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SportsConfig {
    /// Directory base URL (e.g. "https://streamed.su/api")
    pub base_url: String,
    /// Request timeout in seconds (default: 15)
    #[serde(default = "default_sports_timeout")]
    pub timeout_secs: u32,
}

fn default_sports_timeout() -> u32 {
    15
}

/// Download-link provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadsConfig {
    /// Provider base URL
    pub base_url: String,
    /// Request timeout in seconds (default: 30, the provider is slow)
    #[serde(default = "default_downloads_timeout")]
    pub timeout_secs: u32,
    /// Cache TTL in seconds (default: 3600)
    #[serde(default = "default_downloads_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_downloads_timeout() -> u32 {
    30
}

fn default_downloads_cache_ttl() -> u64 {
    3600
}

/// Torrent index provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TorrentIndexConfig {
    /// Index base URL (e.g. "https://yts.mx/api/v2")
    pub base_url: String,
    #[serde(default = "default_torrent_timeout")]
    pub timeout_secs: u32,
    /// Cache TTL in seconds for successful lookups (default: 6 hours)
    #[serde(default = "default_torrent_cache_ttl")]
    pub cache_ttl_secs: u64,
}

fn default_torrent_timeout() -> u32 {
    20
}

fn default_torrent_cache_ttl() -> u64 {
    6 * 3600
}

/// AI vision/chat service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VisionConfig {
    /// OpenAI-compatible endpoint base URL
    pub base_url: String,
    /// API key
    pub api_key: String,
    /// Model name
    pub model: String,
    #[serde(default = "default_vision_timeout")]
    pub timeout_secs: u32,
}

fn default_vision_timeout() -> u32 {
    60
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SanitizedProviderConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sports: Option<SanitizedProviderConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads: Option<SanitizedProviderConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrent_index: Option<SanitizedProviderConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision: Option<SanitizedProviderConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: AuthMethod,
    pub session_ttl_hours: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProviderConfig {
    pub base_url: String,
    pub api_key: String,
}

const REDACTED: &str = "***";

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: config.auth.method,
                session_ttl_hours: config.auth.session_ttl_hours,
            },
            server: config.server.clone(),
            database: config.database.clone(),
            metadata: config.metadata.as_ref().map(|m| SanitizedProviderConfig {
                base_url: m
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string()),
                api_key: REDACTED.to_string(),
            }),
            sports: config.sports.as_ref().map(|s| SanitizedProviderConfig {
                base_url: s.base_url.clone(),
                api_key: String::new(),
            }),
            downloads: config.downloads.as_ref().map(|d| SanitizedProviderConfig {
                base_url: d.base_url.clone(),
                api_key: String::new(),
            }),
            torrent_index: config
                .torrent_index
                .as_ref()
                .map(|t| SanitizedProviderConfig {
                    base_url: t.base_url.clone(),
                    api_key: String::new(),
                }),
            vision: config.vision.as_ref().map(|v| SanitizedProviderConfig {
                base_url: v.base_url.clone(),
                api_key: REDACTED.to_string(),
            }),
        }
    }
}

pub mod auth;
pub mod cache;
pub mod config;
pub mod downloads;
pub mod media;
pub mod metadata;
pub mod progress;
pub mod sports;
pub mod testing;
pub mod torrents;
pub mod vision;
pub mod watchlist;

pub use auth::{create_authenticator, AuthError, AuthRequest, Authenticator, Identity};
pub use cache::TtlCache;
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use media::MediaKind;

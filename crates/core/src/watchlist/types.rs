use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::media::MediaKind;

/// Watchlist status. Absence of a row means "not listed", which is why
/// there is no `None` variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchlistStatus {
    Watching,
    ShouldWatch,
    Dropped,
}

impl WatchlistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchlistStatus::Watching => "watching",
            WatchlistStatus::ShouldWatch => "should_watch",
            WatchlistStatus::Dropped => "dropped",
        }
    }
}

impl FromStr for WatchlistStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watching" => Ok(WatchlistStatus::Watching),
            "should_watch" => Ok(WatchlistStatus::ShouldWatch),
            "dropped" => Ok(WatchlistStatus::Dropped),
            other => Err(format!("invalid watchlist status: {other}")),
        }
    }
}

/// One stored watchlist row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub user_id: String,
    pub media_id: u64,
    pub kind: MediaKind,
    pub status: WatchlistStatus,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written on upsert; everything else is derived.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistUpdate {
    pub status: WatchlistStatus,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            WatchlistStatus::Watching,
            WatchlistStatus::ShouldWatch,
            WatchlistStatus::Dropped,
        ] {
            assert_eq!(status.as_str().parse::<WatchlistStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&WatchlistStatus::ShouldWatch).unwrap(),
            "\"should_watch\""
        );
    }

    #[test]
    fn test_invalid_status() {
        assert!("finished".parse::<WatchlistStatus>().is_err());
    }
}

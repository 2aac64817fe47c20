use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::media::MediaKind;

/// Seconds watched out of a total duration.
///
/// `duration == 0` means the player never reported a length; such items
/// have no meaningful percentage and are excluded from resume-style
/// filters no matter what `watched` says.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaProgress {
    pub watched: f64,
    pub duration: f64,
}

impl MediaProgress {
    pub fn new(watched: f64, duration: f64) -> Self {
        Self { watched, duration }
    }

    /// Percentage watched, defined only when a duration is known.
    pub fn percent(&self) -> Option<f64> {
        (self.duration > 0.0).then(|| (self.watched / self.duration) * 100.0)
    }
}

/// Progress for one episode of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeProgress {
    pub season: String,
    pub episode: String,
    pub progress: MediaProgress,
    /// Epoch milliseconds.
    pub last_updated: i64,
}

/// One ledger entry: everything the device knows about playback of one
/// title. The top-level progress is used for movies; series carry a
/// per-episode map keyed by `s{season}e{episode}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub progress: MediaProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_season_watched: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_episode_watched: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub episodes: HashMap<String, EpisodeProgress>,
    /// Epoch milliseconds of the most recent update.
    pub last_updated: i64,
}

impl MediaItem {
    /// Key into the per-episode map.
    pub fn episode_key(season: &str, episode: &str) -> String {
        format!("s{season}e{episode}")
    }

    /// Progress that drives "continue watching": the pointed-at episode
    /// for series, the top-level progress for movies.
    pub fn active_progress(&self) -> MediaProgress {
        match (&self.last_season_watched, &self.last_episode_watched) {
            (Some(season), Some(episode)) => self
                .episodes
                .get(&Self::episode_key(season, episode))
                .map(|e| e.progress)
                .unwrap_or(self.progress),
            _ => self.progress,
        }
    }

    /// Whether this item belongs in a resume list at all.
    pub fn is_resumable(&self) -> bool {
        self.active_progress().percent().is_some()
    }
}

/// Remote-table row shape, keyed by (user, media id, media kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRow {
    pub user_id: String,
    pub media_id: String,
    pub kind: MediaKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_path: Option<String>,
    pub watched: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_season_watched: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_episode_watched: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub episodes: HashMap<String, EpisodeProgress>,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl MediaItem {
    /// Convert a ledger entry into the remote row shape for a user.
    pub fn to_row(&self, user_id: &str) -> ProgressRow {
        ProgressRow {
            user_id: user_id.to_string(),
            media_id: self.id.clone(),
            kind: self.kind,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            watched: self.progress.watched,
            duration: self.progress.duration,
            last_season_watched: self.last_season_watched.clone(),
            last_episode_watched: self.last_episode_watched.clone(),
            episodes: self.episodes.clone(),
            updated_at: self.last_updated,
        }
    }
}

impl From<ProgressRow> for MediaItem {
    fn from(row: ProgressRow) -> Self {
        Self {
            id: row.media_id,
            kind: row.kind,
            title: row.title,
            poster_path: row.poster_path,
            backdrop_path: row.backdrop_path,
            progress: MediaProgress::new(row.watched, row.duration),
            last_season_watched: row.last_season_watched,
            last_episode_watched: row.last_episode_watched,
            episodes: row.episodes,
            last_updated: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: &str, watched: f64, duration: f64) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            kind: MediaKind::Movie,
            title: format!("Movie {id}"),
            poster_path: None,
            backdrop_path: None,
            progress: MediaProgress::new(watched, duration),
            last_season_watched: None,
            last_episode_watched: None,
            episodes: HashMap::new(),
            last_updated: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_percent_defined_only_with_duration() {
        assert_eq!(MediaProgress::new(30.0, 120.0).percent(), Some(25.0));
        assert_eq!(MediaProgress::new(30.0, 0.0).percent(), None);
        assert_eq!(MediaProgress::new(0.0, 0.0).percent(), None);
    }

    #[test]
    fn test_zero_duration_item_not_resumable() {
        // Watched seconds don't matter without a duration
        assert!(!movie("1", 500.0, 0.0).is_resumable());
        assert!(movie("2", 500.0, 7200.0).is_resumable());
    }

    #[test]
    fn test_episode_key_format() {
        assert_eq!(MediaItem::episode_key("2", "8"), "s2e8");
    }

    #[test]
    fn test_active_progress_follows_episode_pointer() {
        let mut item = movie("99", 10.0, 100.0);
        item.kind = MediaKind::Tv;
        item.last_season_watched = Some("2".to_string());
        item.last_episode_watched = Some("8".to_string());
        item.episodes.insert(
            "s2e8".to_string(),
            EpisodeProgress {
                season: "2".to_string(),
                episode: "8".to_string(),
                progress: MediaProgress::new(900.0, 2700.0),
                last_updated: 1_700_000_000_000,
            },
        );

        let progress = item.active_progress();
        assert_eq!(progress.watched, 900.0);
        assert_eq!(progress.percent(), Some(100.0 * 900.0 / 2700.0));
    }

    #[test]
    fn test_active_progress_falls_back_when_pointer_dangles() {
        let mut item = movie("99", 10.0, 100.0);
        item.last_season_watched = Some("1".to_string());
        item.last_episode_watched = Some("1".to_string());
        // No s1e1 in the map
        assert_eq!(item.active_progress(), MediaProgress::new(10.0, 100.0));
    }

    #[test]
    fn test_row_round_trip() {
        let mut item = movie("603", 1200.0, 8160.0);
        item.episodes.insert(
            "s1e1".to_string(),
            EpisodeProgress {
                season: "1".to_string(),
                episode: "1".to_string(),
                progress: MediaProgress::new(100.0, 2400.0),
                last_updated: 5,
            },
        );

        let row = item.to_row("user-1");
        assert_eq!(row.user_id, "user-1");
        assert_eq!(row.media_id, "603");
        assert_eq!(row.watched, 1200.0);

        let back: MediaItem = row.into();
        assert_eq!(back, item);
    }
}

//! Mock providers for end-to-end tests.
//!
//! Every external HTTP dependency sits behind a trait; these mocks let
//! the server test fixture run the full router without touching the
//! network. Local storage uses the real sqlite stores in memory.

mod mock_downloads;
mod mock_metadata;
mod mock_sports;
mod mock_torrents;
mod mock_vision;

pub use mock_downloads::MockDownloads;
pub use mock_metadata::MockMetadata;
pub use mock_sports::MockSports;
pub use mock_torrents::MockTorrents;
pub use mock_vision::MockVision;

/// Canned domain objects with reasonable defaults.
pub mod fixtures {
    use std::collections::HashMap;

    use crate::downloads::DownloadLink;
    use crate::media::MediaKind;
    use crate::metadata::{Genre, MediaSummary, MovieDetails, SeasonSummary, TvDetails};
    use crate::progress::{MediaItem, MediaProgress};
    use crate::sports::{Sport, SportsMatch, StreamLink, StreamSourceRef};
    use crate::torrents::TorrentResult;

    pub fn media_summary(id: u64, kind: MediaKind, title: &str) -> MediaSummary {
        MediaSummary {
            id,
            kind,
            title: title.to_string(),
            release_date: Some("1999-03-30".to_string()),
            overview: Some(format!("Overview of {title}")),
            poster_path: Some(format!("/poster-{id}.jpg")),
            backdrop_path: None,
            vote_average: Some(7.5),
        }
    }

    pub fn movie_details(id: u64, title: &str) -> MovieDetails {
        MovieDetails {
            id,
            title: title.to_string(),
            original_title: None,
            release_date: Some("1999-03-30".to_string()),
            runtime_minutes: Some(136),
            overview: Some(format!("Overview of {title}")),
            poster_path: Some(format!("/poster-{id}.jpg")),
            backdrop_path: None,
            genres: vec![Genre {
                id: 878,
                name: "Science Fiction".to_string(),
            }],
            vote_average: Some(8.2),
            imdb_id: Some(format!("tt{id:07}")),
        }
    }

    pub fn tv_details(id: u64, name: &str, seasons: u32) -> TvDetails {
        TvDetails {
            id,
            name: name.to_string(),
            original_name: None,
            first_air_date: Some("2008-01-20".to_string()),
            overview: Some(format!("Overview of {name}")),
            poster_path: Some(format!("/poster-{id}.jpg")),
            backdrop_path: None,
            number_of_seasons: seasons,
            number_of_episodes: seasons * 10,
            seasons: (1..=seasons)
                .map(|n| SeasonSummary {
                    season_number: n,
                    name: Some(format!("Season {n}")),
                    episode_count: 10,
                    air_date: None,
                    poster_path: None,
                })
                .collect(),
            genres: Vec::new(),
            vote_average: Some(8.9),
        }
    }

    pub fn sport(id: &str, name: &str) -> Sport {
        Sport {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    pub fn sports_match(id: &str, title: &str, popular: bool) -> SportsMatch {
        SportsMatch {
            id: id.to_string(),
            title: title.to_string(),
            category: "football".to_string(),
            date: 1_700_000_000_000,
            popular,
            poster: None,
            teams: None,
            sources: vec![StreamSourceRef {
                source: "alpha".to_string(),
                id: id.to_string(),
            }],
        }
    }

    pub fn stream_link(id: &str, stream_no: u32) -> StreamLink {
        StreamLink {
            id: id.to_string(),
            stream_no,
            language: "english".to_string(),
            hd: true,
            embed_url: format!("https://embed.example/{id}/{stream_no}"),
            source: "alpha".to_string(),
        }
    }

    pub fn download_link(label: &str, quality: &str) -> DownloadLink {
        DownloadLink {
            label: label.to_string(),
            quality: Some(quality.to_string()),
            size: Some("1.2 GB".to_string()),
            url: format!("https://dl.example/{}", label.to_lowercase()),
        }
    }

    pub fn torrent_result(title: &str, quality: &str, seeds: u32) -> TorrentResult {
        TorrentResult {
            title: title.to_string(),
            quality: Some(quality.to_string()),
            size: Some("2.0 GB".to_string()),
            seeds,
            peers: seeds / 2,
            magnet: format!("magnet:?xt=urn:btih:{:040}", seeds),
        }
    }

    pub fn media_item(id: &str, title: &str, watched: f64, duration: f64) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            kind: MediaKind::Movie,
            title: title.to_string(),
            poster_path: Some(format!("/poster-{id}.jpg")),
            backdrop_path: None,
            progress: MediaProgress::new(watched, duration),
            last_season_watched: None,
            last_episode_watched: None,
            episodes: HashMap::new(),
            last_updated: 1_700_000_000_000,
        }
    }
}

//! YTS-style torrent index client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::TorrentIndexConfig;

use super::{TorrentIndex, TorrentIndexError, TorrentResult};

const TRACKERS: &[&str] = &[
    "udp://open.demonii.com:1337/announce",
    "udp://tracker.openbittorrent.com:80",
    "udp://tracker.opentrackr.org:1337/announce",
];

pub struct TorrentIndexClient {
    client: Client,
    base_url: String,
}

impl TorrentIndexClient {
    pub fn new(config: &TorrentIndexConfig) -> Result<Self, TorrentIndexError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn magnet(hash: &str, display_name: &str) -> String {
        let mut magnet = format!(
            "magnet:?xt=urn:btih:{}&dn={}",
            hash,
            urlencoding::encode(display_name)
        );
        for tracker in TRACKERS {
            magnet.push_str("&tr=");
            magnet.push_str(&urlencoding::encode(tracker));
        }
        magnet
    }
}

#[async_trait]
impl TorrentIndex for TorrentIndexClient {
    async fn search_movie(
        &self,
        imdb_id: &str,
        title: Option<&str>,
    ) -> Result<Vec<TorrentResult>, TorrentIndexError> {
        debug!(imdb_id, ?title, "torrent index movie search");
        let response = self
            .client
            .get(format!("{}/list_movies.json", self.base_url))
            .query(&[("query_term", imdb_id)])
            .send()
            .await?;

        let status = response.status();
        // Unknown identifier: empty result, never an error and never cached
        if status == 404 {
            return Ok(vec![]);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TorrentIndexError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let wire: WireListResponse = response.json().await.map_err(|e| {
            TorrentIndexError::Parse(format!("failed to parse index response: {e}"))
        })?;

        let mut movies = wire.data.map(|d| d.movies).unwrap_or_default();

        // The index occasionally matches several entries for one identifier;
        // when the caller passed a title, prefer the exact title match.
        if movies.len() > 1 {
            if let Some(title) = title {
                let wanted = title.to_lowercase();
                if let Some(pos) = movies
                    .iter()
                    .position(|m| m.title.to_lowercase() == wanted)
                {
                    let exact = movies.swap_remove(pos);
                    movies = vec![exact];
                }
            }
        }

        let results = movies
            .into_iter()
            .flat_map(|movie| {
                let movie_title = movie.title;
                let year = movie.year;
                movie.torrents.into_iter().map(move |t| {
                    let display = match year {
                        Some(year) => format!("{movie_title} ({year})"),
                        None => movie_title.clone(),
                    };
                    TorrentResult {
                        title: display.clone(),
                        quality: t.quality,
                        size: t.size,
                        seeds: t.seeds.unwrap_or(0),
                        peers: t.peers.unwrap_or(0),
                        magnet: Self::magnet(&t.hash, &display),
                    }
                })
            })
            .collect();

        Ok(results)
    }
}

#[derive(Debug, Deserialize)]
struct WireListResponse {
    data: Option<WireData>,
}

#[derive(Debug, Deserialize)]
struct WireData {
    #[serde(default)]
    movies: Vec<WireMovie>,
}

#[derive(Debug, Deserialize)]
struct WireMovie {
    title: String,
    year: Option<u32>,
    #[serde(default)]
    torrents: Vec<WireTorrent>,
}

#[derive(Debug, Deserialize)]
struct WireTorrent {
    hash: String,
    quality: Option<String>,
    size: Option<String>,
    seeds: Option<u32>,
    peers: Option<u32>,
}

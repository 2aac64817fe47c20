//! Mock torrent index.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::torrents::{TorrentIndex, TorrentIndexError, TorrentResult};

/// Results keyed by IMDb id; unknown ids yield an empty list, matching
/// the real client's 404 handling.
#[derive(Default)]
pub struct MockTorrents {
    results: Mutex<HashMap<String, Vec<TorrentResult>>>,
    calls: AtomicUsize,
}

impl MockTorrents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_results(&self, imdb_id: &str, results: Vec<TorrentResult>) {
        self.results
            .lock()
            .unwrap()
            .insert(imdb_id.to_string(), results);
    }

    pub fn upstream_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TorrentIndex for MockTorrents {
    async fn search_movie(
        &self,
        imdb_id: &str,
        _title: Option<&str>,
    ) -> Result<Vec<TorrentResult>, TorrentIndexError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(imdb_id)
            .cloned()
            .unwrap_or_default())
    }
}

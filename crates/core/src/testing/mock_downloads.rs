//! Mock download-link provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::downloads::{DownloadError, DownloadLink, DownloadProvider};

#[derive(Default)]
pub struct MockDownloads {
    links: Mutex<Vec<DownloadLink>>,
    calls: AtomicUsize,
    fail: Mutex<Option<u16>>,
}

impl MockDownloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_links(&self, links: Vec<DownloadLink>) {
        *self.links.lock().unwrap() = links;
    }

    pub fn fail_with_status(&self, status: Option<u16>) {
        *self.fail.lock().unwrap() = status;
    }

    pub fn upstream_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self) -> Result<Vec<DownloadLink>, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.fail.lock().unwrap() {
            return Err(DownloadError::Api {
                status,
                message: "mock failure".to_string(),
            });
        }
        Ok(self.links.lock().unwrap().clone())
    }
}

#[async_trait]
impl DownloadProvider for MockDownloads {
    async fn movie_links(&self, _id: u64) -> Result<Vec<DownloadLink>, DownloadError> {
        self.respond()
    }

    async fn episode_links(
        &self,
        _id: u64,
        _season: u32,
        _episode: u32,
    ) -> Result<Vec<DownloadLink>, DownloadError> {
        self.respond()
    }
}

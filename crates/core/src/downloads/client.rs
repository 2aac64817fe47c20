//! REST client for the download-link provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::DownloadsConfig;

use super::{DownloadError, DownloadLink, DownloadProvider};

pub struct DownloadClient {
    client: Client,
    base_url: String,
}

impl DownloadClient {
    pub fn new(config: &DownloadsConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, path: &str) -> Result<Vec<DownloadLink>, DownloadError> {
        debug!(path, "download provider request");
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        let status = response.status();
        if status == 404 {
            return Err(DownloadError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DownloadError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let wire: WireLinkList = response
            .json()
            .await
            .map_err(|e| DownloadError::Parse(format!("failed to parse {path} response: {e}")))?;

        Ok(wire.links.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl DownloadProvider for DownloadClient {
    async fn movie_links(&self, id: u64) -> Result<Vec<DownloadLink>, DownloadError> {
        self.fetch(&format!("/movie/{id}")).await
    }

    async fn episode_links(
        &self,
        id: u64,
        season: u32,
        episode: u32,
    ) -> Result<Vec<DownloadLink>, DownloadError> {
        self.fetch(&format!("/tv/{id}/{season}/{episode}")).await
    }
}

#[derive(Debug, Deserialize)]
struct WireLinkList {
    #[serde(default)]
    links: Vec<WireLink>,
}

#[derive(Debug, Deserialize)]
struct WireLink {
    #[serde(alias = "name")]
    label: String,
    quality: Option<String>,
    size: Option<String>,
    url: String,
}

impl From<WireLink> for DownloadLink {
    fn from(l: WireLink) -> Self {
        Self {
            label: l.label,
            quality: l.quality,
            size: l.size,
            url: l.url,
        }
    }
}

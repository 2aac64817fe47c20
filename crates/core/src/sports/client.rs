//! REST client for the sports-stream directory.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::SportsConfig;

use super::{MatchScope, Sport, SportsError, SportsMatch, SportsProvider, StreamLink};

pub struct SportsClient {
    client: Client,
    base_url: String,
}

impl SportsClient {
    pub fn new(config: SportsConfig) -> Result<Self, SportsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, SportsError> {
        debug!(path, "sports directory request");
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        let status = response.status();
        if status == 404 {
            return Err(SportsError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SportsError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SportsError::Parse(format!("failed to parse {path} response: {e}")))
    }
}

#[async_trait]
impl SportsProvider for SportsClient {
    async fn sports(&self) -> Result<Vec<Sport>, SportsError> {
        self.fetch("/sports").await
    }

    async fn matches(
        &self,
        scope: MatchScope,
        sport: Option<&str>,
    ) -> Result<Vec<SportsMatch>, SportsError> {
        let path = match (scope, sport) {
            (MatchScope::Live, _) => "/matches/live".to_string(),
            (MatchScope::Popular, _) => "/matches/all/popular".to_string(),
            (MatchScope::All, Some(sport)) => {
                format!("/matches/{}", urlencoding::encode(sport))
            }
            (MatchScope::All, None) => "/matches/all".to_string(),
        };
        self.fetch(&path).await
    }

    async fn streams(&self, source: &str, id: &str) -> Result<Vec<StreamLink>, SportsError> {
        let path = format!(
            "/stream/{}/{}",
            urlencoding::encode(source),
            urlencoding::encode(id)
        );
        self.fetch(&path).await
    }
}

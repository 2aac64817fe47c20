//! AI media recognition and Q&A.
//!
//! Two operations against an OpenAI-compatible chat endpoint: identify a
//! movie/show from an uploaded photo, and answer a free-text question given
//! a media context object. Upstream rate limiting is a distinguished error
//! so routes can surface a 429 with a retry message instead of a generic
//! failure.

mod client;

pub use client::VisionClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::MediaKind;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream model rate limit; surfaced to users as "try again shortly".
    #[error("AI service rate limit exceeded")]
    RateLimited,

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse model output: {0}")]
    Parse(String),

    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Uploaded image, base64-encoded with its MIME type.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageUpload {
    pub data: String,
    pub mime: String,
}

/// Structured identification guess returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaGuess {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
    /// Model confidence in [0, 1].
    pub confidence: f32,
    pub description: String,
}

/// Media context passed alongside free-text questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaContext {
    pub id: u64,
    pub kind: MediaKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Identify the media shown in an image.
    async fn analyze_image(&self, image: &ImageUpload) -> Result<MediaGuess, VisionError>;

    /// Answer a free-text question about a specific title.
    async fn ask(&self, question: &str, context: &MediaContext) -> Result<String, VisionError>;
}

//! OpenAI-compatible chat client for image recognition and media Q&A.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::VisionConfig;

use super::{ImageUpload, MediaContext, MediaGuess, VisionError, VisionProvider};

const ANALYZE_SYSTEM_PROMPT: &str = "You identify movies and TV shows from screenshots or photos. \
Reply with a single JSON object: {\"type\": \"movie\"|\"tv\"|\"anime\", \"title\": string, \
\"season\": number or null, \"episode\": number or null, \"confidence\": number between 0 and 1, \
\"description\": string}. No prose outside the JSON.";

const ASK_SYSTEM_PROMPT: &str = "You answer questions about a specific movie or TV show. \
Use only the provided context and general knowledge about that title. Be concise.";

pub struct VisionClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl VisionClient {
    pub fn new(config: &VisionConfig) -> Result<Self, VisionError> {
        if config.api_key.is_empty() {
            return Err(VisionError::NotConfigured(
                "vision API key is required".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    async fn complete(&self, body: serde_json::Value) -> Result<String, VisionError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == 401 {
            return Err(VisionError::NotConfigured(
                "invalid vision API key".to_string(),
            ));
        }
        if status == 429 {
            return Err(VisionError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: WireCompletion = response
            .json()
            .await
            .map_err(|e| VisionError::Parse(format!("malformed completion response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| VisionError::Parse("completion had no choices".to_string()))
    }
}

#[async_trait]
impl VisionProvider for VisionClient {
    async fn analyze_image(&self, image: &ImageUpload) -> Result<MediaGuess, VisionError> {
        // Reject garbage before shipping it upstream
        base64::engine::general_purpose::STANDARD
            .decode(&image.data)
            .map_err(|e| VisionError::Parse(format!("invalid base64 image data: {e}")))?;

        debug!(mime = image.mime, model = self.model, "vision analyze request");

        let data_uri = format!("data:{};base64,{}", image.mime, image.data);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": ANALYZE_SYSTEM_PROMPT},
                {"role": "user", "content": [
                    {"type": "text", "text": "What movie or show is this?"},
                    {"type": "image_url", "image_url": {"url": data_uri}}
                ]}
            ],
            "temperature": 0.0,
            "max_tokens": 512,
        });

        let content = self.complete(body).await?;
        parse_guess(&content)
    }

    async fn ask(&self, question: &str, context: &MediaContext) -> Result<String, VisionError> {
        debug!(
            media_id = context.id,
            kind = context.kind.as_str(),
            "vision ask request"
        );

        let context_json = serde_json::to_string(context)
            .map_err(|e| VisionError::Parse(format!("unserializable context: {e}")))?;
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": ASK_SYSTEM_PROMPT},
                {"role": "user", "content": format!("Context: {context_json}\n\nQuestion: {question}")}
            ],
            "temperature": 0.3,
            "max_tokens": 1024,
        });

        self.complete(body).await
    }
}

/// Parse the model's JSON answer, tolerating markdown code fences.
fn parse_guess(content: &str) -> Result<MediaGuess, VisionError> {
    let trimmed = content.trim();
    let stripped = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|s| s.trim_end_matches("```").trim())
        .unwrap_or(trimmed);

    serde_json::from_str(stripped)
        .map_err(|e| VisionError::Parse(format!("{e}: {stripped}")))
}

#[derive(Debug, Deserialize)]
struct WireCompletion {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;

    #[test]
    fn test_parse_guess_plain_json() {
        let guess = parse_guess(
            r#"{"type": "tv", "title": "Breaking Bad", "season": 2, "episode": 8,
                "confidence": 0.93, "description": "Desert scene with the RV."}"#,
        )
        .unwrap();
        assert_eq!(guess.kind, MediaKind::Tv);
        assert_eq!(guess.season, Some(2));
        assert!(guess.confidence > 0.9);
    }

    #[test]
    fn test_parse_guess_with_code_fence() {
        let content = "```json\n{\"type\": \"movie\", \"title\": \"Heat\", \
                       \"confidence\": 0.8, \"description\": \"Bank heist.\"}\n```";
        let guess = parse_guess(content).unwrap();
        assert_eq!(guess.kind, MediaKind::Movie);
        assert_eq!(guess.title, "Heat");
        assert_eq!(guess.season, None);
    }

    #[test]
    fn test_parse_guess_rejects_prose() {
        assert!(parse_guess("I think this is The Matrix.").is_err());
    }
}

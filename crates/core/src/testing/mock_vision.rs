//! Mock vision provider.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::media::MediaKind;
use crate::vision::{ImageUpload, MediaContext, MediaGuess, VisionError, VisionProvider};

pub struct MockVision {
    guess: Mutex<MediaGuess>,
    answer: Mutex<String>,
    rate_limited: Mutex<bool>,
}

impl Default for MockVision {
    fn default() -> Self {
        Self {
            guess: Mutex::new(MediaGuess {
                kind: MediaKind::Movie,
                title: "The Matrix".to_string(),
                season: None,
                episode: None,
                confidence: 0.9,
                description: "Green digital rain.".to_string(),
            }),
            answer: Mutex::new("It came out in 1999.".to_string()),
            rate_limited: Mutex::new(false),
        }
    }
}

impl MockVision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_guess(&self, guess: MediaGuess) {
        *self.guess.lock().unwrap() = guess;
    }

    pub fn set_answer(&self, answer: &str) {
        *self.answer.lock().unwrap() = answer.to_string();
    }

    pub fn set_rate_limited(&self, limited: bool) {
        *self.rate_limited.lock().unwrap() = limited;
    }

    fn check_rate_limit(&self) -> Result<(), VisionError> {
        if *self.rate_limited.lock().unwrap() {
            return Err(VisionError::RateLimited);
        }
        Ok(())
    }
}

#[async_trait]
impl VisionProvider for MockVision {
    async fn analyze_image(&self, _image: &ImageUpload) -> Result<MediaGuess, VisionError> {
        self.check_rate_limit()?;
        Ok(self.guess.lock().unwrap().clone())
    }

    async fn ask(&self, _question: &str, _context: &MediaContext) -> Result<String, VisionError> {
        self.check_rate_limit()?;
        Ok(self.answer.lock().unwrap().clone())
    }
}

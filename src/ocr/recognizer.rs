//! Text recognition: region image in, literal text out.

use super::client::{strip_reasoning, ChatClient};
use super::image::{fit_within, to_data_url};
use super::prompts::{RECOGNITION_SYSTEM_PROMPT, RECOGNITION_USER_PROMPT};
use crate::config::ApiConfig;
use crate::error::Result;
use image::DynamicImage;

/// Transcribes the text in a region image.
pub trait TextRecognizer: Send + Sync {
    /// Return the region's text; an empty string when there is none.
    fn recognize(&self, region: &DynamicImage) -> Result<String>;
}

/// Text recognizer backed by a remote vision-language model.
pub struct RemoteTextRecognizer {
    client: ChatClient,
    max_image_size: u32,
}

impl RemoteTextRecognizer {
    pub fn new(config: ApiConfig) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(config)?,
            max_image_size: 2048,
        })
    }

    /// Set the longest side of the region image sent to the model.
    pub fn with_max_image_size(mut self, size: u32) -> Self {
        self.max_image_size = size;
        self
    }
}

impl TextRecognizer for RemoteTextRecognizer {
    fn recognize(&self, region: &DynamicImage) -> Result<String> {
        let (resized, _) = fit_within(region, self.max_image_size);
        let content = self.client.complete(
            RECOGNITION_SYSTEM_PROMPT,
            RECOGNITION_USER_PROMPT,
            &to_data_url(&resized)?,
        )?;
        Ok(strip_reasoning(&content).to_string())
    }
}

//! Model-server configuration.
//!
//! Each remote model is described by an [`ApiConfig`]; the OCR pipeline needs
//! two of them (layout detector and text recognizer) plus a few image limits,
//! bundled in [`OcrConfig`]. Both can be built in code or read from the
//! environment.

use crate::error::{Error, Result};
use std::time::Duration;

/// Environment variable prefix of the layout-detection model.
pub const LAYOUT_ENV_PREFIX: &str = "DOTS_OCR";

/// Environment variable prefix of the text-recognition model.
pub const RECOGNIZER_ENV_PREFIX: &str = "QWEN";

const DEFAULT_MODEL_NAME: &str = "/model";
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How to reach one OpenAI-compatible model server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:8000/v1`
    pub base_url: String,

    /// Bearer token
    pub api_key: String,

    /// Model name sent in every request
    pub model_name: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion token limit
    pub max_tokens: u32,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Create a config with default model name, temperature, token limit and timeout.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the model name sent with every request.
    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full chat-completions endpoint for this server.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Check that the config can be used to build a client.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(Error::Config("base URL is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "base URL must start with http:// or https://: {}",
                url
            )));
        }
        if self.model_name.trim().is_empty() {
            return Err(Error::Config("model name is empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }
        Ok(())
    }

    /// Read `{PREFIX}_BASE_URL`, `{PREFIX}_API_KEY`, `{PREFIX}_MODEL_NAME` and
    /// the optional `{PREFIX}_TEMPERATURE`, `{PREFIX}_MAX_TOKENS`,
    /// `{PREFIX}_TIMEOUT` (seconds).
    ///
    /// Names of missing required variables are appended to `missing`.
    fn from_source(prefix: &str, source: &dyn EnvSource, missing: &mut Vec<String>) -> Self {
        let mut required = |suffix: &str| {
            let key = format!("{}_{}", prefix, suffix);
            match source.var(&key) {
                Some(v) if !v.trim().is_empty() => v,
                _ => {
                    missing.push(key);
                    String::new()
                }
            }
        };

        let base_url = required("BASE_URL");
        let api_key = required("API_KEY");
        let model_name = required("MODEL_NAME");

        Self {
            base_url,
            api_key,
            model_name,
            temperature: parse_or(source, &format!("{}_TEMPERATURE", prefix), DEFAULT_TEMPERATURE),
            max_tokens: parse_or(source, &format!("{}_MAX_TOKENS", prefix), DEFAULT_MAX_TOKENS),
            timeout: Duration::from_secs(parse_or(
                source,
                &format!("{}_TIMEOUT", prefix),
                DEFAULT_TIMEOUT_SECS,
            )),
        }
    }
}

/// Configuration of the two-stage OCR pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrConfig {
    /// Layout-detection model
    pub layout: ApiConfig,

    /// Text-recognition model
    pub recognizer: ApiConfig,

    /// Longest side, in pixels, of any image sent to a model
    pub max_image_size: u32,

    /// Crops smaller than this on either side are upscaled before recognition
    pub min_block_size: u32,

    /// Detected blocks below this confidence are dropped
    pub min_confidence: f32,
}

impl OcrConfig {
    /// Create a config with default image limits.
    pub fn new(layout: ApiConfig, recognizer: ApiConfig) -> Self {
        Self {
            layout,
            recognizer,
            max_image_size: 2048,
            min_block_size: 32,
            min_confidence: 0.5,
        }
    }

    /// Set the longest side of any image sent to a model.
    pub fn with_max_image_size(mut self, size: u32) -> Self {
        self.max_image_size = size;
        self
    }

    /// Set the side below which crops are upscaled.
    pub fn with_min_block_size(mut self, size: u32) -> Self {
        self.min_block_size = size;
        self
    }

    /// Set the detection confidence threshold, clamped to `0.0..=1.0`.
    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.min_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Read the configuration from process environment variables.
    ///
    /// All missing required variables are reported in a single error.
    pub fn from_env() -> Result<Self> {
        Self::from_source(&ProcessEnv)
    }

    /// Read the configuration from any key/value source.
    pub fn from_source(source: &dyn EnvSource) -> Result<Self> {
        let mut missing = Vec::new();
        let layout = ApiConfig::from_source(LAYOUT_ENV_PREFIX, source, &mut missing);
        let recognizer = ApiConfig::from_source(RECOGNIZER_ENV_PREFIX, source, &mut missing);

        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let config = Self {
            layout,
            recognizer,
            max_image_size: parse_or(source, "OCR_MAX_IMAGE_SIZE", 2048),
            min_block_size: parse_or(source, "OCR_MIN_BLOCK_SIZE", 32),
            min_confidence: parse_or(source, "OCR_MIN_CONFIDENCE", 0.5_f32).clamp(0.0, 1.0),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate both model configs and the image limits.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate().map_err(|e| in_model("layout", e))?;
        self.recognizer.validate().map_err(|e| in_model("recognizer", e))?;
        if self.max_image_size < self.min_block_size {
            return Err(Error::Config(format!(
                "max image size ({}) is smaller than min block size ({})",
                self.max_image_size, self.min_block_size
            )));
        }
        Ok(())
    }
}

/// Prefix a model config error with the model it belongs to.
fn in_model(model: &str, error: Error) -> Error {
    match error {
        Error::Config(msg) => Error::Config(format!("{} model: {}", model, msg)),
        other => other,
    }
}

/// Key/value lookup used to build configs.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for std::collections::HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Parse an optional variable, falling back to `default` when absent or malformed.
fn parse_or<T>(source: &dyn EnvSource, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match source.var(key) {
        None => default,
        Some(raw) if raw.trim().is_empty() => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid value {:?} for {}, using {}", raw, key, default);
            default
        }),
    }
}

//! Blocking client for OpenAI-compatible chat-completions servers.

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

/// Longest response body kept in an [`Error::Api`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// One model server.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    config: ApiConfig,
    endpoint: String,
}

impl ChatClient {
    /// Build a client for the given server.
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {}", e)))?;

        let endpoint = config.completions_url();
        log::debug!(
            "Chat client configured: endpoint={}, model={}",
            endpoint,
            config.model_name
        );

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send one image with a system and a user prompt; return the first
    /// choice's text.
    pub fn complete(&self, system_prompt: &str, user_prompt: &str, image_data_url: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model_name,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: serde_json::Value::String(system_prompt.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: serde_json::json!([
                        {"type": "image_url", "image_url": {"url": image_data_url}},
                        {"type": "text", "text": user_prompt}
                    ]),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let chat_response: ChatResponse = response.json()?;
        log::debug!(
            "{} answered in {} ms",
            self.config.model_name,
            start.elapsed().as_millis()
        );

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| Error::InvalidResponse("response has no choices".into()))
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Strip a surrounding markdown code fence (```` ```json ... ``` ````).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Remove a leading `<think>...</think>` block some models emit.
pub fn strip_reasoning(text: &str) -> &str {
    let trimmed = text.trim_start();
    if trimmed.starts_with("<think>") {
        if let Some(end) = trimmed.find("</think>") {
            return trimmed[end + "</think>".len()..].trim();
        }
    }
    text.trim()
}

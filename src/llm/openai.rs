// SPDX-License-Identifier: MIT

//! OpenAI client - chat completions API

use reqwest::Client;
use serde_json::{json, Value};
use std::env;

use super::{Choice, ChoiceMessage, GenerationConfig, LlmClient, LlmResponse};
use crate::error::ScholarError;
use async_trait::async_trait;

/// OpenAI chat-completions client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
    config: GenerationConfig,
}

impl OpenAiClient {
    /// Create a new client
    ///
    /// Requires `OPENAI_API_KEY`; `OPENAI_BASE_URL` overrides the endpoint.
    pub fn new(model_name: String) -> Result<Self, ScholarError> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| ScholarError::config("OPENAI_API_KEY must be set"))?;
        let base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
            base_url,
            config: GenerationConfig::default(),
        })
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Map the raw completion body into the known envelope shape
    fn parse_response(body: &Value) -> LlmResponse {
        let choices = body
            .get("choices")
            .and_then(Value::as_array)
            .map(|choices| {
                choices
                    .iter()
                    .map(|choice| Choice {
                        text: choice
                            .get("text")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        message: choice
                            .get("message")
                            .and_then(|m| m.get("content"))
                            .and_then(Value::as_str)
                            .map(|content| ChoiceMessage {
                                content: content.to_string(),
                            }),
                    })
                    .collect::<Vec<_>>()
            });

        match choices {
            Some(choices) => LlmResponse::Envelope { choices },
            None => LlmResponse::Json(body.clone()),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn invoke(&self, prompt: &str) -> Result<LlmResponse, ScholarError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = json!({
            "model": self.model_name,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        log::debug!("OpenAI request to {} ({} chars)", url, prompt.len());

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(ScholarError::api("openai", text));
        }

        let resp_json: Value = resp.json().await?;
        Ok(Self::parse_response(&resp_json))
    }
}

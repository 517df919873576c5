// SPDX-License-Identifier: MIT

//! Gemini client - generateContent API

use reqwest::Client;
use serde_json::{json, Value};
use std::env;

use super::{GenerationConfig, LlmClient, LlmResponse};
use crate::error::ScholarError;
use async_trait::async_trait;

/// Google Gemini client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model_name: String,
    config: GenerationConfig,
}

impl GeminiClient {
    /// Create a new client; requires `GOOGLE_API_KEY`
    pub fn new(model_name: String) -> Result<Self, ScholarError> {
        let api_key = env::var("GOOGLE_API_KEY")
            .map_err(|_| ScholarError::config("GOOGLE_API_KEY must be set"))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
            config: GenerationConfig::default(),
        })
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Pull the candidate text out of a generateContent body
    fn parse_response(body: &Value) -> LlmResponse {
        let text = body
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            });

        match text {
            Some(content) => LlmResponse::Direct { content },
            None => LlmResponse::Json(body.clone()),
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn invoke(&self, prompt: &str) -> Result<LlmResponse, ScholarError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model_name, self.api_key
        );

        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_tokens,
            }
        });

        log::debug!("Gemini request ({} chars)", prompt.len());

        let resp = self.client.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(ScholarError::api("gemini", text));
        }

        let resp_json: Value = resp.json().await?;
        Ok(Self::parse_response(&resp_json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::normalize;
    use serde_json::json;

    #[test]
    fn test_parse_candidate_text() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "part one "}, {"text": "part two"}]}
            }]
        });

        let response = GeminiClient::parse_response(&body);
        assert_eq!(normalize(&response), "part one part two");
    }

    #[test]
    fn test_parse_missing_candidates_falls_back() {
        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});

        let response = GeminiClient::parse_response(&body);
        assert!(matches!(response, LlmResponse::Json(_)));
    }
}

// SPDX-License-Identifier: MIT

//! Text embedding capability

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;

use crate::error::ScholarError;

/// Maps text to a dense vector
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ScholarError>;
}

/// OpenAI embeddings client
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl OpenAiEmbedder {
    /// Create a new embedder
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
        })
    }

    fn parse_response(body: &Value) -> Result<Vec<f32>, ScholarError> {
        body.get("data")
            .and_then(Value::as_array)
            .and_then(|data| data.first())
            .and_then(|first| first.get("embedding"))
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_f64)
                    .map(|v| v as f32)
                    .collect()
            })
            .ok_or_else(|| ScholarError::api("openai", "embeddings response missing data"))
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ScholarError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = json!({ "model": self.model_name, "input": text });

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
        Self::parse_response(&resp_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_embedding_vector() {
        let body = json!({
            "data": [{"index": 0, "embedding": [0.1, -0.2, 0.3]}],
            "model": "text-embedding-3-large"
        });

        let vector = OpenAiEmbedder::parse_response(&body).unwrap();
        assert_eq!(vector, vec![0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_parse_missing_data_errors() {
        let body = json!({"error": {"message": "invalid input"}});
        assert!(OpenAiEmbedder::parse_response(&body).is_err());
    }
}

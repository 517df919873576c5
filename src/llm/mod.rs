// SPDX-License-Identifier: MIT

//! LLM capability - provider clients and response normalization
//!
//! The orchestration core only needs "generate text from prompt": one
//! blocking call per node, no streaming, no tool calling. Providers:
//! - [openai] - OpenAI chat completions API
//! - [gemini] - Google Gemini generateContent API

pub mod gemini;
pub mod openai;
mod response;

pub use response::{normalize, Choice, ChoiceMessage, LlmResponse};

use async_trait::async_trait;

use crate::error::ScholarError;

/// Core trait for LLM client implementations
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a fully-rendered prompt, returning the provider's response shape
    async fn invoke(&self, prompt: &str) -> Result<LlmResponse, ScholarError>;
}

/// Generation parameters shared by all providers
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 4096,
        }
    }
}

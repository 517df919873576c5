// SPDX-License-Identifier: MIT

//! Typed error handling for scholar-flow

use thiserror::Error;

/// Top-level error type for scholar-flow
#[derive(Debug, Error)]
pub enum ScholarError {
    /// API errors from external services (OpenAI, Gemini, arXiv, ...)
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// A prompt template referenced a variable that was not supplied
    #[error("Template '{role}' is missing variable '{variable}'")]
    Template { role: String, variable: String },

    /// No template registered under the requested role name
    #[error("Unknown prompt template: {0}")]
    UnknownTemplate(String),

    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Config(String),

    /// An update fragment carried a field outside the declared state schema
    /// and the merge policy was strict
    #[error("Update fragment contains undeclared state field '{field}'")]
    UnknownStateField { field: String },

    /// Vector index errors (dimension mismatch, id/document count mismatch)
    #[error("Vector index error: {0}")]
    Index(String),

    /// Checkpoint load/store failures
    #[error("Checkpoint error for thread '{thread_id}': {message}")]
    Checkpoint { thread_id: String, message: String },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// URL building errors
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

impl ScholarError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template(role: impl Into<String>, variable: impl Into<String>) -> Self {
        Self::Template {
            role: role.into(),
            variable: variable.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a checkpoint error
    pub fn checkpoint(thread_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Checkpoint {
            thread_id: thread_id.into(),
            message: message.into(),
        }
    }

    /// Create from a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<&str> for ScholarError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for ScholarError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

// SPDX-License-Identifier: MIT

//! Retrieval tools consumed by agent stages

mod arxiv;

pub use arxiv::{ArxivParams, ArxivTool};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ScholarError;

/// Retrieval capability: fetch documents for a query
///
/// Results are opaque to the orchestration core; they only need to be
/// stringifiable for prompt embedding, and are stored verbatim in the
/// state's artifacts.
#[async_trait]
pub trait SearchTool: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<Value, ScholarError>;
}

// SPDX-License-Identifier: MIT

//! Agent nodes - one pipeline stage each
//!
//! Every node is a function of the current state to an update fragment,
//! with one remote side effect: an LLM call (plus a retrieval call for the
//! literature search, or an index operation for the vector stage). Prompt
//! rendering failures and remote failures are fatal for the run; nothing
//! is retried and no fallback content is substituted.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::route::{route, AgentRole};
use super::state::{AppState, StateUpdate, VectorAction};
use crate::error::ScholarError;
use crate::llm::{normalize, LlmClient};
use crate::memory::{Document, SimilarityIndex};
use crate::prompts::PromptManager;
use crate::tools::SearchTool;

/// One stage of the pipeline
#[async_trait]
pub trait AgentNode: Send + Sync {
    fn role(&self) -> AgentRole;

    /// Read the state, perform the stage's remote calls, and return the
    /// update fragment to merge
    async fn run(&self, state: &AppState) -> Result<StateUpdate, ScholarError>;
}

/// Run the LLM once and map its output to a state fragment
async fn invoke_and_route(
    role: AgentRole,
    llm: &dyn LlmClient,
    prompt: &str,
    extra: Option<StateUpdate>,
) -> Result<StateUpdate, ScholarError> {
    let raw = llm.invoke(prompt).await?;
    let text = normalize(&raw);
    Ok(route(role, text, extra))
}

fn vars(pairs: Vec<(&str, String)>) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Issues one directive per pass over the current context
pub struct SupervisorNode {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptManager>,
}

impl SupervisorNode {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptManager>) -> Self {
        Self { llm, prompts }
    }
}

#[async_trait]
impl AgentNode for SupervisorNode {
    fn role(&self) -> AgentRole {
        AgentRole::Supervisor
    }

    async fn run(&self, state: &AppState) -> Result<StateUpdate, ScholarError> {
        let prompt = self.prompts.render(
            self.role().template_name(),
            &vars(vec![("dynamic_state", state.context_block())]),
        )?;
        invoke_and_route(self.role(), self.llm.as_ref(), &prompt, None).await
    }
}

/// Queries the retrieval tool, then summarizes the results with the LLM
///
/// The only stage with two remote calls: the raw retrieval output is
/// embedded in the prompt and also folded verbatim into
/// `artifacts.literature_results`, so the natural-language summary and the
/// machine-readable results coexist.
pub struct LiteratureSearchNode {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptManager>,
    search: Arc<dyn SearchTool>,
}

impl LiteratureSearchNode {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptManager>,
        search: Arc<dyn SearchTool>,
    ) -> Self {
        Self {
            llm,
            prompts,
            search,
        }
    }
}

#[async_trait]
impl AgentNode for LiteratureSearchNode {
    fn role(&self) -> AgentRole {
        AgentRole::LiteratureSearch
    }

    async fn run(&self, state: &AppState) -> Result<StateUpdate, ScholarError> {
        let results = self.search.search(&state.research_question).await?;

        let prompt = self.prompts.render(
            self.role().template_name(),
            &vars(vec![
                ("dynamic_state", state.context_block()),
                ("content", results.to_string()),
            ]),
        )?;

        let extra = StateUpdate::default().artifact("literature_results", results);
        invoke_and_route(self.role(), self.llm.as_ref(), &prompt, Some(extra)).await
    }
}

/// Summarizes `artifacts.to_summarize`
pub struct SummarizerNode {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptManager>,
}

impl SummarizerNode {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptManager>) -> Self {
        Self { llm, prompts }
    }
}

#[async_trait]
impl AgentNode for SummarizerNode {
    fn role(&self) -> AgentRole {
        AgentRole::Summarizer
    }

    async fn run(&self, state: &AppState) -> Result<StateUpdate, ScholarError> {
        let prompt = self.prompts.render(
            self.role().template_name(),
            &vars(vec![
                ("dynamic_state", state.context_block()),
                ("content", state.artifact_str("to_summarize")),
            ]),
        )?;
        invoke_and_route(self.role(), self.llm.as_ref(), &prompt, None).await
    }
}

/// Screens `artifacts.to_analyze` for research gaps
pub struct GapFinderNode {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptManager>,
}

impl GapFinderNode {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptManager>) -> Self {
        Self { llm, prompts }
    }
}

#[async_trait]
impl AgentNode for GapFinderNode {
    fn role(&self) -> AgentRole {
        AgentRole::GapFinder
    }

    async fn run(&self, state: &AppState) -> Result<StateUpdate, ScholarError> {
        let prompt = self.prompts.render(
            self.role().template_name(),
            &vars(vec![
                ("dynamic_state", state.context_block()),
                ("content", state.artifact_str("to_analyze")),
                ("research_topic", state.topic.clone()),
                ("existing_research", state.artifact_str("existing_research")),
                ("desired_outcome", state.artifact_str("desired_outcome")),
            ]),
        )?;
        invoke_and_route(self.role(), self.llm.as_ref(), &prompt, None).await
    }
}

/// Weaves extracted data, literature summary, and gaps into the write-up
pub struct SynthesizerWriterNode {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptManager>,
}

impl SynthesizerWriterNode {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptManager>) -> Self {
        Self { llm, prompts }
    }
}

#[async_trait]
impl AgentNode for SynthesizerWriterNode {
    fn role(&self) -> AgentRole {
        AgentRole::SynthesizerWriter
    }

    async fn run(&self, state: &AppState) -> Result<StateUpdate, ScholarError> {
        let prompt = self.prompts.render(
            self.role().template_name(),
            &vars(vec![
                ("dynamic_state", state.context_block()),
                ("content", state.artifact_str("extracted_data")),
                (
                    "literature_summary",
                    state.artifact_str("literature_summary"),
                ),
                ("gaps", state.artifact_str("gaps")),
            ]),
        )?;
        invoke_and_route(self.role(), self.llm.as_ref(), &prompt, None).await
    }
}

/// Adds documents to, or queries, the similarity index
pub struct VectorIndexNode {
    index: Arc<dyn SimilarityIndex>,
}

impl VectorIndexNode {
    pub fn new(index: Arc<dyn SimilarityIndex>) -> Self {
        Self { index }
    }

    fn documents_from(value: Option<&Value>) -> Vec<Document> {
        let Some(Value::Array(items)) = value else {
            return Vec::new();
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(text) => Document::new(text.clone()),
                other => serde_json::from_value(other.clone())
                    .unwrap_or_else(|_| Document::new(other.to_string())),
            })
            .collect()
    }

    fn ids_from(value: Option<&Value>) -> Option<Vec<String>> {
        value.and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[async_trait]
impl AgentNode for VectorIndexNode {
    fn role(&self) -> AgentRole {
        AgentRole::VectorIndex
    }

    async fn run(&self, state: &AppState) -> Result<StateUpdate, ScholarError> {
        let (result, log_line) = match state.vector_action {
            VectorAction::Add => {
                let documents = Self::documents_from(state.artifact("documents"));
                let ids = Self::ids_from(state.artifact("doc_ids"));
                let inserted = self.index.add_documents(documents, ids).await?;
                (
                    serde_json::to_value(inserted)?,
                    "Documents added to vector index.",
                )
            }
            VectorAction::Query => {
                let query_text = state.artifact_str("query_text");
                let k = state
                    .artifact("k")
                    .and_then(Value::as_u64)
                    .unwrap_or(5) as usize;
                let filter = state.artifact("filter").and_then(Value::as_object).cloned();
                let hits = self
                    .index
                    .similarity_search(&query_text, k, filter.as_ref())
                    .await?;
                (
                    serde_json::to_value(hits)?,
                    "Vector index query completed.",
                )
            }
        };

        Ok(StateUpdate::default()
            .artifact("vector_index_result", result)
            .log(log_line))
    }
}

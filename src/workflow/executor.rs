// SPDX-License-Identifier: MIT

//! Workflow executor - the fixed linear state machine
//!
//! Stages run strictly in order; each transition merges the stage's update
//! fragment into the shared state and persists a checkpoint before the
//! next stage starts. A failed stage leaves the previous checkpoint as the
//! last durable state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::checkpoint::{Checkpoint, Checkpointer};
use super::nodes::{
    AgentNode, GapFinderNode, LiteratureSearchNode, SummarizerNode, SupervisorNode,
    SynthesizerWriterNode, VectorIndexNode,
};
use super::route::AgentRole;
use super::state::{AppState, MergePolicy};
use crate::error::ScholarError;
use crate::llm::LlmClient;
use crate::memory::{MemoryStore, SimilarityIndex};
use crate::prompts::PromptManager;
use crate::tools::SearchTool;

/// Payload accepted at the workflow boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub thread_id: String,
    pub topic: String,
    pub research_question: String,
    #[serde(default)]
    pub inclusion_criteria: Vec<String>,
    #[serde(default)]
    pub exclusion_criteria: Vec<String>,
}

/// The literature-review pipeline
pub struct ResearchWorkflow {
    stages: Vec<Arc<dyn AgentNode>>,
    checkpointer: Arc<dyn Checkpointer>,
    policy: MergePolicy,
    memory: Option<Arc<MemoryStore>>,
}

impl ResearchWorkflow {
    /// Build a workflow over an explicit stage list
    pub fn new(stages: Vec<Arc<dyn AgentNode>>, checkpointer: Arc<dyn Checkpointer>) -> Self {
        Self {
            stages,
            checkpointer,
            policy: MergePolicy::default(),
            memory: None,
        }
    }

    /// The fixed default chain:
    /// Supervisor -> LiteratureSearch -> Summarizer -> GapFinder ->
    /// SynthesizerWriter -> VectorIndex
    pub fn standard(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptManager>,
        search: Arc<dyn SearchTool>,
        index: Arc<dyn SimilarityIndex>,
        checkpointer: Arc<dyn Checkpointer>,
    ) -> Self {
        let stages: Vec<Arc<dyn AgentNode>> = vec![
            Arc::new(SupervisorNode::new(llm.clone(), prompts.clone())),
            Arc::new(LiteratureSearchNode::new(
                llm.clone(),
                prompts.clone(),
                search,
            )),
            Arc::new(SummarizerNode::new(llm.clone(), prompts.clone())),
            Arc::new(GapFinderNode::new(llm.clone(), prompts.clone())),
            Arc::new(SynthesizerWriterNode::new(llm, prompts)),
            Arc::new(VectorIndexNode::new(index)),
        ];
        Self::new(stages, checkpointer)
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Record the final synthesis in long-term memory on completion
    pub fn with_memory(mut self, memory: Arc<MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Roles in execution order
    pub fn stage_roles(&self) -> Vec<AgentRole> {
        self.stages.iter().map(|node| node.role()).collect()
    }

    /// Run (or resume) the workflow for a thread id
    ///
    /// `initial` is only used for a fresh thread; a known thread id picks
    /// up from its last checkpoint, and a completed run returns the
    /// persisted state without invoking any node.
    pub async fn run(
        &self,
        thread_id: &str,
        initial: AppState,
    ) -> Result<AppState, ScholarError> {
        let (mut state, start) = match self.checkpointer.load(thread_id).await? {
            Some(checkpoint) => {
                if checkpoint.next_stage >= self.stages.len() {
                    log::info!("Thread '{}' already completed", thread_id);
                    return Ok(checkpoint.state);
                }
                log::info!(
                    "Resuming thread '{}' at stage {}",
                    thread_id,
                    checkpoint.next_stage
                );
                (checkpoint.state, checkpoint.next_stage)
            }
            None => (initial, 0),
        };

        for (i, node) in self.stages.iter().enumerate().skip(start) {
            log::info!("Executing stage {} ({})", i, node.role());
            let update = node.run(&state).await?;
            state = state.merge(&update, self.policy)?;
            self.checkpointer
                .save(&Checkpoint::new(thread_id, i + 1, state.clone()))
                .await?;
        }

        if let Some(memory) = &self.memory {
            let synthesis = state.artifact_str("synthesis");
            if !synthesis.is_empty() {
                memory.save("synthesis", thread_id, &synthesis).await?;
            }
        }

        log::info!("Thread '{}' completed", thread_id);
        Ok(state)
    }

    /// Workflow entry point: build the initial state from a request payload
    pub async fn invoke(&self, request: &RunRequest) -> Result<AppState, ScholarError> {
        let initial = AppState::for_run(
            request.topic.clone(),
            request.research_question.clone(),
            request.inclusion_criteria.clone(),
            request.exclusion_criteria.clone(),
        );
        self.run(&request.thread_id, initial).await
    }
}

// SPDX-License-Identifier: MIT

//! Agent identity and response routing
//!
//! `route` is the only place that decides which state fields an agent's
//! normalized text lands in. The mapping is a closed, exhaustive match so
//! adding a role is a compile-time change, not a stringly-typed branch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::StateUpdate;

/// The fixed set of agent roles in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Supervisor,
    LiteratureSearch,
    Summarizer,
    GapFinder,
    SynthesizerWriter,
    VectorIndex,
}

impl AgentRole {
    /// Stable identifier, used in logs and issue records
    pub fn id(&self) -> &'static str {
        match self {
            Self::Supervisor => "supervisor",
            Self::LiteratureSearch => "literature_search",
            Self::Summarizer => "summarizer",
            Self::GapFinder => "gap_finder",
            Self::SynthesizerWriter => "synthesizer_writer",
            Self::VectorIndex => "vector_index",
        }
    }

    /// Prompt template name for the LLM-backed roles
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::Supervisor => "expert_supervisor",
            Self::LiteratureSearch => "search_specialist",
            Self::Summarizer => "summary_specialist",
            Self::GapFinder => "screening_specialist",
            Self::SynthesizerWriter => "synthesizer_writer",
            Self::VectorIndex => "vector_index",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Map a normalized response, keyed by agent identity, to a state fragment
///
/// An optional `extra` fragment (e.g. raw search results) is merged into
/// the routed fragment before returning: artifacts combine key-by-key, and
/// when both sides hold a JSON object under the same artifacts key the two
/// objects are merged one level deep rather than one replacing the other.
pub fn route(role: AgentRole, text: String, extra: Option<StateUpdate>) -> StateUpdate {
    let routed = match role {
        AgentRole::Supervisor => StateUpdate::default()
            .directive(text)
            .log("Supervisor issued directive."),
        AgentRole::Summarizer => StateUpdate::default()
            .artifact("summary", Value::String(text))
            .log("Summarizer completed."),
        AgentRole::GapFinder => StateUpdate::default()
            .artifact("gaps", Value::String(text))
            .log("Gap analysis completed."),
        AgentRole::SynthesizerWriter => StateUpdate::default()
            .artifact("synthesis", Value::String(text))
            .log("Synthesizer/Writer completed synthesis."),
        AgentRole::LiteratureSearch => StateUpdate::default()
            .artifact("literature_summary", Value::String(text))
            .log("Literature search and summary completed."),
        // Roles with no dedicated mapping fall back to a generic overwrite
        AgentRole::VectorIndex => {
            StateUpdate::default().artifact("content", Value::String(text))
        }
    };

    match extra {
        Some(extra) => merge_extra(routed, extra),
        None => routed,
    }
}

fn merge_extra(mut routed: StateUpdate, extra: StateUpdate) -> StateUpdate {
    for (key, value) in extra.artifacts {
        let combined = match (routed.artifacts.get_mut(&key), &value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                for (sub_key, sub_value) in incoming {
                    existing.insert(sub_key.clone(), sub_value.clone());
                }
                true
            }
            _ => false,
        };
        if !combined {
            routed.artifacts.insert(key, value);
        }
    }

    routed.progress_log.extend(extra.progress_log);
    routed.issues_log.extend(extra.issues_log);
    routed
        .supervisor_directives
        .extend(extra.supervisor_directives);
    routed.messages.extend(extra.messages);
    if extra.iteration_count.is_some() {
        routed.iteration_count = extra.iteration_count;
    }
    if extra.vector_action.is_some() {
        routed.vector_action = extra.vector_action;
    }
    routed.extra.extend(extra.extra);
    routed
}

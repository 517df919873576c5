// SPDX-License-Identifier: MIT

//! Shared workflow state with declared per-field merge semantics
//!
//! `AppState` is the single source of truth threaded through every agent
//! stage. Nodes never mutate it directly: they return a `StateUpdate`
//! fragment and the executor merges it in with the reducer declared for
//! each field:
//!
//! - `artifacts` - shallow overwrite-by-key
//! - `progress_log`, `issues_log`, `supervisor_directives` - append
//! - `messages` - append with upsert by message id
//! - `iteration_count`, `vector_action` - replace
//! - undeclared fields - governed by `MergePolicy`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::ScholarError;

/// Lifecycle of a reported issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IssueStatus {
    Open,
    Resolved,
}

/// A problem surfaced by an agent during the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub source_agent: String,
    pub description: String,
    pub status: IssueStatus,
}

/// One entry of the conversation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// What the vector index stage should do with the current state
///
/// Anything that is not `add` is treated as a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VectorAction {
    Add,
    #[default]
    #[serde(other)]
    Query,
}

/// How to treat update fragments carrying fields outside the declared schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Reject the fragment with `ScholarError::UnknownStateField`
    Strict,
    /// Union the unknown fields into `AppState::extra` and log a warning
    #[default]
    ForwardCompatible,
}

/// Partial state produced by a single agent stage
///
/// Every field carries only the contribution of one node; fields left at
/// their default are not touched by the merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StateUpdate {
    #[serde(default)]
    pub artifacts: BTreeMap<String, Value>,
    #[serde(default)]
    pub progress_log: Vec<String>,
    #[serde(default)]
    pub issues_log: Vec<Issue>,
    #[serde(default)]
    pub supervisor_directives: Vec<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_action: Option<VectorAction>,
    /// Fields outside the declared schema; see `MergePolicy`
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StateUpdate {
    pub fn artifact(mut self, key: impl Into<String>, value: Value) -> Self {
        self.artifacts.insert(key.into(), value);
        self
    }

    pub fn log(mut self, line: impl Into<String>) -> Self {
        self.progress_log.push(line.into());
        self
    }

    pub fn directive(mut self, text: impl Into<String>) -> Self {
        self.supervisor_directives.push(text.into());
        self
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

/// The canonical state record for one workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppState {
    // Static inputs, set once before the workflow starts
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub research_question: String,
    #[serde(default)]
    pub inclusion_criteria: Vec<String>,
    #[serde(default)]
    pub exclusion_criteria: Vec<String>,

    // Dynamic fields, mutated only through `merge`
    #[serde(default)]
    pub artifacts: BTreeMap<String, Value>,
    #[serde(default)]
    pub progress_log: Vec<String>,
    #[serde(default)]
    pub issues_log: Vec<Issue>,
    #[serde(default)]
    pub supervisor_directives: Vec<String>,
    #[serde(default)]
    pub iteration_count: u32,
    #[serde(default)]
    pub vector_action: VectorAction,
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Undeclared fields accepted under `MergePolicy::ForwardCompatible`
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
}

impl AppState {
    /// Create the initial state for a run from the static inputs
    pub fn for_run(
        topic: impl Into<String>,
        research_question: impl Into<String>,
        inclusion_criteria: Vec<String>,
        exclusion_criteria: Vec<String>,
    ) -> Self {
        let topic = topic.into();
        let research_question = research_question.into();
        let mut state = Self {
            topic: topic.clone(),
            research_question: research_question.clone(),
            inclusion_criteria,
            exclusion_criteria,
            ..Self::default()
        };
        state
            .messages
            .push(Message::user(format!("{}: {}", topic, research_question)));
        state
    }

    /// Apply an update fragment, producing a new state
    ///
    /// Pure with respect to both inputs; keys absent from the fragment are
    /// left untouched, append-only fields never shrink, and `artifacts`
    /// sub-keys outside the fragment survive the merge.
    pub fn merge(&self, update: &StateUpdate, policy: MergePolicy) -> Result<Self, ScholarError> {
        let mut next = self.clone();

        for (key, value) in &update.artifacts {
            next.artifacts.insert(key.clone(), value.clone());
        }

        next.progress_log.extend(update.progress_log.iter().cloned());
        next.issues_log.extend(update.issues_log.iter().cloned());
        next.supervisor_directives
            .extend(update.supervisor_directives.iter().cloned());

        for message in &update.messages {
            match next.messages.iter_mut().find(|m| m.id == message.id) {
                Some(existing) => *existing = message.clone(),
                None => next.messages.push(message.clone()),
            }
        }

        if let Some(count) = update.iteration_count {
            next.iteration_count = count;
        }
        if let Some(action) = update.vector_action {
            next.vector_action = action;
        }

        if !update.extra.is_empty() {
            match policy {
                MergePolicy::Strict => {
                    let field = update
                        .extra
                        .keys()
                        .next()
                        .cloned()
                        .unwrap_or_default();
                    return Err(ScholarError::UnknownStateField { field });
                }
                MergePolicy::ForwardCompatible => {
                    for (key, value) in &update.extra {
                        log::warn!("Accepting undeclared state field '{}'", key);
                        next.extra.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        Ok(next)
    }

    /// Look up an artifact value
    pub fn artifact(&self, key: &str) -> Option<&Value> {
        self.artifacts.get(key)
    }

    /// Artifact as plain text for prompt interpolation
    ///
    /// Strings come back unquoted; anything else is its JSON rendering;
    /// a missing key is the empty string.
    pub fn artifact_str(&self, key: &str) -> String {
        match self.artifacts.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Render the dynamic context summary interpolated into every prompt
    pub fn context_block(&self) -> String {
        let question = if self.research_question.is_empty() {
            "(none)"
        } else {
            &self.research_question
        };
        let last = |lines: &[String]| -> String {
            let start = lines.len().saturating_sub(3);
            lines[start..].join("\n")
        };
        [
            format!("Research question: {}", question),
            format!("Inclusion: {}", self.inclusion_criteria.join(", ")),
            format!("Last 3 progress lines:\n{}", last(&self.progress_log)),
            format!(
                "Supervisor directives:\n{}",
                last(&self.supervisor_directives)
            ),
            format!("Iteration #{}", self.iteration_count),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_preserves_order() {
        let state = AppState::default();
        let first = StateUpdate::default().log("one");
        let second = StateUpdate::default().log("two");

        let state = state.merge(&first, MergePolicy::default()).unwrap();
        let state = state.merge(&second, MergePolicy::default()).unwrap();

        assert_eq!(state.progress_log, vec!["one", "two"]);
    }

    #[test]
    fn test_artifacts_overwrite_by_key_no_clobber() {
        let state = AppState::default();
        let first = StateUpdate::default().artifact("summary", json!("A"));
        let second = StateUpdate::default().artifact("gaps", json!("B"));

        let state = state.merge(&first, MergePolicy::default()).unwrap();
        let state = state.merge(&second, MergePolicy::default()).unwrap();

        assert_eq!(state.artifact("summary"), Some(&json!("A")));
        assert_eq!(state.artifact("gaps"), Some(&json!("B")));
    }

    #[test]
    fn test_artifacts_same_key_overwrites() {
        let state = AppState::default();
        let first = StateUpdate::default().artifact("summary", json!("old"));
        let second = StateUpdate::default().artifact("summary", json!("new"));

        let state = state.merge(&first, MergePolicy::default()).unwrap();
        let state = state.merge(&second, MergePolicy::default()).unwrap();

        assert_eq!(state.artifact("summary"), Some(&json!("new")));
        assert_eq!(state.artifacts.len(), 1);
    }

    #[test]
    fn test_message_upsert_by_id() {
        let mut original = Message::user("draft");
        original.id = "msg-1".to_string();
        let mut revised = Message::user("final");
        revised.id = "msg-1".to_string();
        let other = Message::new("assistant", "reply");

        let state = AppState::default();
        let state = state
            .merge(
                &StateUpdate::default().message(original).message(other),
                MergePolicy::default(),
            )
            .unwrap();
        assert_eq!(state.messages.len(), 2);

        let state = state
            .merge(
                &StateUpdate::default().message(revised),
                MergePolicy::default(),
            )
            .unwrap();

        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].content, "final");
    }

    #[test]
    fn test_replace_fields() {
        let state = AppState::default();
        let update = StateUpdate {
            iteration_count: Some(3),
            vector_action: Some(VectorAction::Add),
            ..StateUpdate::default()
        };

        let state = state.merge(&update, MergePolicy::default()).unwrap();
        assert_eq!(state.iteration_count, 3);
        assert_eq!(state.vector_action, VectorAction::Add);

        // Fields absent from a fragment stay untouched
        let state = state
            .merge(&StateUpdate::default(), MergePolicy::default())
            .unwrap();
        assert_eq!(state.iteration_count, 3);
        assert_eq!(state.vector_action, VectorAction::Add);
    }

    #[test]
    fn test_unknown_field_strict_rejects() {
        let mut update = StateUpdate::default();
        update.extra.insert("surprise".to_string(), json!(1));

        let err = AppState::default()
            .merge(&update, MergePolicy::Strict)
            .unwrap_err();
        assert!(matches!(
            err,
            ScholarError::UnknownStateField { ref field } if field == "surprise"
        ));
    }

    #[test]
    fn test_unknown_field_forward_compatible_accepts() {
        let mut update = StateUpdate::default();
        update.extra.insert("surprise".to_string(), json!(1));

        let state = AppState::default()
            .merge(&update, MergePolicy::ForwardCompatible)
            .unwrap();
        assert_eq!(state.extra.get("surprise"), Some(&json!(1)));
    }

    #[test]
    fn test_replay_reproduces_state() {
        let fragments = vec![
            StateUpdate::default()
                .artifact("summary", json!("S"))
                .log("first"),
            StateUpdate::default().directive("focus on 2D materials"),
            StateUpdate::default()
                .artifact("gaps", json!("G"))
                .log("second"),
        ];

        let run = |start: AppState| {
            fragments.iter().fold(start, |state, fragment| {
                state.merge(fragment, MergePolicy::default()).unwrap()
            })
        };

        assert_eq!(run(AppState::default()), run(AppState::default()));
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let state = AppState::default();
        let update = StateUpdate::default().log("line");

        let merged = state.merge(&update, MergePolicy::default()).unwrap();

        assert!(state.progress_log.is_empty());
        assert_eq!(update.progress_log, vec!["line"]);
        assert_eq!(merged.progress_log, vec!["line"]);
    }

    #[test]
    fn test_context_block_last_three() {
        let mut state = AppState::for_run(
            "2D materials",
            "X-ray diffraction in 2D materials",
            vec!["peer-reviewed".to_string()],
            vec![],
        );
        for i in 1..=5 {
            state.progress_log.push(format!("step {}", i));
        }

        let block = state.context_block();
        assert!(block.contains("Research question: X-ray diffraction in 2D materials"));
        assert!(block.contains("Inclusion: peer-reviewed"));
        assert!(block.contains("step 3"));
        assert!(block.contains("step 5"));
        assert!(!block.contains("step 2"));
        assert!(block.contains("Iteration #0"));
    }

    #[test]
    fn test_for_run_seeds_user_message() {
        let state = AppState::for_run("graphene", "what is known", vec![], vec![]);
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, "user");
        assert!(state.messages[0].content.contains("graphene"));
    }

    #[test]
    fn test_vector_action_unknown_string_is_query() {
        let action: VectorAction = serde_json::from_value(json!("anything")).unwrap();
        assert_eq!(action, VectorAction::Query);
        let action: VectorAction = serde_json::from_value(json!("add")).unwrap();
        assert_eq!(action, VectorAction::Add);
    }

    #[test]
    fn test_artifact_str_shapes() {
        let mut state = AppState::default();
        state.artifacts.insert("text".to_string(), json!("plain"));
        state.artifacts.insert("obj".to_string(), json!({"k": 1}));

        assert_eq!(state.artifact_str("text"), "plain");
        assert_eq!(state.artifact_str("obj"), r#"{"k":1}"#);
        assert_eq!(state.artifact_str("missing"), "");
    }
}

// SPDX-License-Identifier: MIT

//! Orchestration core: state, routing, agent nodes, and the executor

pub mod checkpoint;
pub mod executor;
pub mod nodes;
pub mod route;
pub mod state;

pub use checkpoint::{Checkpoint, Checkpointer, FileCheckpointer, InMemoryCheckpointer};
pub use executor::{ResearchWorkflow, RunRequest};
pub use nodes::AgentNode;
pub use route::{route, AgentRole};
pub use state::{AppState, Issue, IssueStatus, MergePolicy, Message, StateUpdate, VectorAction};

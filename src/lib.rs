// SPDX-License-Identifier: MIT

//! scholar-flow - multi-agent literature-review orchestration
//!
//! A fixed linear pipeline of agent roles (Supervisor, LiteratureSearch,
//! Summarizer, GapFinder, SynthesizerWriter, VectorIndex) threads a shared
//! typed state through each stage. Stages return partial updates that the
//! executor merges with per-field reducers and checkpoints after every
//! transition, so runs are resumable by thread id.

pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod prompts;
pub mod server;
pub mod tools;
pub mod workflow;

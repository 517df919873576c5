// SPDX-License-Identifier: MIT

//! Checkpoint capability - durable state snapshots keyed by thread id

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

use super::state::AppState;
use crate::error::ScholarError;

/// A durable snapshot of one run
///
/// `next_stage` is the index of the first stage that has not yet run, so a
/// resumed run never re-executes completed nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub thread_id: String,
    pub next_stage: usize,
    pub state: AppState,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(thread_id: impl Into<String>, next_stage: usize, state: AppState) -> Self {
        Self {
            thread_id: thread_id.into(),
            next_stage,
            state,
            updated_at: Utc::now(),
        }
    }
}

/// Load/store checkpoints by thread id
#[async_trait]
pub trait Checkpointer: Send + Sync {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>, ScholarError>;

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), ScholarError>;
}

/// Keeps checkpoints for the lifetime of the process
#[derive(Default)]
pub struct InMemoryCheckpointer {
    checkpoints: RwLock<HashMap<String, Checkpoint>>,
}

impl InMemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Checkpointer for InMemoryCheckpointer {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>, ScholarError> {
        let checkpoints = self.checkpoints.read().await;
        Ok(checkpoints.get(thread_id).cloned())
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), ScholarError> {
        let mut checkpoints = self.checkpoints.write().await;
        checkpoints.insert(checkpoint.thread_id.clone(), checkpoint.clone());
        Ok(())
    }
}

/// One JSON file per thread under a directory
pub struct FileCheckpointer {
    dir: PathBuf,
}

impl FileCheckpointer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, thread_id: &str) -> PathBuf {
        // Thread ids come from callers; keep the file name safe
        let safe: String = thread_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

#[async_trait]
impl Checkpointer for FileCheckpointer {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>, ScholarError> {
        let path = self.path_for(thread_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let checkpoint = serde_json::from_str(&content)
            .map_err(|e| ScholarError::checkpoint(thread_id, e.to_string()))?;
        Ok(Some(checkpoint))
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<(), ScholarError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&checkpoint.thread_id);
        let content = serde_json::to_string_pretty(checkpoint)?;
        std::fs::write(&path, content)?;
        Ok(())
    }
}

// SPDX-License-Identifier: MIT

//! Long-term memory: embeddings, similarity index, and key/value store
//!
//! These components are explicitly constructed and passed by reference;
//! there is no process-wide singleton. They may be shared across
//! concurrent workflow runs and synchronize internally.

mod embed;
mod store;
pub(crate) mod vector;

pub use embed::{Embedder, OpenAiEmbedder};
pub use store::{MemoryRecord, MemoryStore};
pub use vector::{Document, InMemoryVectorIndex, ScoredDocument, SimilarityIndex};

//! Chunkfold - retrieval result reduction
//!
//! Reduces the documents returned by a retrieval step to a minimal,
//! non-redundant set before they reach answer generation: exact duplicates
//! are dropped and overlapping chunks of the same source are fused back into
//! compound documents.

pub mod cli;
pub mod config;
pub mod error;
pub mod retrieval;

pub use error::{ChunkfoldError, Result};

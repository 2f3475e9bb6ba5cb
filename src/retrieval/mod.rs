//! Retrieval result reduction
//!
//! Two independent stages that run in sequence on a retrieved document list:
//! exact-duplicate elimination by content fingerprint, then merging of
//! overlapping chunks that come from the same source.

mod deduplication;
mod document;
mod fingerprint;
mod merge;
mod overlap;
mod pipeline;

pub use deduplication::deduplicate_documents;
pub use document::{Document, FieldPath, RetrievalResult};
pub use fingerprint::{fingerprint, fingerprint_text, FingerprintAlgorithm};
pub use merge::merge_documents;
pub use overlap::{overlap, OverlapMatrix, MIN_OVERLAP};
pub use pipeline::{MissingFieldPolicy, ReduceOptions, Reducer, ReductionStats};

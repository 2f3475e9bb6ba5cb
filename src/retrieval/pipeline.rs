//! Dedup-then-merge reduction of a retrieved document list

use crate::config::Config;
use crate::error::{ChunkfoldError, Result};
use crate::retrieval::{deduplicate_documents, merge_documents, Document, FingerprintAlgorithm};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// What to do when a document lacks the metadata needed to fingerprint it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Propagate the error to the caller
    #[default]
    Error,
    /// Keep the raw list and continue with merging
    Skip,
}

/// Options for a [`Reducer`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReduceOptions {
    pub dedup_enabled: bool,
    pub algorithm: FingerprintAlgorithm,
    pub on_missing_field: MissingFieldPolicy,
    pub merge_enabled: bool,
    /// Dotted grouping path; empty disables merging
    pub source_field: String,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            dedup_enabled: true,
            algorithm: FingerprintAlgorithm::default(),
            on_missing_field: MissingFieldPolicy::default(),
            merge_enabled: true,
            source_field: String::new(),
        }
    }
}

impl From<&Config> for ReduceOptions {
    fn from(config: &Config) -> Self {
        Self {
            dedup_enabled: config.dedup.enabled,
            algorithm: config.dedup.algorithm,
            on_missing_field: config.dedup.on_missing_field,
            merge_enabled: config.merge.enabled,
            source_field: config.merge.source_field.clone(),
        }
    }
}

/// Statistics from a reduction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReductionStats {
    /// Number of input documents
    pub input_documents: usize,
    /// Exact duplicates dropped
    pub duplicates_removed: usize,
    /// Deduplication was skipped because of missing metadata
    pub dedup_skipped: bool,
    /// Characters saved by merging overlaps
    pub merged_characters: usize,
    /// Number of documents handed on
    pub output_documents: usize,
    /// Total processing time in milliseconds
    pub processing_time_ms: u64,
}

impl ReductionStats {
    pub fn documents_removed(&self) -> usize {
        self.input_documents - self.output_documents
    }
}

/// Runs the exact-duplicate eliminator, then the overlap merger
///
/// Holds no state between calls; one reducer can serve any number of
/// independent document lists.
#[derive(Debug, Clone, Default)]
pub struct Reducer {
    options: ReduceOptions,
}

impl Reducer {
    pub fn new(options: ReduceOptions) -> Self {
        Self { options }
    }

    /// Reduce a retrieved document list
    ///
    /// # Returns
    /// Tuple of (reduced documents, statistics)
    pub fn reduce(&self, docs: Vec<Document>) -> Result<(Vec<Document>, ReductionStats)> {
        let start = Instant::now();
        let mut stats = ReductionStats {
            input_documents: docs.len(),
            ..Default::default()
        };

        let docs = if self.options.dedup_enabled {
            self.deduplicate(docs, &mut stats)?
        } else {
            docs
        };

        let docs = if self.options.merge_enabled {
            let (merged, saved) = merge_documents(docs, &self.options.source_field);
            stats.merged_characters = saved;
            merged
        } else {
            docs
        };

        stats.output_documents = docs.len();
        stats.processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Reduced {} documents to {} ({} duplicates, {} chars merged)",
            stats.input_documents,
            stats.output_documents,
            stats.duplicates_removed,
            stats.merged_characters
        );

        Ok((docs, stats))
    }

    fn deduplicate(&self, docs: Vec<Document>, stats: &mut ReductionStats) -> Result<Vec<Document>> {
        match self.options.on_missing_field {
            MissingFieldPolicy::Error => {
                let (kept, removed) = deduplicate_documents(docs, self.options.algorithm)?;
                stats.duplicates_removed = removed;
                Ok(kept)
            }
            MissingFieldPolicy::Skip => {
                // The eliminator consumes its input, keep a copy for the fallback
                match deduplicate_documents(docs.clone(), self.options.algorithm) {
                    Ok((kept, removed)) => {
                        stats.duplicates_removed = removed;
                        Ok(kept)
                    }
                    Err(ChunkfoldError::MissingField { index, field }) => {
                        tracing::warn!(
                            "Document {} has no '{}', skipping deduplication",
                            index,
                            field
                        );
                        stats.dedup_skipped = true;
                        Ok(docs)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }
}

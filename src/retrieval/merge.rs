//! Merging of overlapping chunks from the same source
//!
//! Retrieval often returns several adjacent windows of one source document.
//! Documents are grouped by a configurable source field, and within a group
//! the pair with the largest suffix/prefix overlap is fused repeatedly until
//! no overlap above the threshold remains.

use crate::retrieval::overlap::OverlapMatrix;
use crate::retrieval::{Document, FieldPath};
use ahash::{HashMap, HashMapExt};
use serde_json::Value;

/// One fusion inside a group: `suffix` was appended to the compound that
/// `prefix` belongs to, dropping `overlap` leading chars of `suffix`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MergeStep {
    pub prefix: usize,
    pub suffix: usize,
    pub overlap: usize,
}

/// Result of merging a single source group
#[derive(Debug)]
pub(crate) struct GroupOutcome {
    /// Surviving compound documents with their index inside the group
    pub survivors: Vec<(usize, Document)>,
    /// Fusions in the order they were applied
    pub steps: Vec<MergeStep>,
    /// Characters saved across all fusions
    pub saved: usize,
}

/// Fuse overlapping documents that share a source
///
/// # Arguments
/// * `docs` - Retrieved documents. Taken by value: compound documents are
///   built by mutating the owned instances.
/// * `source_field` - Dotted path of the grouping key, e.g.
///   `metadata.document_id`. Empty disables merging.
///
/// # Returns
/// The reduced documents in original relative order, and the number of
/// characters saved. If the path resolves on none of the documents the input
/// is returned unchanged.
pub fn merge_documents(docs: Vec<Document>, source_field: &str) -> (Vec<Document>, usize) {
    let Some(path) = FieldPath::parse(source_field) else {
        return (docs, 0);
    };
    if docs.is_empty() {
        return (docs, 0);
    }

    let resolved: Vec<Option<Value>> = docs.iter().map(|doc| doc.resolve_path(&path)).collect();
    if resolved.iter().all(Option::is_none) {
        tracing::warn!(
            "Source field '{}' not found on any document, skipping merge",
            path
        );
        return (docs, 0);
    }

    let keys: Vec<Option<String>> = docs
        .iter()
        .zip(resolved)
        .map(|(doc, value)| source_key(doc, value))
        .collect();

    // Groups in order of first appearance; unkeyed documents stand alone
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut by_key: HashMap<&str, usize> = HashMap::new();
    for (index, key) in keys.iter().enumerate() {
        match key {
            Some(key) => {
                let group = *by_key.entry(key.as_str()).or_insert_with(|| {
                    groups.push(Vec::new());
                    groups.len() - 1
                });
                groups[group].push(index);
            }
            None => groups.push(vec![index]),
        }
    }

    let total = docs.len();
    let mut slots: Vec<Option<Document>> = docs.into_iter().map(Some).collect();
    let mut survivors: Vec<(usize, Document)> = Vec::with_capacity(total);
    let mut reduction = 0;

    for members in &groups {
        let group: Vec<Document> = members
            .iter()
            .filter_map(|&index| slots[index].take())
            .collect();

        let outcome = merge_group(group);
        if !outcome.steps.is_empty() {
            tracing::debug!(
                "Merged {} of {} documents for source group (saved {} chars)",
                outcome.steps.len(),
                members.len(),
                outcome.saved
            );
        }

        reduction += outcome.saved;
        survivors.extend(
            outcome
                .survivors
                .into_iter()
                .map(|(local, doc)| (members[local], doc)),
        );
    }

    survivors.sort_by_key(|(index, _)| *index);
    let merged: Vec<Document> = survivors.into_iter().map(|(_, doc)| doc).collect();

    tracing::debug!(
        "Merge reduced {} documents to {} ({} chars saved)",
        total,
        merged.len(),
        reduction
    );

    (merged, reduction)
}

/// Grouping key of a document, `None` if it must stay on its own
fn source_key(doc: &Document, value: Option<Value>) -> Option<String> {
    doc.content.as_ref()?;

    match value? {
        Value::String(s) if s.is_empty() => None,
        // JSON text keeps "1" and 1 apart
        value => Some(value.to_string()),
    }
}

/// Greedily fuse the documents of one source group
pub(crate) fn merge_group(mut group: Vec<Document>) -> GroupOutcome {
    let dim = group.len();
    if dim < 2 {
        return GroupOutcome {
            survivors: group.into_iter().enumerate().collect(),
            steps: Vec::new(),
            saved: 0,
        };
    }

    let texts: Vec<Vec<char>> = group.iter().map(|doc| doc.text().chars().collect()).collect();
    let mut matrix = OverlapMatrix::build(&texts);

    // anchor[i] = index of the compound document that currently owns i
    let mut anchor: Vec<usize> = (0..dim).collect();
    let mut steps = Vec::new();
    let mut saved = 0;

    while let Some((prefix, suffix, overlap)) = matrix.max_entry() {
        let target = anchor[prefix];

        // suffix already heads the compound that prefix ends
        if target == suffix {
            tracing::debug!("Skipping cyclic overlap {} -> {}", prefix, suffix);
            matrix.set(prefix, suffix, -1);
            continue;
        }

        let tail: String = group[suffix].text().chars().skip(overlap).collect();
        let suffix_score = group[suffix].score;
        let suffix_chunks = group[suffix].effective_chunk_count();

        let compound = &mut group[target];
        compound
            .content
            .get_or_insert_with(String::new)
            .push_str(&tail);
        compound.score = max_score(compound.score, suffix_score);
        compound.chunk_count = Some(
            compound
                .effective_chunk_count()
                .saturating_add(suffix_chunks),
        );

        for owner in anchor.iter_mut().filter(|owner| **owner == suffix) {
            *owner = target;
        }

        matrix.consume(prefix, suffix);
        saved += overlap;
        steps.push(MergeStep {
            prefix,
            suffix,
            overlap,
        });
    }

    let survivors = group
        .into_iter()
        .enumerate()
        .filter(|(index, _)| anchor[*index] == *index)
        .collect();

    GroupOutcome {
        survivors,
        steps,
        saved,
    }
}

fn max_score(current: Option<f64>, other: Option<f64>) -> Option<f64> {
    match (current, other) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (score, None) | (None, score) => score,
    }
}

//! Exact-duplicate elimination by content fingerprint

use crate::error::Result;
use crate::retrieval::fingerprint::{fingerprint, FingerprintAlgorithm};
use crate::retrieval::Document;
use ahash::{HashSet, HashSetExt};

/// Drop later occurrences of documents whose fingerprint was already seen
///
/// Fingerprints cover the content plus `title`, `url` (or `document_url`)
/// and `page_number`. Every document is fingerprinted before anything is
/// dropped, so a missing field fails the whole call.
///
/// # Returns
/// Surviving documents in their original order, and the number removed
pub fn deduplicate_documents(
    docs: Vec<Document>,
    algorithm: FingerprintAlgorithm,
) -> Result<(Vec<Document>, usize)> {
    let fingerprints = docs
        .iter()
        .enumerate()
        .map(|(index, doc)| fingerprint(doc, index, algorithm))
        .collect::<Result<Vec<_>>>()?;

    let total = docs.len();
    let mut seen: HashSet<String> = HashSet::with_capacity(total);

    let kept: Vec<Document> = docs
        .into_iter()
        .zip(fingerprints)
        .filter(|(_, hash)| seen.insert(hash.clone()))
        .map(|(doc, _)| doc)
        .collect();

    let removed = total - kept.len();
    tracing::debug!("{} duplicate documents found", removed);

    Ok((kept, removed))
}

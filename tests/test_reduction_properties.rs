//! Property tests for deduplication and overlap merging.

use std::collections::HashSet;

use chunkfold::retrieval::{
    deduplicate_documents, merge_documents, overlap, Document, FingerprintAlgorithm,
};
use proptest::prelude::*;

/// Document drawn from a tiny pool of texts and pages so duplicates are common.
fn arb_listed_doc() -> impl Strategy<Value = Document> {
    (
        prop::sample::select(vec!["alpha chunk", "beta chunk", "gamma chunk"]),
        prop::sample::select(vec!["1", "2"]),
        0.0f64..1.0,
    )
        .prop_map(|(content, page, score)| {
            Document::new(content)
                .with_metadata("title", "Guide")
                .with_metadata("url", "https://example.com/guide")
                .with_metadata("page_number", page)
                .with_score(score)
        })
}

/// Document built from 22-char single-letter blocks, so boundaries overlap in
/// alternating and cyclic patterns.
fn arb_block_doc() -> impl Strategy<Value = Document> {
    (
        prop::collection::vec(prop::sample::select(vec!['a', 'b', 'c', 'd']), 1..4),
        prop::option::of(0.0f64..1.0),
        prop::option::of(1u64..4),
        prop::sample::select(vec!["left", "right"]),
    )
        .prop_map(|(blocks, score, chunk_count, source)| {
            let content: String = blocks
                .iter()
                .map(|c| c.to_string().repeat(22))
                .collect();
            let mut doc = Document::new(content).with_metadata("document_id", source);
            doc.score = score;
            doc.chunk_count = chunk_count;
            doc
        })
}

fn chunk_total(docs: &[Document]) -> u64 {
    docs.iter().map(Document::effective_chunk_count).sum()
}

fn char_total(docs: &[Document]) -> usize {
    docs.iter().map(|d| d.text().chars().count()).sum()
}

/// **Property: deduplication is idempotent and keeps first occurrences**
mod prop_deduplication {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn second_pass_finds_nothing(docs in prop::collection::vec(arb_listed_doc(), 0..12)) {
            let (once, _) = deduplicate_documents(docs, FingerprintAlgorithm::Sha256).unwrap();
            let (twice, removed) =
                deduplicate_documents(once.clone(), FingerprintAlgorithm::Sha256).unwrap();

            prop_assert_eq!(removed, 0);
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn first_occurrences_keep_their_order(docs in prop::collection::vec(arb_listed_doc(), 0..12)) {
            let mut seen = HashSet::new();
            let expected: Vec<Document> = docs
                .iter()
                .filter(|d| seen.insert((d.text().to_string(), d.metadata_str("page_number"))))
                .cloned()
                .collect();

            let total = docs.len();
            let (deduped, removed) =
                deduplicate_documents(docs, FingerprintAlgorithm::Blake3).unwrap();

            prop_assert_eq!(removed, total - expected.len());
            prop_assert_eq!(deduped, expected);
        }
    }
}

/// **Property: merging conserves chunks and accounts for every saved char**
mod prop_merge {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn chunk_counts_are_conserved(docs in prop::collection::vec(arb_block_doc(), 0..8)) {
            let before = chunk_total(&docs);
            let (merged, _) = merge_documents(docs, "metadata.document_id");
            prop_assert_eq!(chunk_total(&merged), before);
        }

        #[test]
        fn saved_chars_match_shrinkage(docs in prop::collection::vec(arb_block_doc(), 0..8)) {
            let before = char_total(&docs);
            let (merged, saved) = merge_documents(docs, "metadata.document_id");
            prop_assert_eq!(char_total(&merged) + saved, before);
        }

        #[test]
        fn merging_is_deterministic(docs in prop::collection::vec(arb_block_doc(), 0..8)) {
            let first = merge_documents(docs.clone(), "metadata.document_id");
            let second = merge_documents(docs, "metadata.document_id");
            prop_assert_eq!(first, second);
        }

        #[test]
        fn merged_score_is_group_maximum(docs in prop::collection::vec(arb_block_doc(), 1..8)) {
            let best = docs.iter().filter_map(|d| d.score).fold(None, |acc: Option<f64>, s| {
                Some(acc.map_or(s, |a| a.max(s)))
            });
            let (merged, _) = merge_documents(docs, "metadata.document_id");
            let merged_best = merged.iter().filter_map(|d| d.score).fold(None, |acc: Option<f64>, s| {
                Some(acc.map_or(s, |a| a.max(s)))
            });
            prop_assert_eq!(merged_best, best);
        }

        #[test]
        fn output_never_grows(docs in prop::collection::vec(arb_block_doc(), 0..8)) {
            let count = docs.len();
            let (merged, _) = merge_documents(docs, "metadata.document_id");
            prop_assert!(merged.len() <= count);
        }

        #[test]
        fn no_grouping_key_is_identity(docs in prop::collection::vec(arb_block_doc(), 0..8)) {
            let (merged, saved) = merge_documents(docs.clone(), "");
            prop_assert_eq!(saved, 0);
            prop_assert_eq!(merged, docs);
        }
    }
}

/// **Property: overlap threshold sits between 20 and 21 shared chars**
mod prop_overlap_threshold {
    use super::*;

    proptest! {
        #[test]
        fn shared_window_length_decides(
            head in "[x-z]{1,10}",
            tail in "[x-z]{1,10}",
            shared in "[a-f]{15,30}",
        ) {
            let a = format!("{head}{shared}");
            let b = format!("{shared}{tail}");
            let n = overlap(&a, &b);

            if shared.len() <= 20 {
                prop_assert_eq!(n, 0);
            } else {
                prop_assert_eq!(n, shared.len());
            }
        }
    }
}

#[test]
fn alternating_overlaps_across_five_documents_terminate() {
    let block = |c: char| c.to_string().repeat(22);
    let docs: Vec<Document> = ["ab", "ba", "ab", "ba", "ab"]
        .iter()
        .map(|pair| {
            let content: String = pair.chars().map(block).collect();
            Document::new(content).with_metadata("document_id", "same")
        })
        .collect();

    let (merged, saved) = merge_documents(docs.clone(), "metadata.document_id");

    assert!(merged.len() < docs.len());
    assert_eq!(chunk_total(&merged), 5);
    assert_eq!(char_total(&merged) + saved, char_total(&docs));
    assert_eq!(merge_documents(docs, "metadata.document_id").0, merged);
}

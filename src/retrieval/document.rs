//! Retrieved documents and dotted field-path lookup

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// A retrieved unit of text as handed over by the retrieval step
///
/// The JSON shape follows the retriever output: the text lives under
/// `page_content` (or `content`), everything else the retriever attached is
/// kept in `extra` so documents pass through the reducer losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Chunk text
    #[serde(
        rename = "page_content",
        alias = "content",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<String>,

    /// Retriever metadata (title, url, page_number, source ids, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,

    /// Similarity score, propagated but never computed here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Number of original chunks this document stands for (absent = 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<u64>,

    /// Any other top-level fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Create a document with the given text and no metadata
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            metadata: Map::new(),
            score: None,
            chunk_count: None,
            extra: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_chunk_count(mut self, chunk_count: u64) -> Self {
        self.chunk_count = Some(chunk_count);
        self
    }

    /// Chunk count with the absent-means-one default applied
    pub fn effective_chunk_count(&self) -> u64 {
        self.chunk_count.unwrap_or(1)
    }

    /// Text of the document, empty when it has none
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Metadata value rendered as text
    ///
    /// Strings are returned verbatim, other JSON values as their JSON text.
    /// Absent keys and `null` yield `None`.
    pub fn metadata_str(&self, key: &str) -> Option<String> {
        match self.metadata.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Look up a dotted path against the document's JSON shape
    ///
    /// The first segment selects `metadata`, `page_content`/`content`,
    /// `score`, `chunk_count` or any extra top-level field. Remaining
    /// segments index objects by key and arrays by position. Returns `None`
    /// as soon as a step is missing.
    pub fn resolve_path(&self, path: &FieldPath) -> Option<Value> {
        let (head, rest) = path.segments.split_first()?;

        match head.as_str() {
            "metadata" => match rest.split_first() {
                None => Some(Value::Object(self.metadata.clone())),
                Some((key, rest)) => descend(self.metadata.get(key)?, rest).cloned(),
            },
            "page_content" | "content" => {
                let content = self.content.as_ref()?;
                leaf(Value::String(content.clone()), rest)
            }
            "score" => leaf(Value::Number(Number::from_f64(self.score?)?), rest),
            "chunk_count" => leaf(Value::from(self.chunk_count?), rest),
            other => descend(self.extra.get(other)?, rest).cloned(),
        }
    }

    /// Get a short preview of the text (first N characters)
    pub fn preview(&self, max_chars: usize) -> String {
        let text = self.text();
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let head: String = text.chars().take(max_chars).collect();
            format!("{}...", head)
        }
    }
}

fn descend<'a>(mut value: &'a Value, segments: &[String]) -> Option<&'a Value> {
    for segment in segments {
        value = match value {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(value)
}

fn leaf(value: Value, rest: &[String]) -> Option<Value> {
    rest.is_empty().then_some(value)
}

/// Parsed dotted field path, e.g. `metadata.document_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path; an empty or blank string means "no path"
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }

        Some(Self {
            segments: path.split('.').map(str::to_string).collect(),
        })
    }

    /// True if any segment is empty (e.g. `metadata..id`)
    pub fn has_empty_segment(&self) -> bool {
        self.segments.iter().any(|s| s.is_empty())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Retriever output accepted on input: a bare list, or an answer payload
/// carrying `source_documents`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RetrievalResult {
    Documents(Vec<Document>),
    Answer { source_documents: Vec<Document> },
}

impl RetrievalResult {
    pub fn into_documents(self) -> Vec<Document> {
        match self {
            RetrievalResult::Documents(docs) => docs,
            RetrievalResult::Answer { source_documents } => source_documents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(p: &str) -> FieldPath {
        FieldPath::parse(p).unwrap()
    }

    #[test]
    fn test_parse_empty_path() {
        assert!(FieldPath::parse("").is_none());
        assert!(FieldPath::parse("   ").is_none());
        assert_eq!(path("metadata.document_id").to_string(), "metadata.document_id");
        assert!(path("metadata..id").has_empty_segment());
    }

    #[test]
    fn test_resolve_metadata_path() {
        let doc = Document::new("text")
            .with_metadata("document_id", "doc-7")
            .with_metadata("source", json!({"ids": ["a", "b"]}));

        assert_eq!(
            doc.resolve_path(&path("metadata.document_id")),
            Some(json!("doc-7"))
        );
        assert_eq!(
            doc.resolve_path(&path("metadata.source.ids.1")),
            Some(json!("b"))
        );
        assert_eq!(doc.resolve_path(&path("metadata.missing")), None);
        assert_eq!(doc.resolve_path(&path("metadata.document_id.deeper")), None);
        assert_eq!(doc.resolve_path(&path("metadata.source.ids.9")), None);
    }

    #[test]
    fn test_resolve_top_level_fields() {
        let mut doc = Document::new("text").with_score(0.5).with_chunk_count(3);
        doc.extra.insert("id".to_string(), json!("chunk-1"));

        assert_eq!(doc.resolve_path(&path("page_content")), Some(json!("text")));
        assert_eq!(doc.resolve_path(&path("score")), Some(json!(0.5)));
        assert_eq!(doc.resolve_path(&path("chunk_count")), Some(json!(3)));
        assert_eq!(doc.resolve_path(&path("id")), Some(json!("chunk-1")));
        assert_eq!(doc.resolve_path(&path("nope")), None);
    }

    #[test]
    fn test_metadata_str_renders_numbers() {
        let doc = Document::new("x")
            .with_metadata("page_number", 4)
            .with_metadata("title", "Guide")
            .with_metadata("url", Value::Null);

        assert_eq!(doc.metadata_str("page_number").as_deref(), Some("4"));
        assert_eq!(doc.metadata_str("title").as_deref(), Some("Guide"));
        assert_eq!(doc.metadata_str("url"), None);
        assert_eq!(doc.metadata_str("absent"), None);
    }

    #[test]
    fn test_json_shape() {
        let raw = json!({
            "page_content": "hello",
            "metadata": {"title": "T"},
            "score": 0.75,
            "id": "c1"
        });

        let doc: Document = serde_json::from_value(raw).unwrap();
        assert_eq!(doc.content.as_deref(), Some("hello"));
        assert_eq!(doc.score, Some(0.75));
        assert_eq!(doc.chunk_count, None);
        assert_eq!(doc.extra.get("id"), Some(&json!("c1")));

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["page_content"], json!("hello"));
        assert_eq!(back["id"], json!("c1"));
        assert!(back.get("chunk_count").is_none());
    }

    #[test]
    fn test_content_alias_and_missing_content() {
        let doc: Document = serde_json::from_value(json!({"content": "x"})).unwrap();
        assert_eq!(doc.content.as_deref(), Some("x"));

        let doc: Document = serde_json::from_value(json!({"metadata": {}})).unwrap();
        assert!(doc.content.is_none());
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn test_retrieval_result_shapes() {
        let list: RetrievalResult =
            serde_json::from_value(json!([{"page_content": "a"}])).unwrap();
        assert_eq!(list.into_documents().len(), 1);

        let answer: RetrievalResult = serde_json::from_value(json!({
            "source_documents": [{"page_content": "a"}, {"page_content": "b"}]
        }))
        .unwrap();
        assert_eq!(answer.into_documents().len(), 2);
    }

    #[test]
    fn test_preview_is_char_safe() {
        let doc = Document::new("héllo wörld");
        assert_eq!(doc.preview(5), "héllo...");
        assert_eq!(doc.preview(50), "héllo wörld");
    }
}

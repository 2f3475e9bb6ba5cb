//! Content fingerprints for exact-duplicate detection

use crate::error::{ChunkfoldError, Result};
use crate::retrieval::Document;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Hash used to fingerprint documents. Both produce 64 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl FromStr for FingerprintAlgorithm {
    type Err = ChunkfoldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(ChunkfoldError::InvalidConfigValue {
                path: "dedup.algorithm".to_string(),
                message: format!("Algorithm must be 'sha256' or 'blake3', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for FingerprintAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Build the text that gets hashed for a document
///
/// Layout: `content\nTitle: <title>\nUrl: <url>\nPage: <page>`. The url is
/// read from `url`, falling back to `document_url`.
pub fn fingerprint_text(doc: &Document, index: usize) -> Result<String> {
    let content = doc
        .content
        .as_deref()
        .ok_or_else(|| ChunkfoldError::missing_field(index, "page_content"))?;
    let title = required(doc, index, "title")?;
    let url = doc
        .metadata_str("url")
        .or_else(|| doc.metadata_str("document_url"))
        .ok_or_else(|| ChunkfoldError::missing_field(index, "url"))?;
    let page = required(doc, index, "page_number")?;

    Ok(format!(
        "{}\nTitle: {}\nUrl: {}\nPage: {}",
        content, title, url, page
    ))
}

/// Hex fingerprint of a document
pub fn fingerprint(
    doc: &Document,
    index: usize,
    algorithm: FingerprintAlgorithm,
) -> Result<String> {
    let text = fingerprint_text(doc, index)?;

    let digest = match algorithm {
        FingerprintAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            format!("{:x}", hasher.finalize())
        }
        FingerprintAlgorithm::Blake3 => blake3::hash(text.as_bytes()).to_hex().to_string(),
    };

    Ok(digest)
}

fn required(doc: &Document, index: usize, field: &str) -> Result<String> {
    doc.metadata_str(field)
        .ok_or_else(|| ChunkfoldError::missing_field(index, field))
}

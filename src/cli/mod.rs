//! CLI command definitions and parsing
use crate::retrieval::FingerprintAlgorithm;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "chunkfold",
    version,
    author = "neur0map",
    about = "Reduce retrieved chunks to a minimal, non-redundant document set",
    long_about = "Chunkfold takes the documents returned by a retrieval step, drops exact duplicates \
                  by content fingerprint and merges overlapping chunks of the same source back into \
                  compound documents before they are handed to answer generation."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/chunkfold/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deduplicate and merge a list of retrieved documents
    Reduce {
        /// JSON file with documents (reads stdin when absent or "-")
        input: Option<PathBuf>,

        /// Dotted path of the grouping key (e.g. "metadata.document_id")
        #[arg(short, long)]
        source_field: Option<String>,

        /// Skip exact-duplicate elimination
        #[arg(long)]
        no_dedup: bool,

        /// Skip overlap merging
        #[arg(long)]
        no_merge: bool,

        /// Fingerprint algorithm
        #[arg(long, value_enum)]
        algorithm: Option<AlgorithmArg>,

        /// Continue without deduplication when metadata is missing
        #[arg(long)]
        skip_invalid: bool,

        /// Profile to use (e.g., "raw")
        #[arg(short, long)]
        profile: Option<String>,

        /// Print documents and statistics as JSON
        #[arg(long)]
        json: bool,

        /// Print the reduced source documents
        #[arg(long)]
        show_sources: bool,
    },

    /// Print the fingerprint of every document
    Fingerprint {
        /// JSON file with documents (reads stdin when absent or "-")
        input: Option<PathBuf>,

        /// Fingerprint algorithm
        #[arg(long, value_enum)]
        algorithm: Option<AlgorithmArg>,
    },

    /// Show the suffix/prefix overlap of two texts
    Overlap {
        /// Text whose tail is matched
        first: String,

        /// Text whose head is matched
        second: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmArg {
    Sha256,
    Blake3,
}

impl From<AlgorithmArg> for FingerprintAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Sha256 => FingerprintAlgorithm::Sha256,
            AlgorithmArg::Blake3 => FingerprintAlgorithm::Blake3,
        }
    }
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

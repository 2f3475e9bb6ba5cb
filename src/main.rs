use chunkfold::cli::{AlgorithmArg, Cli, Commands, ConfigAction};
use chunkfold::config::Config;
use chunkfold::error::{ChunkfoldError, Result};
use chunkfold::retrieval::{
    fingerprint, overlap, Document, MissingFieldPolicy, ReduceOptions, Reducer, ReductionStats,
    RetrievalResult,
};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ReduceOutput<'a> {
    documents: &'a [Document],
    stats: &'a ReductionStats,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Reduce {
            input,
            source_field,
            no_dedup,
            no_merge,
            algorithm,
            skip_invalid,
            profile,
            json,
            show_sources,
        } => {
            let config = load_config(cli.config, profile)?;
            let mut options = ReduceOptions::from(&config);
            if let Some(field) = source_field {
                options.source_field = field;
            }
            if let Some(algorithm) = algorithm {
                options.algorithm = algorithm.into();
            }
            if skip_invalid {
                options.on_missing_field = MissingFieldPolicy::Skip;
            }
            options.dedup_enabled &= !no_dedup;
            options.merge_enabled &= !no_merge;

            cmd_reduce(
                input.as_deref(),
                options,
                json,
                show_sources,
                config.output.preview_chars,
            )?;
        }
        Commands::Fingerprint { input, algorithm } => {
            cmd_fingerprint(cli.config, input.as_deref(), algorithm)?;
        }
        Commands::Overlap { first, second } => {
            println!("{}", overlap(&first, &second));
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "chunkfold=debug"
    } else {
        "chunkfold=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stdout carries the reduced documents
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_reduce(
    input: Option<&Path>,
    options: ReduceOptions,
    json: bool,
    show_sources: bool,
    preview_chars: usize,
) -> Result<()> {
    let docs = read_documents(input)?;
    let reducer = Reducer::new(options);
    let (reduced, stats) = reducer.reduce(docs)?;

    if json {
        let payload = ReduceOutput {
            documents: &reduced,
            stats: &stats,
        };
        let text = serde_json::to_string_pretty(&payload).map_err(|e| ChunkfoldError::Json {
            source: e,
            context: "Failed to serialize reduced documents".to_string(),
        })?;
        println!("{}", text);
        return Ok(());
    }

    print_summary(&stats);

    if show_sources {
        println!("\n--- sources ---");
        for (i, doc) in reduced.iter().enumerate() {
            print_source(i + 1, doc, preview_chars);
        }
    }

    Ok(())
}

fn print_summary(stats: &ReductionStats) {
    println!("✓ Reduced {} documents to {}", stats.input_documents, stats.output_documents);
    if stats.dedup_skipped {
        println!("  Duplicates: skipped (missing metadata)");
    } else {
        println!("  Duplicates removed: {}", stats.duplicates_removed);
    }
    println!("  Characters merged: {}", stats.merged_characters);
    println!("  Time: {} ms", stats.processing_time_ms);
}

fn print_source(position: usize, doc: &Document, preview_chars: usize) {
    let field = |key: &str| doc.metadata_str(key).unwrap_or_else(|| "-".to_string());
    let url = doc
        .metadata_str("url")
        .or_else(|| doc.metadata_str("document_url"))
        .unwrap_or_else(|| "-".to_string());
    let score = doc
        .score
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "-".to_string());

    println!(
        "[{}] title={} page={} url={} score={} chunks={}",
        position,
        field("title"),
        field("page_number"),
        url,
        score,
        doc.effective_chunk_count()
    );
    println!("    {}", doc.preview(preview_chars).replace('\n', " "));
}

fn cmd_fingerprint(
    config_path: Option<PathBuf>,
    input: Option<&Path>,
    algorithm: Option<AlgorithmArg>,
) -> Result<()> {
    let config = load_config(config_path, None)?;
    let algorithm = algorithm
        .map(Into::into)
        .unwrap_or(config.dedup.algorithm);

    let docs = read_documents(input)?;
    for (index, doc) in docs.iter().enumerate() {
        println!("{}\t{}", index, fingerprint(doc, index, algorithm)?);
    }

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path, None)?;
            let text = toml::to_string_pretty(&config)?;
            println!("{}", text);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ChunkfoldError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>, profile: Option<String>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if path.exists() {
        return match profile {
            Some(profile) => Config::load_with_profile(&path, &profile),
            None => Config::load(&path),
        };
    }

    tracing::warn!(
        "Config file not found, using defaults. Run 'chunkfold config init' to create one."
    );
    let mut config = Config::default();
    config.apply_env_overrides();
    if let Some(profile) = profile {
        config.apply_profile(&profile)?;
    }

    Ok(config)
}

fn read_documents(input: Option<&Path>) -> Result<Vec<Document>> {
    let (text, origin) = match input {
        Some(path) if path != Path::new("-") => {
            let text = std::fs::read_to_string(path).map_err(|e| ChunkfoldError::Io {
                source: e,
                context: format!("Failed to read documents: {}", path.display()),
            })?;
            (text, path.display().to_string())
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| ChunkfoldError::Io {
                    source: e,
                    context: "Failed to read documents from stdin".to_string(),
                })?;
            (text, "stdin".to_string())
        }
    };

    let result: RetrievalResult = serde_json::from_str(&text).map_err(|e| ChunkfoldError::Json {
        source: e,
        context: format!("Failed to parse documents from {}", origin),
    })?;

    let docs = result.into_documents();
    tracing::debug!("Read {} documents from {}", docs.len(), origin);
    Ok(docs)
}

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use search_core::compiler::DEFAULT_SEARCHABLE_TAG;
use search_core::decoder::decode;
use search_core::persist::{load_optional_stop_words, load_stop_words, read_artifact, write_artifact};
use search_core::source::{load_json_inputs, load_markdown_tree};
use search_core::{CompilerConfig, IndexCompiler, SourceDocument};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Compile posts and pages into the binary search index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the search artifact from a content tree and/or JSON exports
    Build {
        /// Content directory holding posts/*.md and pages/*.md
        #[arg(long, env = "SEARCH_CONTENT_DIR")]
        content: Option<PathBuf>,
        /// JSON/JSONL export file or directory (repeatable)
        #[arg(long)]
        input: Vec<PathBuf>,
        /// Stop-word list; `stop-words` in the working directory is used if present
        #[arg(long, env = "SEARCH_STOP_WORDS")]
        stop_words: Option<PathBuf>,
        /// Tag a page needs to be indexed
        #[arg(long, env = "SEARCH_SEARCHABLE_TAG", default_value = DEFAULT_SEARCHABLE_TAG)]
        searchable_tag: String,
        /// Output artifact path
        #[arg(long, env = "SEARCH_OUTPUT", default_value = "public/data/search.bin")]
        output: PathBuf,
    },
    /// Decode an artifact and print its statistics
    Inspect {
        #[arg(long, default_value = "public/data/search.bin")]
        artifact: PathBuf,
        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { content, input, stop_words, searchable_tag, output } => {
            build_index(content.as_deref(), &input, stop_words.as_deref(), searchable_tag, &output)
        }
        Commands::Inspect { artifact, json } => inspect(&artifact, json),
    }
}

fn build_index(
    content: Option<&Path>,
    inputs: &[PathBuf],
    stop_words: Option<&Path>,
    searchable_tag: String,
    output: &Path,
) -> Result<()> {
    if content.is_none() && inputs.is_empty() {
        bail!("nothing to index: pass --content and/or --input");
    }

    let stop_words = match stop_words {
        Some(path) => load_stop_words(path)?,
        None => load_optional_stop_words(Path::new("stop-words"))?,
    };

    // Everything is read before anything is written, so a read failure leaves no artifact.
    let mut documents: Vec<SourceDocument> = Vec::new();
    if let Some(content) = content {
        documents.extend(load_markdown_tree(content)?);
    }
    for input in inputs {
        documents.extend(load_json_inputs(input)?);
    }
    tracing::info!(documents = documents.len(), "loaded source documents");

    let config = CompilerConfig { searchable_tag, ..CompilerConfig::default() };
    let mut compiler = IndexCompiler::new(config, stop_words);
    compiler.add_documents(&documents)?;
    let compiled = compiler.compile()?;

    write_artifact(output, &compiled.bytes)?;
    tracing::info!(output = %output.display(), bytes = compiled.stats.bytes, "index build complete");
    Ok(())
}

#[derive(Serialize)]
struct InspectReport<'a> {
    artifact: &'a Path,
    bytes: usize,
    documents: usize,
    pages: usize,
    #[serde(flatten)]
    trie: search_core::decoder::TrieStats,
}

fn inspect(artifact: &Path, json: bool) -> Result<()> {
    let bytes = read_artifact(artifact)?;
    let index = decode(&bytes)?;
    let report = InspectReport {
        artifact,
        bytes: bytes.len(),
        documents: index.documents.len(),
        pages: index.documents.iter().filter(|d| d.is_page).count(),
        trie: index.stats,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let stats = &report.trie;
    println!("Artifact                  : {}", artifact.display());
    println!("Documents (pages)         : {} ({})", report.documents, report.pages);
    println!("Total terms               : {}", stats.terms);
    println!("Total occurrences         : {}", stats.occurrences);
    println!("Stored term trie nodes    : {}", stats.nodes);
    println!("Max trie depth            : {}", stats.max_depth);
    println!("Max pop distance          : {}", stats.max_pop_distance);
    if stats.pop_markers > 0 {
        println!("Mean pop distance         : {:.2}", stats.total_pop_distance as f64 / stats.pop_markers as f64);
    }
    println!("Total search database size: {:.2} Kb", report.bytes as f64 / 1024.0);
    Ok(())
}

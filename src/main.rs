//! CLI front-end for the indexing and retrieval core.
//!
//! Stands in for the external collaborators: it enumerates files from a
//! local directory (the upload side) and prints index results, ranked hits,
//! or the assembled prompt payload (the presentation side). No model call
//! happens here.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ignore::WalkBuilder;
use project_qa::config::Config;
use project_qa::service::QaService;
use project_qa::types::{Query, SourceFile};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Files above this size are skipped by the walker
const MAX_FILE_SIZE: u64 = 1_048_576;

#[derive(Parser)]
#[command(name = "project-qa", version, about = "Index a project and retrieve citable code context for questions")]
struct Cli {
    /// Path to a TOML config file (weights, budgets)
    #[arg(long, env = "PROJECT_QA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index a directory and print the result summary as JSON
    Index {
        /// Project root directory
        path: PathBuf,
    },
    /// Index a directory, then print ranked units for a question
    Search {
        path: PathBuf,
        question: String,
        /// Maximum number of results
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Index a directory, then print the prompt payload for a question
    Ask {
        path: PathBuf,
        question: String,
        /// Context budget in characters (overrides config)
        #[arg(long)]
        budget: Option<usize>,
        /// Emit citation headers without code bodies
        #[arg(long)]
        no_snippets: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::new()?,
    };

    match cli.command {
        Command::Index { path } => {
            let service = QaService::new(config);
            let result = index_directory(&service, &path)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Search { path, question, top } => {
            let service = QaService::new(config);
            let result = index_directory(&service, &path)?;
            let query = Query::new(result.project_id.clone(), question);
            let retrieval = service.search(&query, Some(top))?;
            for hit in retrieval.hits {
                println!(
                    "{:>6.2}  {}:{}-{}  {} {}",
                    hit.score,
                    hit.unit.file_path,
                    hit.unit.start_line,
                    hit.unit.end_line,
                    hit.unit.kind,
                    hit.unit.name
                );
            }
        }
        Command::Ask {
            path,
            question,
            budget,
            no_snippets,
        } => {
            if let Some(budget) = budget {
                config.context.char_budget = budget;
            }
            config.validate()?;
            let service = QaService::new(config);
            let result = index_directory(&service, &path)?;
            let mut query = Query::new(result.project_id.clone(), question);
            query.include_snippets = !no_snippets;
            let payload = service.prepare(&query, None)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}

/// Walk a directory, read its files, and build the project index
fn index_directory(service: &QaService, root: &Path) -> Result<project_qa::types::IndexResult> {
    let files = collect_files(root)?;
    let project_id = project_id_for(root)?;
    tracing::info!("indexing {} files from {}", files.len(), root.display());
    Ok(service.analyze(&project_id, &files)?)
}

/// Enumerate files under `root`, honoring gitignore rules, and read their
/// bytes. This is the upload collaborator's job done locally: the core only
/// ever sees relative paths and raw bytes.
fn collect_files(root: &Path) -> Result<Vec<SourceFile>> {
    anyhow::ensure!(root.is_dir(), "not a directory: {}", root.display());

    let walker = WalkBuilder::new(root)
        .standard_filters(true)
        .hidden(false)
        .require_git(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.context("failed to read directory entry")?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        if path.components().any(|c| c.as_os_str() == ".git") {
            continue;
        }
        if let Ok(metadata) = std::fs::metadata(path) {
            if metadata.len() > MAX_FILE_SIZE {
                tracing::debug!("skipping large file: {}", path.display());
                continue;
            }
        }

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        files.push(SourceFile::new(relative, bytes));
    }

    Ok(files)
}

/// Stable project id derived from the canonical path
fn project_id_for(root: &Path) -> Result<String> {
    let canonical = root
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", root.display()))?;
    let digest = Sha256::digest(canonical.to_string_lossy().as_bytes());
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    Ok(hex[..12].to_string())
}

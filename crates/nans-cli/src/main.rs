#![deny(unsafe_code)]

//! nans CLI: run the completion engine and inspect configuration without
//! opening the editor.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use nans_config::AppConfig;
use nans_core::{CompletionEngine, Document, ModuleIndex, ModuleRegistry, files};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// nans: terminal editor with Python-aware completion.
#[derive(Parser)]
#[command(name = "nans-cli", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "nans.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print completion candidates for a position in a file.
    Complete {
        /// File to complete in.
        file: PathBuf,

        #[command(flatten)]
        position: Position,

        /// Emit JSON instead of one label per line.
        #[arg(long)]
        json: bool,
    },

    /// List installed top-level modules.
    Modules {
        /// Only names starting with this prefix (case-insensitive).
        #[arg(long, default_value = "")]
        prefix: String,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },

    /// Print build information.
    Version,
}

/// Cursor position: a byte offset, or a 1-based line and column.
#[derive(Args)]
struct Position {
    /// Byte offset into the file.
    #[arg(long, conflicts_with_all = ["line", "column"])]
    offset: Option<usize>,

    /// 1-based line number.
    #[arg(long, requires = "column")]
    line: Option<usize>,

    /// 1-based column, in characters.
    #[arg(long, requires = "line")]
    column: Option<usize>,
}

impl Position {
    /// Resolve to a byte offset in `doc`; no position means end of file.
    fn to_offset(&self, doc: &Document) -> Result<usize> {
        match (self.offset, self.line, self.column) {
            (Some(offset), _, _) => Ok(offset),
            (None, Some(line), Some(column)) => {
                if line == 0 || column == 0 {
                    bail!("--line and --column are 1-based");
                }
                Ok(doc.offset_of(line - 1, column - 1))
            }
            _ => Ok(doc.text().len()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Complete {
            file,
            position,
            json,
        } => cmd_complete(&cli.config, &file, &position, json).await?,
        Commands::Modules { prefix } => cmd_modules(&cli.config, &prefix).await?,
        Commands::Config { show } => cmd_config(&cli.config, show).await?,
        Commands::Version => println!("{}", nans_core::build_info::long_version()),
    }

    Ok(())
}

async fn cmd_complete(config_path: &Path, file: &Path, position: &Position, json: bool) -> Result<()> {
    let config = AppConfig::load_or_default(config_path).await?;
    let (registry, modules) = completion_sources(&config).await;
    let engine = CompletionEngine::new(Arc::new(registry), Arc::new(modules));

    let document = files::load_document(file).await?;
    let offset = position.to_offset(&document)?;
    info!(file = %file.display(), offset, "Completing");

    let completions = engine.completions(document.text(), offset);
    let context = completions.context().clone();
    let candidates: Vec<_> = completions.collect();

    if json {
        let items: Vec<_> = candidates
            .iter()
            .map(|c| {
                json!({
                    "insert_text": c.insert_text,
                    "display_label": c.display_label,
                    "replace_from": c.replace_from,
                    "kind": format!("{:?}", c.kind).to_lowercase(),
                })
            })
            .collect();
        let out = json!({
            "context": context.kind(),
            "prefix": context.prefix(),
            "candidates": items,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for candidate in &candidates {
            println!("{}", candidate.display_label);
        }
    }
    Ok(())
}

async fn cmd_modules(config_path: &Path, prefix: &str) -> Result<()> {
    let config = AppConfig::load_or_default(config_path).await?;
    let (_, modules) = completion_sources(&config).await;
    for name in modules.matching(prefix) {
        println!("{name}");
    }
    Ok(())
}

async fn cmd_config(config_path: &Path, show: bool) -> Result<()> {
    let config = AppConfig::load_or_default(config_path).await?;
    if show {
        let toml_str = toml::to_string_pretty(&config)?;
        println!("{toml_str}");
    } else {
        println!("Configuration at '{}' is valid.", config_path.display());
    }
    Ok(())
}

/// Registry and module index as the editor builds them at startup.
async fn completion_sources(config: &AppConfig) -> (ModuleRegistry, ModuleIndex) {
    let registry = ModuleRegistry::load_layered(&config.completion.registry_files).await;
    let modules = ModuleIndex::discover(&config.completion.search_paths(), &registry);
    (registry, modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nans_test_utils::TestWorkspace;
    use pretty_assertions::assert_eq;

    fn position(args: &[&str]) -> Position {
        let mut argv = vec!["nans-cli", "complete", "f.py"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Complete { position, .. } => position,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_offset_position() {
        let doc = Document::from_text("import os\nos.");
        assert_eq!(position(&["--offset", "4"]).to_offset(&doc).unwrap(), 4);
    }

    #[test]
    fn test_line_column_position() {
        let doc = Document::from_text("import os\nos.");
        let pos = position(&["--line", "2", "--column", "4"]);
        assert_eq!(pos.to_offset(&doc).unwrap(), 13);
    }

    #[test]
    fn test_default_position_is_end() {
        let doc = Document::from_text("abc");
        assert_eq!(position(&[]).to_offset(&doc).unwrap(), 3);
    }

    #[test]
    fn test_zero_line_rejected() {
        let doc = Document::from_text("abc");
        let pos = position(&["--line", "0", "--column", "1"]);
        assert!(pos.to_offset(&doc).is_err());
    }

    #[test]
    fn test_line_requires_column() {
        let argv = ["nans-cli", "complete", "f.py", "--line", "2"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_offset_conflicts_with_line() {
        let argv = [
            "nans-cli", "complete", "f.py", "--offset", "1", "--line", "1", "--column", "1",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[tokio::test]
    async fn test_completion_sources_from_workspace() {
        let ws = TestWorkspace::new();
        ws.add_module("num2words").add_package("numpy");
        ws.write_config(&[]);
        let config = ws.load_config().await;

        let (registry, modules) = completion_sources(&config).await;
        assert!(registry.contains("os"));
        assert_eq!(modules.matching("num"), vec!["num2words", "numpy"]);
    }
}

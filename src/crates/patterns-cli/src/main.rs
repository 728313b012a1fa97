//! # patterns
//!
//! Lists, shows, classifies and validates patterns in the filesystem store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llm::VendorsManager;
use patterns::{
    FsPatternStore, PatternHandler, PatternRegistry, PatternStore, StandardPatternHandler,
    StoreConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use utils::{load_config_file, FromEnv};

/// Prefix of the store's environment variables.
const STORE_ENV_PREFIX: &str = "PATTERNS_";

#[derive(Parser)]
#[command(name = "patterns")]
#[command(about = "Inspect and validate prompt patterns", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML or JSON store configuration file, used instead of the environment
    #[arg(long, global = true, env = "PATTERNS_CONFIG")]
    config: Option<PathBuf>,

    /// Primary patterns directory
    #[arg(long, global = true, env = "PATTERNS_DIR")]
    patterns_dir: Option<PathBuf>,

    /// Custom patterns directory, searched before the primary one
    #[arg(long, global = true, env = "PATTERNS_CUSTOM_DIR")]
    custom_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available patterns
    List,

    /// Print a pattern's content
    Show {
        /// Pattern name or path
        name: String,
    },

    /// Detect a pattern's type and the handler it routes to
    Detect {
        /// Pattern name or path
        name: String,
    },

    /// Validate a pattern with the standard handler
    Validate {
        /// Pattern name or path
        name: String,
    },
}

fn main() -> Result<ExitCode> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(rust_log)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = Arc::new(FsPatternStore::new(store_config(&cli)?));
    tracing::debug!("Using pattern store {:?}", store.config());

    match cli.command {
        Commands::List => {
            for name in store.names().context("failed to list patterns")? {
                println!("{}", name);
            }
        }
        Commands::Show { name } => {
            let pattern = store
                .get_by_name(&name)
                .with_context(|| format!("failed to load pattern '{}'", name))?;
            println!("{}", pattern.content);
        }
        Commands::Detect { name } => {
            let pattern = store
                .get_by_name(&name)
                .with_context(|| format!("failed to load pattern '{}'", name))?;
            let registry = build_registry(store)?;

            let pattern_type = registry.detect_pattern_type(&pattern)?;
            let handler = registry.select_for_pattern(&pattern)?;

            println!("type: {}", pattern_type);
            match handler {
                Some(handler) => println!("handler: {}", handler.name()),
                None => println!("handler: none"),
            }
        }
        Commands::Validate { name } => {
            let pattern = store
                .get_by_name(&name)
                .with_context(|| format!("failed to load pattern '{}'", name))?;
            let handler = standard_handler(store)?;

            if let Err(finding) = handler.validate_pattern(Some(&pattern)) {
                println!("{}: {}", finding.severity, finding);
                return Ok(ExitCode::FAILURE);
            }
            println!("ok: pattern '{}' is valid", pattern.name);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Config file or environment, overridden by command-line flags.
fn store_config(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_file::<StoreConfig>(path)
            .with_context(|| format!("failed to load store config {}", path.display()))?,
        None => StoreConfig::from_env(STORE_ENV_PREFIX)
            .context("invalid pattern store environment")?,
    };

    if let Some(dir) = &cli.patterns_dir {
        config.patterns_dir = dir.clone();
    }
    if let Some(dir) = &cli.custom_dir {
        config.custom_patterns_dir = Some(dir.clone());
    }

    Ok(config)
}

/// The CLI never executes patterns, so the handler gets no vendors.
fn standard_handler(store: Arc<FsPatternStore>) -> Result<StandardPatternHandler> {
    StandardPatternHandler::from_env(Arc::new(VendorsManager::new()), store)
        .context("invalid handler environment")
}

fn build_registry(store: Arc<FsPatternStore>) -> Result<PatternRegistry> {
    let handler: Arc<dyn PatternHandler> = Arc::new(standard_handler(store)?);

    let registry = PatternRegistry::new();
    registry.register(handler.name(), handler.clone())?;
    registry.set_default_handler(handler)?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use patterns::PatternRecord;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "patterns",
            "validate",
            "summarize",
            "--patterns-dir",
            "/tmp/p",
            "--custom-dir",
            "/tmp/c",
        ])
        .unwrap();

        assert_eq!(cli.patterns_dir, Some(PathBuf::from("/tmp/p")));
        assert_eq!(cli.custom_dir, Some(PathBuf::from("/tmp/c")));
        assert!(matches!(cli.command, Commands::Validate { ref name } if name == "summarize"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("store.yaml");
        fs::write(&file, "patterns_dir: /srv/patterns\nsystem_file: prompt.md\n").unwrap();

        let cli = Cli::try_parse_from([
            "patterns",
            "--config",
            file.to_str().unwrap(),
            "--custom-dir",
            "/srv/custom",
            "list",
        ])
        .unwrap();
        let config = store_config(&cli).unwrap();

        assert_eq!(config.patterns_dir, PathBuf::from("/srv/patterns"));
        assert_eq!(config.custom_patterns_dir, Some(PathBuf::from("/srv/custom")));
        assert_eq!(config.system_file, "prompt.md");
    }

    #[test]
    fn test_registry_routes_plain_pattern_to_standard_handler() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("summarize")).unwrap();
        fs::write(dir.path().join("summarize/system.md"), "Summarize the input.").unwrap();

        let store = Arc::new(FsPatternStore::new(StoreConfig::new(dir.path())));
        let registry = build_registry(store).unwrap();

        let pattern = PatternRecord::new("summarize", "Summarize the input.");
        let handler = registry.select_for_pattern(&pattern).unwrap().unwrap();
        assert_eq!(handler.name(), patterns::STANDARD_HANDLER_NAME);
    }
}

//! mapsuggest - Attribute mapping suggestions
//!
//! CLI entry point for suggestion runs and dataset sampling.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mapsuggest::cli::{Cli, Command};
use mapsuggest::config::Config;
use mapsuggest::domain::{AttributeMatch, OwnedRecordRef};
use mapsuggest::pairs::sample_owned_refs;
use mapsuggest::progress::{FileProgress, MemoryProgress, ProgressSink};
use mapsuggest::quality::SampleQualityAssessor;
use mapsuggest::service::create_client;
use mapsuggest::store::{MemoryStore, RecordStore};
use mapsuggest::suggest::{MAPPINGS_SUGGESTION_ACTIVITY, Suggester, SuggestionContext, cancel_pair};

fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mapsuggest")
        .join("logs")
        .join("mapsuggest.log")
}

fn setup_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).context(format!("Invalid log level: {}", level))?;
    let path = log_path();

    let log_file = path
        .parent()
        .map(fs::create_dir_all)
        .transpose()
        .and_then(|_| fs::File::create(&path));

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_writer(file)
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
            info!(path = %path.display(), %level, "Logging initialized");
        }
        Err(e) => {
            // Log directory not writable; stderr keeps stdout clean for output
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
            warn!(error = %e, path = %path.display(), "Couldn't open log file, logging to stderr");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI flag wins over config file, INFO otherwise
    let level = cli
        .log_level
        .clone()
        .or_else(|| Config::load_log_level(cli.config.as_ref()))
        .unwrap_or_else(|| "info".to_string());
    setup_logging(&level).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(base_url = %config.service.base_url, "mapsuggest loaded config");

    match cli.command {
        Command::Suggest {
            dataset,
            matches,
            refs,
            output,
            progress_file,
        } => {
            cmd_suggest(
                &config,
                &dataset,
                &matches,
                refs.as_deref(),
                output.as_deref(),
                progress_file.as_deref(),
            )
            .await
        }
        Command::Sample { dataset, limit } => cmd_sample(&config, &dataset, limit).await,
        Command::ShowConfig => cmd_show_config(&config),
    }
}

/// Run a suggestion over all candidate matches
async fn cmd_suggest(
    config: &Config,
    dataset: &Path,
    matches_path: &Path,
    refs_path: Option<&Path>,
    output: Option<&Path>,
    progress_file: Option<&Path>,
) -> Result<()> {
    let store = Arc::new(MemoryStore::load(dataset).await.context("Failed to load dataset")?);
    let matches: Vec<AttributeMatch> = read_json(matches_path).context("Failed to read attribute matches")?;

    let owned_refs = match refs_path {
        Some(path) => Some(read_json::<Vec<OwnedRecordRef>>(path).context("Failed to read owned record references")?),
        None => sample_owned_refs(store.as_ref(), config.sampling.max_examples).await,
    };

    let service = create_client(&config.service).context("Failed to create suggestion service client")?;

    let (cancel, signal) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling after the current candidate");
            cancel.cancel();
        }
    });

    let suggester = Suggester::new(SuggestionContext {
        service,
        assessor: Arc::new(SampleQualityAssessor),
        store,
        cancel: signal,
    });

    let progress_path = progress_file.map(Path::to_path_buf).or_else(|| config.progress.file.clone());
    let mut progress: Box<dyn ProgressSink> = match progress_path {
        Some(path) => Box::new(FileProgress::new(MAPPINGS_SUGGESTION_ACTIVITY, path)),
        None => Box::new(MemoryProgress::new(MAPPINGS_SUGGESTION_ACTIVITY)),
    };

    let suggestion = suggester
        .suggest_mappings(&matches, owned_refs.as_deref(), progress.as_mut())
        .await
        .context("Mappings suggestion failed")?;

    let json = serde_json::to_string_pretty(&suggestion)?;
    match output {
        Some(path) => {
            fs::write(path, json).context(format!("Failed to write {}", path.display()))?;
            println!(
                "Wrote {} suggestion(s) for {} candidate(s) to {}",
                suggestion.len(),
                matches.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Print sampled owned record references
async fn cmd_sample(config: &Config, dataset: &Path, limit: Option<usize>) -> Result<()> {
    let store = MemoryStore::load(dataset).await.context("Failed to load dataset")?;
    let limit = limit.unwrap_or(config.sampling.max_examples);
    let refs = store.sample_owned(limit).await.context("Failed to sample owned records")?;
    println!("{}", serde_json::to_string_pretty(&refs)?);
    Ok(())
}

/// Print the effective configuration as YAML
fn cmd_show_config(config: &Config) -> Result<()> {
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).context(format!("Failed to parse {}", path.display()))
}

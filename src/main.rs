use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use book_api_suite::run_metadata::{self, RunMetadata};
use book_api_suite::{ConfigStore, EnvOverrides, SuiteSettings};

#[derive(Parser, Debug)]
#[clap(about = "Run-level setup and teardown for the book API suite")]
struct CliArgs {
    /// Directory holding the per-environment JSON config files.
    /// Defaults to the files shipped with the crate.
    #[clap(long)]
    pub config_dir: Option<PathBuf>,

    /// Directory receiving run outputs.
    #[clap(long, default_value = run_metadata::OUTPUT_DIR)]
    pub output_dir: PathBuf,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write environment metadata for the upcoming run.
    Setup,

    /// Remove artifacts older than the given number of days.
    Teardown {
        #[clap(long, default_value_t = 7)]
        max_age_days: u64,
    },

    /// Print the settings tests would resolve.
    ShowConfig,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let overrides = EnvOverrides::from_env();

    match cli_args.command {
        Command::Setup => {
            let metadata = RunMetadata::capture(&overrides);
            let path = metadata
                .write_to(&cli_args.output_dir)
                .context("Failed to write environment metadata")?;
            info!("Global setup done, metadata at {:?}", path);
        }
        Command::Teardown { max_age_days } => {
            info!("Global teardown started");
            let artifacts_dir = cli_args.output_dir.join("artifacts");
            let max_age = Duration::from_secs(max_age_days * 24 * 60 * 60);
            let removed = run_metadata::prune_artifacts(&artifacts_dir, max_age)
                .with_context(|| format!("Failed to prune {:?}", artifacts_dir))?;
            info!("Global teardown finished, {} artifacts removed", removed.len());
        }
        Command::ShowConfig => {
            let custom_store;
            let store = match &cli_args.config_dir {
                Some(dir) => {
                    custom_store = ConfigStore::new(dir);
                    &custom_store
                }
                None => ConfigStore::shared(),
            };
            info!("Reading config from {:?}", store.config_dir());
            let settings = SuiteSettings::resolve(store, &overrides).with_context(|| {
                format!(
                    "Failed to resolve settings for environment {}",
                    overrides.environment_name()
                )
            })?;
            println!("environment: {}", settings.environment);
            println!("base_url:    {}", settings.base_url);
            println!("timeout:     {:?}", settings.timeout);
            println!(
                "api_key:     {}",
                if settings.api_key.is_some() { "set" } else { "unset" }
            );
            println!("tester:      {}", settings.tester);
            println!("retries:     {}", settings.retries());
            match settings.workers() {
                Some(workers) => println!("workers:     {}", workers),
                None => println!("workers:     runner default"),
            }
        }
    }

    Ok(())
}

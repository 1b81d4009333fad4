//! shipyard CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shipyard::{
    error::Result,
    models::Config,
    pipeline::{self, PipelineOptions},
    services::{AssetMirror, CatalogClient},
    storage::{CacheState, CatalogCache, LocalStorage},
    utils::http,
};

/// shipyard - World of Warships ship catalog mirror
#[derive(Parser, Debug)]
#[command(
    name = "shipyard",
    version,
    about = "Mirror the ship encyclopedia into per-tier files and local images"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "shipyard.toml")]
    config: PathBuf,

    /// Application id, overrides the config file
    #[arg(long, global = true)]
    application_id: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the catalog cache, fetching it when missing or malformed
    Cache {
        /// Re-fetch even if the cache is valid
        #[arg(long)]
        force: bool,
    },

    /// Write tier files from the cache and mirror ship images
    Partition {
        /// Name images in tier files without downloading them
        #[arg(long)]
        no_images: bool,
    },

    /// Fetch detail records for every ship in the tier files
    Details,

    /// Run full pipeline: Cache → Partition (→ Details)
    Pipeline {
        /// Re-fetch the catalog even if the cache is valid
        #[arg(long)]
        force_refresh: bool,

        /// Name images in tier files without downloading them
        #[arg(long)]
        no_images: bool,

        /// Also archive per-ship details
        #[arg(long)]
        with_details: bool,
    },

    /// Validate configuration and cache
    Validate,

    /// Show output locations and cache status
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn ensure_dirs(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.paths.images_dir)?;
    std::fs::create_dir_all(&config.paths.tiers_dir)?;
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_or_default(&cli.config);
    if let Some(app_id) = cli.application_id {
        config.api.application_id = app_id;
    }
    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Cache { force } => {
            config.validate()?;
            let api = CatalogClient::new(&config.api)?;
            let catalog = pipeline::run_cache(&config, &api, force).await?;
            log::info!("Catalog holds {} ships", catalog.len());
        }

        Command::Partition { no_images } => {
            config.validate()?;
            ensure_dirs(&config)?;

            let client = http::create_client(&config.api)?;
            let api = CatalogClient::with_client(client.clone(), &config.api)?;
            let catalog = pipeline::run_cache(&config, &api, false).await?;

            let mirror = AssetMirror::http(client, &config.paths.images_dir);
            let mirror = (!no_images).then_some(&mirror);
            pipeline::run_partition(&config, &catalog, mirror).await?;
        }

        Command::Details => {
            config.validate()?;
            let api = CatalogClient::new(&config.api)?;
            let storage = LocalStorage::new(&config.paths.tiers_dir);
            pipeline::run_details(
                &api,
                &storage,
                &config.paths.details_dir,
                config.api.detail_delay(),
            )
            .await?;
        }

        Command::Pipeline {
            force_refresh,
            no_images,
            with_details,
        } => {
            config.validate()?;
            ensure_dirs(&config)?;

            let client = http::create_client(&config.api)?;
            let api = CatalogClient::with_client(client.clone(), &config.api)?;
            let mirror = AssetMirror::http(client, &config.paths.images_dir);
            let options = PipelineOptions {
                force_refresh,
                with_details,
            };

            let report =
                pipeline::run_pipeline(&config, &api, (!no_images).then_some(&mirror), options)
                    .await?;
            log::info!(
                "{} of {} ships written to {}",
                report.partition.buckets.total(),
                report.catalog_size,
                config.paths.tiers_dir.display()
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let cache = CatalogCache::new(&config.paths.cache_file);
            match cache.load().await? {
                CacheState::Missing => log::warn!(
                    "No cache at {}; it will be fetched on the next run",
                    cache.path().display()
                ),
                state => {
                    let catalog = state.into_catalog()?;
                    log::info!("✓ Cache OK ({} ships)", catalog.len());
                }
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            let cache = CatalogCache::new(&config.paths.cache_file);
            log::info!("Endpoint: {} ({})", config.api.base_url, config.api.language);
            let status = match cache.load().await? {
                CacheState::Missing => "not found".to_string(),
                CacheState::Valid(catalog) => format!("{} ships", catalog.len()),
                CacheState::Invalid(reason) => format!("malformed: {reason}"),
            };
            log::info!("Cache: {} ({})", cache.path().display(), status);
            log::info!("Tiers: {}", config.paths.tiers_dir.display());
            log::info!("Images: {}", config.paths.images_dir.display());
            log::info!("Details: {}", config.paths.details_dir.display());

            if let Ok(content) = std::fs::read_to_string(&config.paths.stats_file) {
                if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                    if let Some(finished) = stats.get("finished_at") {
                        log::info!("Last partition run: {}", finished);
                    }
                    if let Some(included) = stats.get("included") {
                        log::info!("Ships in tier files: {}", included);
                    }
                }
            } else {
                log::info!("No partition run recorded yet.");
            }
        }
    }

    log::info!("Done!");

    Ok(())
}

//! AccountFlow main entry point

use accountflow_api::start_server;
use accountflow_config::{Config, ConfigError};
use accountflow_core::AccountFlow;
use accountflow_store::{seed, MemoryStore};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "accountflow")]
#[command(author = "AccountFlow Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Chart-of-accounts, titles and DRE web interface", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Load the demo data set when the store is empty
    #[arg(long)]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, missing) = match Config::load_async(&args.config).await {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => {
            return Err(anyhow::anyhow!(
                "Failed to load {}\n{}",
                args.config.display(),
                e.to_details()
            ))
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str())).init();

    if missing {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    } else {
        log::info!("Config loaded from {}", args.config.display());
    }

    let store_path = config.store_path();
    log::info!("Opening store: {}", store_path.display());
    let store = MemoryStore::open(store_path, config.data.autosave).await?;

    if (config.data.seed_demo || args.seed_demo) && store.is_empty()? {
        log::info!("Store is empty, loading demo data");
        store.replace_all(seed::demo_data()).await?;
    }

    let flow = AccountFlow::new(Arc::new(store), config.clone());
    start_server(config, flow).await
}

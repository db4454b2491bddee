//! Spendscope main entry point

use anyhow::Context;
use clap::Parser;
use spendscope_api::{start_server, AppState};
use spendscope_config::{Config, ConfigError};
use spendscope_core::{CategoryCatalog, DemoTransactionSource, LocalTransactionSource};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "spendscope")]
#[command(author = "Spendscope Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Spending analysis dashboard with category drill-down", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Start every session in demo mode
    #[arg(long)]
    demo: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (mut config, defaults_used) = match Config::load(&args.config) {
        Ok(config) => (config, false),
        Err(ConfigError::FileNotFound { .. }) => (Config::default(), true),
        Err(e) => {
            let hint = e.hint();
            return Err(e).with_context(|| {
                format!("Failed to load configuration from {} ({})", args.config.display(), hint)
            });
        }
    };
    if args.demo {
        config.session.demo_mode = true;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();

    if defaults_used {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    log::info!(
        "Config loaded: transactions={}, demo_mode={}",
        config.transactions_path().display(),
        config.session.demo_mode
    );

    let catalog = CategoryCatalog::load(&config.catalog).context("Failed to load category catalog")?;

    let rt = Runtime::new()?;
    rt.block_on(async {
        let source = LocalTransactionSource::open(config.transactions_path())
            .await
            .context("Failed to open transactions file")?;

        let state = AppState::new(
            config,
            Arc::new(catalog),
            Arc::new(source),
            Arc::new(DemoTransactionSource::default()),
        );

        start_server(state).await.context("Server error")
    })
}

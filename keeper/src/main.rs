//! keeper: ant-keeping records, calculators, and advice from the command line

use advisor::AdvisoryClient;
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use keeper::{execute, Cli, KeeperConfig, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = KeeperConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // Initialize tracing; RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }
    info!(data_dir = %config.storage.data_dir.display(), "Starting keeper");

    let mut session = Session::open_dir(&config.storage.data_dir)
        .with_context(|| format!("opening {}", config.storage.data_dir.display()))?;
    let advisor = AdvisoryClient::from_config(&config.advisor).context("building advisor client")?;

    let output = execute(&mut session, &advisor, cli.command).await?;
    println!("{output}");
    Ok(())
}

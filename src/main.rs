use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use poolscope::application::{Cli, CommandExecutor};
use poolscope::{Config, PoolQueryService};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    // Priority: env > config file > defaults
    let cfg = Config::load(cli.config.as_deref())?;
    tracing::info!("Chains: {}", cfg.chains.join(", "));

    let service = PoolQueryService::from_config(&cfg)?;
    let executor = CommandExecutor::new(service, cli.json);

    let output = executor.execute(&cli.command).await?;
    println!("{}", output);
    Ok(())
}

//! CLI commands and handlers
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::application::query::{PoolQueryService, QueryTarget};
use crate::report::PoolReport;
use crate::shared::types::SortMetric;

#[derive(Parser, Debug)]
#[command(name = "poolscope")]
#[command(version, about = "Liquidity pool metrics across chains: TVL, volume, yields")]
pub struct Cli {
    /// Path to config file (optional)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// List configured chains
    Chains,

    /// Top pools of one chain
    Chain {
        /// Chain identifier, e.g. ethereum
        name: String,

        /// Number of pools to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Sort key: volume | tvl | apy | rewards | combined
        #[arg(short, long, default_value = "volume")]
        sort: SortMetric,
    },

    /// Cross-chain top over every configured chain
    Top {
        /// Sort key: volume | tvl | apy | rewards | combined
        #[arg(default_value = "volume")]
        metric: SortMetric,

        /// Number of pools to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

/// Runs one command against the query service and renders the output
pub struct CommandExecutor {
    service: PoolQueryService,
    json: bool,
}

impl CommandExecutor {
    pub fn new(service: PoolQueryService, json: bool) -> Self {
        Self { service, json }
    }

    pub async fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Chains => self.list_chains(),
            Commands::Chain { name, limit, sort } => {
                let target: QueryTarget = name.parse()?;
                self.run_query(&target, *sort, *limit).await
            }
            Commands::Top { metric, limit } => self.run_query(&QueryTarget::All, *metric, *limit).await,
        }
    }

    fn list_chains(&self) -> Result<String> {
        let chains = self.service.chains();
        if self.json {
            Ok(serde_json::to_string_pretty(chains)?)
        } else {
            Ok(chains.join(", "))
        }
    }

    async fn run_query(&self, target: &QueryTarget, metric: SortMetric, limit: Option<usize>) -> Result<String> {
        let limit = limit.unwrap_or(self.service.default_limit()).clamp(1, self.service.max_limit());
        info!("🔍 Querying {} · top {} by {}", target, limit, metric);

        let filters = self.service.default_filters();
        let result = self.service.query(target, metric, limit, &filters).await;
        let report = PoolReport::new(target, metric, limit, &result);

        if self.json {
            Ok(report.to_json()?)
        } else {
            Ok(report.to_text())
        }
    }
}

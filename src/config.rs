use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path, time::Duration};
use tracing::warn;

use crate::domain::endpoint::EndpointCandidate;
use crate::domain::pool::{SelectFilters, MAX_LIMIT};
use crate::shared::errors::AppError;

pub const DEFAULT_CHAINS: [&str; 3] = ["ethereum", "arbitrum", "polygon"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryCfg {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for QueryCfg {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: MAX_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FiltersCfg {
    /// 0 disables the floor
    pub min_tvl_usd: f64,
    pub suppress_inactive: bool,
}

impl Default for FiltersCfg {
    fn default() -> Self {
        Self {
            min_tvl_usd: 0.0,
            suppress_inactive: true,
        }
    }
}

impl FiltersCfg {
    pub fn to_filters(&self) -> SelectFilters {
        SelectFilters {
            min_tvl: (self.min_tvl_usd > 0.0).then_some(self.min_tvl_usd),
            suppress_inactive: self.suppress_inactive,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub request_timeout_secs: u64,
    /// Disable certificate verification for every request
    pub insecure_tls: bool,
    /// Chain allow-list
    pub chains: Vec<String>,
    pub query: QueryCfg,
    pub filters: FiltersCfg,
    /// Extra candidates appended to the built-in table
    pub endpoints: Vec<EndpointCandidate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: 25,
            insecure_tls: false,
            chains: DEFAULT_CHAINS.iter().map(|c| c.to_string()).collect(),
            query: QueryCfg::default(),
            filters: FiltersCfg::default(),
            endpoints: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        let cfg: Self = toml::from_str(&s).context("parse config TOML")?;
        Ok(cfg)
    }

    /// File (or defaults) -> environment overrides -> validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// REQUEST_TIMEOUT, CHAINS, INSECURE_SSL. Unparseable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("REQUEST_TIMEOUT") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(_) => warn!("⚠️ Ignoring invalid REQUEST_TIMEOUT: {:?}", raw),
            }
        }

        if let Some(raw) = lookup("CHAINS") {
            let chains: Vec<String> = raw
                .split(',')
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect();
            if chains.is_empty() {
                warn!("⚠️ Ignoring empty CHAINS override");
            } else {
                self.chains = chains;
            }
        }

        if let Some(raw) = lookup("INSECURE_SSL") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.insecure_tls = true,
                "0" | "false" | "no" | "off" => self.insecure_tls = false,
                _ => warn!("⚠️ Ignoring invalid INSECURE_SSL: {:?}", raw),
            }
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.request_timeout_secs == 0 {
            return Err(AppError::ConfigError("request_timeout_secs must be positive".to_string()));
        }
        if self.chains.is_empty() {
            return Err(AppError::ConfigError("at least one chain must be configured".to_string()));
        }
        if self.query.max_limit == 0 {
            return Err(AppError::ConfigError("query.max_limit must be positive".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

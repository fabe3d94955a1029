use anyhow::{Context, Result};
use briefing::{BriefingConfig, SecretString};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,

    pub openai_api_key: SecretString,
    pub openai_model: String,
    pub openai_base_url: Option<String>,

    pub tavily_api_key: Option<SecretString>,
    pub google_search_api_key: Option<SecretString>,
    pub google_search_engine_id: Option<String>,
    pub enable_duckduckgo: bool,

    /// JSON seed files for the in-memory stores
    pub articles_path: Option<PathBuf>,
    pub organizations_path: Option<PathBuf>,

    pub external_timeout: Duration,
    pub summary_ttl: Duration,
    pub cache_sweep_interval: Duration,

    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let openai_api_key = var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;

        let google_search_api_key = var("GOOGLE_SEARCH_API_KEY");
        let google_search_engine_id = var("GOOGLE_SEARCH_ENGINE_ID");
        if google_search_api_key.is_some() != google_search_engine_id.is_some() {
            anyhow::bail!("GOOGLE_SEARCH_API_KEY and GOOGLE_SEARCH_ENGINE_ID must be set together");
        }

        let config = Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&var, "PORT", 8080)?,
            openai_api_key: SecretString::new(openai_api_key),
            openai_model: var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            openai_base_url: var("OPENAI_BASE_URL"),
            tavily_api_key: var("TAVILY_API_KEY").map(SecretString::new),
            google_search_api_key: google_search_api_key.map(SecretString::new),
            google_search_engine_id,
            enable_duckduckgo: parse_or(&var, "ENABLE_DUCKDUCKGO", true)?,
            articles_path: var("ARTICLES_PATH").map(PathBuf::from),
            organizations_path: var("ORGANIZATIONS_PATH").map(PathBuf::from),
            external_timeout: Duration::from_secs(parse_or(&var, "EXTERNAL_TIMEOUT_SECS", 10)?),
            summary_ttl: Duration::from_secs(parse_or(&var, "SUMMARY_TTL_SECS", 86_400)?),
            cache_sweep_interval: Duration::from_secs(parse_or(&var, "CACHE_SWEEP_SECS", 300)?),
            rate_limit_per_second: parse_or(&var, "RATE_LIMIT_PER_SECOND", 2)?,
            rate_limit_burst: parse_or(&var, "RATE_LIMIT_BURST", 10)?,
        };

        if config.external_timeout.is_zero() {
            anyhow::bail!("EXTERNAL_TIMEOUT_SECS must be greater than zero");
        }
        if config.cache_sweep_interval.is_zero() {
            anyhow::bail!("CACHE_SWEEP_SECS must be greater than zero");
        }
        if config.rate_limit_per_second == 0 || config.rate_limit_burst == 0 {
            anyhow::bail!("RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be greater than zero");
        }

        Ok(config)
    }

    /// Address to bind the listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pipeline tunables derived from this configuration
    pub fn briefing_config(&self) -> BriefingConfig {
        BriefingConfig::new()
            .with_external_timeout(self.external_timeout)
            .with_summary_ttl(self.summary_ttl)
            .with_cache_sweep_interval(self.cache_sweep_interval)
    }
}

fn parse_or<T, F>(var: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid value (got {:?})", name, raw)),
        None => Ok(default),
    }
}

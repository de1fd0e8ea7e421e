use std::env;
use std::num::NonZeroUsize;
use std::time::Duration;

use crate::error::DashboardError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Data source
    pub database_url: String,
    pub database_max_connections: u32,

    // Table cache
    pub table_cache_ttl: Duration,

    // Histogram
    pub cost_bucket_count: NonZeroUsize,

    // CORS
    pub cors_allow_origins: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, DashboardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let env = Environment::from_str(&non_blank("ENV").unwrap_or_else(|| "dev".to_string()));
        let server_addr = non_blank("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        // Data source
        let database_url = non_blank("DB_URL")
            .or_else(|| non_blank("DATABASE_URL"))
            .ok_or_else(|| {
                DashboardError::Configuration(
                    "DB_URL environment variable not found. Please set it in your environment or .env file."
                        .to_string(),
                )
            })?;
        let database_max_connections = parse_or(&non_blank, "DATABASE_MAX_CONNECTIONS", 5)?;

        // Table cache
        let table_cache_ttl = Duration::from_secs(parse_or(
            &non_blank,
            "TABLE_CACHE_TTL_SECONDS",
            600, // 10 minutes default
        )?);

        // Histogram
        let cost_bucket_count = parse_or(&non_blank, "COST_BUCKET_COUNT", 50usize)?;
        let cost_bucket_count = NonZeroUsize::new(cost_bucket_count).ok_or_else(|| {
            DashboardError::Configuration("COST_BUCKET_COUNT must be greater than zero".to_string())
        })?;

        // CORS
        let cors_allow_origins = non_blank("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "http://localhost:8501".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            table_cache_ttl,
            cost_bucket_count,
            cors_allow_origins,
        })
    }
}

fn parse_or<T, L>(lookup: &L, key: &str, default: T) -> Result<T, DashboardError>
where
    T: std::str::FromStr,
    L: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| DashboardError::Configuration(format!("{key} has an invalid value: {value}"))),
    }
}

use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// RetentionPolicy
// ---------------------------------------------------------------------------

/// How long stored readings are kept.
///
/// Only `Unbounded` exists today: the table grows forever. New policies are
/// added here and honoured by the store adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    #[default]
    Unbounded,
}

impl FromStr for RetentionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unbounded" => Ok(Self::Unbounded),
            other => Err(anyhow::anyhow!("unknown retention policy: {other:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Settings handed to the store adapter at construction.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Upper bound for a single insert or range query, including the wait
    /// for a pooled connection.
    pub timeout: Duration,
    pub retention: RetentionPolicy,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key).with_context(|| format!("missing required env var: {key}"))
        };
        let optional =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let timeout_secs: u64 = optional("STORE_TIMEOUT_SECS", "5")
            .parse()
            .context("STORE_TIMEOUT_SECS must be a positive integer")?;
        anyhow::ensure!(timeout_secs > 0, "STORE_TIMEOUT_SECS must be greater than zero");

        Ok(Self {
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "5000")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            store: StoreConfig {
                database_url: required("DATABASE_URL")?,
                max_connections: optional("DB_MAX_CONNECTIONS", "10")
                    .parse()
                    .context("DB_MAX_CONNECTIONS must be a positive integer")?,
                timeout: Duration::from_secs(timeout_secs),
                retention: optional("RETENTION_POLICY", "unbounded")
                    .trim()
                    .parse()
                    .context("RETENTION_POLICY is not recognised")?,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

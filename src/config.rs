//! Settings read from the environment at startup.

use crate::logic::ByePolicy;
use std::env;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_conflict_retries() -> u32 {
    5
}

/// Bracket engine settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    /// Which round-1 matches the byes occupy.
    pub bye_policy: ByePolicy,
    /// Re-read-and-retry attempts after a lost optimistic lock.
    pub conflict_retries: u32,
    /// Fixed shuffle seed; `None` draws from OS entropy.
    pub shuffle_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bye_policy: ByePolicy::default(),
            conflict_retries: default_conflict_retries(),
            shuffle_seed: None,
        }
    }
}

impl EngineConfig {
    /// `BYE_POLICY`, `CONFLICT_RETRIES`, `BRACKET_SEED`. Unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let bye_policy = match env::var("BYE_POLICY") {
            Ok(v) => v.parse::<ByePolicy>().unwrap_or_else(|e| {
                log::warn!("{}; using {}", e, ByePolicy::default());
                ByePolicy::default()
            }),
            Err(_) => ByePolicy::default(),
        };
        let conflict_retries = env::var("CONFLICT_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_conflict_retries);
        let shuffle_seed = env::var("BRACKET_SEED").ok().and_then(|v| v.parse().ok());
        Self {
            bye_policy,
            conflict_retries,
            shuffle_seed,
        }
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `HOST` (default 0.0.0.0) and `PORT` (default 8080).
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| default_host());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        Self { host, port }
    }
}

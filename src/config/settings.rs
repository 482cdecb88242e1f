use std::fs;

use anyhow::{Context, Result};

/// Match-data service settings.
pub struct ApiSettings {
    pub rate_limit_ms: u64,
    pub user_agent: &'static str,
    pub timeout_secs: u64,
    /// Ranked solo queue.
    pub queue_id: u32,
    /// Season the analysis is pinned to.
    pub season_id: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            rate_limit_ms: 100, // 10 req/sec
            user_agent: "LaneReport/1.0",
            timeout_secs: 30,
            queue_id: 420,
            season_id: 13,
        }
    }
}

/// Retrieval orchestrator settings.
pub struct RetrievalSettings {
    /// Upper bound on concurrent remote fetches.
    pub max_concurrent: usize,
    /// Attempts per match id before a transient failure is surfaced.
    pub max_attempts: u32,
    /// Base backoff between attempts; scaled linearly by attempt number.
    pub retry_delay_ms: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            max_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

pub struct DatabaseSettings {
    pub path: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "cache.sqlite".to_string());
        Self { path }
    }
}

pub struct AppConfig {
    pub api: ApiSettings,
    pub retrieval: RetrievalSettings,
    pub database: DatabaseSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            api: ApiSettings::default(),
            retrieval: RetrievalSettings::default(),
            database: DatabaseSettings::default(),
        }
    }
}

const API_KEY_ENV: &str = "RIOT_API_KEY";
const API_KEY_FILE: &str = "apikey.txt";

/// Load the API key from the environment, falling back to `apikey.txt`.
pub fn load_api_key() -> Result<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        return Ok(key.trim().to_string());
    }

    let key = fs::read_to_string(API_KEY_FILE).with_context(|| {
        format!("No {API_KEY_ENV} set and failed to read {API_KEY_FILE}")
    })?;
    Ok(key.trim().to_string())
}

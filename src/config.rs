use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub youtube: YouTubeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub default_num_items: u32,
    pub max_num_items: u32,
    pub provider_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// YouTube Data API v3 key. When absent the YouTube provider degrades to
    /// redirect-only results instead of blocking startup.
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                workers: num_cpus::get(),
            },
            search: SearchConfig {
                default_num_items: 6,
                max_num_items: 50,
                provider_timeout_secs: 5,
            },
            youtube: YouTubeConfig { api_key: None },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Config::default();

        // Server configuration
        if let Ok(host) = env::var("HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            config.server.port = port.parse()?;
        }
        if let Ok(workers) = env::var("WORKERS") {
            config.server.workers = workers.parse()?;
        }

        // Search configuration
        if let Ok(default_num_items) = env::var("DEFAULT_NUM_ITEMS") {
            config.search.default_num_items = default_num_items.parse()?;
        }
        if let Ok(max_num_items) = env::var("MAX_NUM_ITEMS") {
            config.search.max_num_items = max_num_items.parse()?;
        }
        if let Ok(provider_timeout_secs) = env::var("PROVIDER_TIMEOUT_SECS") {
            config.search.provider_timeout_secs = provider_timeout_secs.parse()?;
        }

        // YouTube credential. API_KEY is the legacy variable name and is kept
        // as a fallback.
        if let Ok(api_key) = env::var("YOUTUBE_API_KEY").or_else(|_| env::var("API_KEY")) {
            if !api_key.trim().is_empty() {
                config.youtube.api_key = Some(api_key);
            }
        }

        Ok(config)
    }
}

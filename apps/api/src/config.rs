use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;
use crate::persona::prompts::DEFAULT_TEMPLATE_PATH;
use crate::persona::scoring::DEFAULT_TOP_N;

const DEFAULT_CATALOG_PATH: &str = "data/personas/personas.yaml";

/// Application configuration loaded from environment variables.
/// Every field has a default except the OpenAI key, whose absence disables refinement.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: String,
    pub prompt_template_path: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub llm_timeout_secs: u64,
    pub top_n: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            catalog_path: env_or("PERSONA_CATALOG_PATH", DEFAULT_CATALOG_PATH),
            prompt_template_path: env_or("PROMPT_TEMPLATE_PATH", DEFAULT_TEMPLATE_PATH),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            llm_timeout_secs: env_or("LLM_TIMEOUT_SECS", "60")
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            top_n: env_or("TOP_N", &DEFAULT_TOP_N.to_string())
                .parse::<usize>()
                .context("TOP_N must be a non-negative integer")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Blank values count as unset so an empty `OPENAI_API_KEY=` line disables refinement.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

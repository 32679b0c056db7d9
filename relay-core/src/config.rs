//! # Runtime configuration
//!
//! A typed view over the environment variables the proxy recognizes. Unlike
//! a generic key/value store, every field here is a concrete, validated
//! setting: there is exactly one place that knows how
//! `PRIMARY_LLM_PROVIDER` is parsed and defaulted.

use std::env;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub redis_host: String,
    pub redis_port: u16,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub service_api_key: Option<String>,
    pub primary_llm_provider: String,
    pub embedding_provider: String,
    pub allow_provider_override: bool,
    pub webhook_base_url: Option<String>,
    pub webhook_secret: Option<String>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: env_or("PORT", "8080").parse().context("PORT must be a u16")?,
            redis_host: env_or("REDIS_HOST", "127.0.0.1"),
            redis_port: env_or("REDIS_PORT", "6379")
                .parse()
                .context("REDIS_PORT must be a u16")?,
            openai_api_key: env_opt("OPENAI_API_KEY"),
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            service_api_key: env_opt("SERVICE_API_KEY"),
            primary_llm_provider: env_or("PRIMARY_LLM_PROVIDER", "openai"),
            embedding_provider: env_or("EMBEDDING_PROVIDER", "openai"),
            allow_provider_override: env_opt("ALLOW_PROVIDER_OVERRIDE")
                .map(|v| v == "true")
                .unwrap_or(false),
            webhook_base_url: env_opt("WEBHOOK_BASE_URL"),
            webhook_secret: env_opt("WEBHOOK_SECRET"),
        })
    }

    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.redis_host, self.redis_port)
    }

    /// Whether a provider has credentials configured.
    pub fn has_credentials_for(&self, provider: &str) -> bool {
        match provider {
            "openai" => self.openai_api_key.is_some(),
            "gemini" => self.gemini_api_key.is_some(),
            _ => false,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_primary_provider_to_openai() {
        std::env::remove_var("PRIMARY_LLM_PROVIDER");
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.primary_llm_provider, "openai");
    }
}

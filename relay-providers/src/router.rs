//! Primary-plus-fallback routing across providers (§4.3).

use relay_core::{CanonicalResponse, Config, Job};
use tracing::warn;

use crate::error::{ProviderError, ProviderResult};
use crate::gemini::GeminiAdapter;
use crate::openai::{self, OpenAiAdapter};

const KNOWN_PROVIDERS: [&str; 2] = ["openai", "gemini"];

pub struct ProviderRouter {
    openai: Option<OpenAiAdapter>,
    gemini: Option<GeminiAdapter>,
    primary: String,
}

impl ProviderRouter {
    pub fn new(config: &Config) -> Self {
        Self {
            openai: config
                .openai_api_key
                .clone()
                .map(OpenAiAdapter::new),
            gemini: config
                .gemini_api_key
                .clone()
                .map(GeminiAdapter::new),
            primary: config.primary_llm_provider.clone(),
        }
    }

    /// Resolves which provider a job should run against at admission time
    /// (§4.3 open question): an explicit, configured override wins; an
    /// unrecognized name is coerced to the configured primary rather than
    /// surfaced as an error.
    pub fn resolve(&self, requested: Option<&str>, allow_override: bool) -> String {
        if allow_override {
            if let Some(name) = requested {
                if KNOWN_PROVIDERS.contains(&name) && self.is_configured(name) {
                    return name.to_string();
                }
            }
        }
        self.primary.clone()
    }

    fn is_configured(&self, name: &str) -> bool {
        match name {
            "openai" => self.openai.is_some(),
            "gemini" => self.gemini.is_some(),
            _ => false,
        }
    }

    /// Runs a chat job against its assigned provider, falling back to the
    /// first other configured provider on any failure (§4.3).
    pub async fn invoke_chat(&self, job: &Job) -> ProviderResult<CanonicalResponse> {
        match self.invoke_with(&job.provider, job).await {
            Ok(response) => Ok(response),
            Err(primary_err) => {
                warn!(provider = %job.provider, error = %primary_err, "primary provider failed, attempting fallback");
                let fallback = KNOWN_PROVIDERS
                    .iter()
                    .find(|name| **name != job.provider && self.is_configured(name));
                match fallback {
                    Some(name) => self.invoke_with(name, job).await,
                    None => Err(ProviderError::AllProvidersFailed),
                }
            }
        }
    }

    async fn invoke_with(&self, provider: &str, job: &Job) -> ProviderResult<CanonicalResponse> {
        match provider {
            "gemini" => {
                let adapter = self
                    .gemini
                    .as_ref()
                    .ok_or(ProviderError::NotConfigured { provider: "gemini" })?;
                let tools = job.tools.as_deref();
                adapter
                    .invoke(&job.messages, job.files.as_deref(), job.temperature, tools)
                    .await
            }
            _ => {
                let adapter = self
                    .openai
                    .as_ref()
                    .ok_or(ProviderError::NotConfigured { provider: "openai" })?;
                let mut messages = job.messages.clone();
                if let Some(files) = &job.files {
                    openai::fold_legacy_files_into_last_user_message(&mut messages, files);
                }
                let has_image = job.has_image();
                let tools = job.tools.as_deref();
                let tool_choice = job.tool_choice.as_ref();
                adapter
                    .invoke(&messages, has_image, job.temperature, tools, tool_choice)
                    .await
            }
        }
    }

    /// Runs a single-shot JSON-only completion against the same provider
    /// family as the job that produced it, for the ticket classifier (§4.6).
    pub async fn invoke_classifier(
        &self,
        provider: &str,
        messages: &[relay_core::Message],
    ) -> ProviderResult<CanonicalResponse> {
        match provider {
            "gemini" => {
                let adapter = self
                    .gemini
                    .as_ref()
                    .ok_or(ProviderError::NotConfigured { provider: "gemini" })?;
                adapter.invoke_json_object(messages, 0.0).await
            }
            _ => {
                let adapter = self
                    .openai
                    .as_ref()
                    .ok_or(ProviderError::NotConfigured { provider: "openai" })?;
                adapter.invoke_json_object(messages, 0.0).await
            }
        }
    }

    pub async fn embeddings(
        &self,
        provider: &str,
        texts: &[String],
    ) -> ProviderResult<(Vec<Vec<f32>>, relay_core::Usage)> {
        match provider {
            "gemini" => {
                let adapter = self
                    .gemini
                    .as_ref()
                    .ok_or(ProviderError::NotConfigured { provider: "gemini" })?;
                adapter.embeddings(texts).await
            }
            _ => {
                let adapter = self
                    .openai
                    .as_ref()
                    .ok_or(ProviderError::NotConfigured { provider: "openai" })?;
                adapter.embeddings(texts).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(primary: &str, openai: Option<&str>, gemini: Option<&str>, allow_override: bool) -> Config {
        Config {
            port: 8080,
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            openai_api_key: openai.map(str::to_string),
            gemini_api_key: gemini.map(str::to_string),
            service_api_key: None,
            primary_llm_provider: primary.to_string(),
            embedding_provider: primary.to_string(),
            allow_provider_override: allow_override,
            webhook_base_url: None,
            webhook_secret: None,
        }
    }

    #[test]
    fn resolve_falls_back_to_primary_when_override_disallowed() {
        let router = ProviderRouter::new(&config("openai", Some("k"), Some("k"), false));
        assert_eq!(router.resolve(Some("gemini"), false), "openai");
    }

    #[test]
    fn resolve_honors_configured_override() {
        let router = ProviderRouter::new(&config("openai", Some("k"), Some("k"), true));
        assert_eq!(router.resolve(Some("gemini"), true), "gemini");
    }

    #[test]
    fn resolve_coerces_unknown_provider_to_primary() {
        let router = ProviderRouter::new(&config("openai", Some("k"), Some("k"), true));
        assert_eq!(router.resolve(Some("anthropic"), true), "openai");
    }

    #[test]
    fn resolve_coerces_unconfigured_provider_to_primary() {
        let router = ProviderRouter::new(&config("openai", Some("k"), None, true));
        assert_eq!(router.resolve(Some("gemini"), true), "openai");
    }

    #[test]
    fn resolve_defaults_to_primary_when_no_override_requested() {
        let router = ProviderRouter::new(&config("gemini", Some("k"), Some("k"), true));
        assert_eq!(router.resolve(None, true), "gemini");
    }
}

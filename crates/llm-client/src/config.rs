//! LLM configuration loaded from environment variables.

use anyhow::{bail, Result};
use std::env;
use tracing::info;

use crate::mask::mask_token;
use crate::models::ModelCatalog;
use crate::provider::ProviderTag;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Key and endpoint of one OpenAI-compatible provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub api_key: String,
    pub base_url: String,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &mask_token(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// LLM settings. A provider is configured only when its API key is set.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub openai: Option<ProviderCredentials>,
    pub gemini: Option<ProviderCredentials>,
    pub claude: Option<ProviderCredentials>,
    /// Model used when a turn does not select one.
    pub default_model: Option<String>,
    pub system_prompt: Option<String>,
    pub moderation_enabled: bool,
    pub max_retries: u32,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn credentials(key_var: &str, url_var: &str, default_url: &str) -> Option<ProviderCredentials> {
    non_empty(key_var).map(|api_key| ProviderCredentials {
        api_key,
        base_url: non_empty(url_var).unwrap_or_else(|| default_url.to_string()),
    })
}

/// Environment variable holding the API key of `tag`.
fn key_var(tag: ProviderTag) -> &'static str {
    match tag {
        ProviderTag::OpenAi => "OPENAI_API_KEY",
        ProviderTag::Gemini => "GEMINI_API_KEY",
        ProviderTag::Claude => "ANTHROPIC_API_KEY",
    }
}

impl EnvLlmConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let openai = credentials(
            key_var(ProviderTag::OpenAi),
            "OPENAI_BASE_URL",
            DEFAULT_OPENAI_BASE_URL,
        );
        let gemini = credentials(
            key_var(ProviderTag::Gemini),
            "GEMINI_BASE_URL",
            DEFAULT_GEMINI_BASE_URL,
        );
        let claude = credentials(
            key_var(ProviderTag::Claude),
            "ANTHROPIC_BASE_URL",
            DEFAULT_ANTHROPIC_BASE_URL,
        );
        let moderation_enabled = env::var("MODERATION_ENABLED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(openai.is_some());
        let max_retries = match env::var("BACKEND_MAX_RETRIES") {
            Ok(raw) => match raw.trim().parse() {
                Ok(n) => n,
                Err(_) => bail!("BACKEND_MAX_RETRIES must be a non-negative integer, got {:?}", raw),
            },
            Err(_) => DEFAULT_MAX_RETRIES,
        };

        let config = Self {
            openai,
            gemini,
            claude,
            default_model: non_empty("DEFAULT_MODEL"),
            system_prompt: non_empty("SYSTEM_PROMPT"),
            moderation_enabled,
            max_retries,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn credentials(&self, tag: ProviderTag) -> Option<&ProviderCredentials> {
        match tag {
            ProviderTag::OpenAi => self.openai.as_ref(),
            ProviderTag::Gemini => self.gemini.as_ref(),
            ProviderTag::Claude => self.claude.as_ref(),
        }
    }

    /// Catalog whose default is `DEFAULT_MODEL`, or else the first listed model of a configured provider.
    pub fn catalog(&self) -> Result<ModelCatalog> {
        match self.default_model.as_deref() {
            Some(id) => Ok(ModelCatalog::with_default(id)?),
            None => Ok(ModelCatalog::first_available(|tag| self.credentials(tag).is_some())
                .unwrap_or_default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.openai.is_none() && self.gemini.is_none() && self.claude.is_none() {
            bail!("No LLM provider configured: set OPENAI_API_KEY, GEMINI_API_KEY or ANTHROPIC_API_KEY");
        }
        if self.moderation_enabled && self.openai.is_none() {
            bail!("MODERATION_ENABLED requires OPENAI_API_KEY");
        }
        let default = self.catalog()?.default_model();
        if self.credentials(default.provider).is_none() {
            bail!(
                "DEFAULT_MODEL {} is served by {}, but {} is not set",
                default.id,
                default.provider,
                key_var(default.provider)
            );
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        for tag in [ProviderTag::OpenAi, ProviderTag::Gemini, ProviderTag::Claude] {
            if let Some(creds) = self.credentials(tag) {
                info!(provider = %tag, base_url = %creds.base_url, api_key = %mask_token(&creds.api_key), "Provider configured");
            }
        }
        info!(
            default_model = self.default_model.as_deref().unwrap_or("(catalog default)"),
            moderation = self.moderation_enabled,
            max_retries = self.max_retries,
            "LLM configuration loaded"
        );
    }
}

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

/// Default per-attempt request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Slack the router allows on top of the client timeout before abandoning an attempt
pub const ATTEMPT_GRACE_SECS: u64 = 2;

/// Supported OpenAI-compatible vendors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProviderKind {
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "groq")]
    Groq,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::DeepSeek, ProviderKind::Groq, ProviderKind::OpenAi];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "deepseek" => Some(Self::DeepSeek),
            "groq" => Some(Self::Groq),
            "openai" => Some(Self::OpenAi),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek",
            Self::Groq => "groq",
            Self::OpenAi => "openai",
        }
    }

    /// Credential variable; its absence disables the provider
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn model_var(&self) -> &'static str {
        match self {
            Self::DeepSeek => "DEEPSEEK_MODEL",
            Self::Groq => "GROQ_MODEL",
            Self::OpenAi => "OPENAI_MODEL",
        }
    }

    pub fn api_base_var(&self) -> &'static str {
        match self {
            Self::DeepSeek => "DEEPSEEK_API_BASE",
            Self::Groq => "GROQ_API_BASE",
            Self::OpenAi => "OPENAI_API_BASE",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek-chat",
            Self::Groq => "llama-3.1-8b-instant",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    /// `None` means the client library default (api.openai.com)
    pub fn default_api_base(&self) -> Option<&'static str> {
        match self {
            Self::DeepSeek => Some("https://api.deepseek.com/v1"),
            Self::Groq => Some("https://api.groq.com/openai/v1"),
            Self::OpenAi => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for a single provider client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,

    /// Vendor API key
    pub api_key: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Optional API base URL for custom endpoints
    pub api_base: Option<String>,

    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Enable debug logging
    pub debug: bool,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, api_key: &str) -> Self {
        Self {
            kind,
            api_key: api_key.to_string(),
            model: kind.default_model().to_string(),
            api_base: kind.default_api_base().map(str::to_string),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug: false,
        }
    }

    /// Load one provider's configuration from the environment.
    ///
    /// Returns `Ok(None)` when the credential is absent or empty: a missing
    /// key disables the provider, it is not an error.
    pub fn from_env(kind: ProviderKind, settings: &ProviderSettings) -> Result<Option<Self>, String> {
        let api_key = match env::var(kind.api_key_var()) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Ok(None),
        };

        let mut config = Self::new(kind, api_key.trim());
        config.timeout_secs = settings.timeout_secs;
        config.debug = settings.debug;

        if let Ok(model) = env::var(kind.model_var()) {
            if !model.trim().is_empty() {
                config.model = model.trim().to_string();
            }
        }

        if let Ok(api_base) = env::var(kind.api_base_var()) {
            if !api_base.trim().is_empty() {
                config.api_base = Some(api_base.trim().to_string());
            }
        }

        config.validate()?;
        Ok(Some(config))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err(format!("{} is empty", self.kind.api_key_var()));
        }

        if self.model.is_empty() {
            return Err(format!("Model name for {} is empty", self.kind));
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Settings shared by every provider, plus the fallback order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub priority: Vec<ProviderKind>,
    pub timeout_secs: u64,
    pub debug: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            priority: ProviderKind::ALL.to_vec(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug: false,
        }
    }
}

impl ProviderSettings {
    /// Load settings from environment variables
    pub fn from_env() -> Self {
        Self::from_env_internal(true)
    }

    #[cfg(test)]
    fn from_env_no_dotenv() -> Self {
        Self::from_env_internal(false)
    }

    fn from_env_internal(load_dotenv: bool) -> Self {
        if load_dotenv {
            let _ = dotenv::dotenv();
        }

        let mut settings = Self::default();

        if let Ok(order) = env::var("FLOWCORE_PROVIDERS") {
            settings.priority = parse_priority(&order);
        }

        if let Ok(timeout) = env::var("LLM_REQUEST_TIMEOUT") {
            if let Ok(timeout_secs) = timeout.parse::<u64>() {
                if timeout_secs > 0 {
                    settings.timeout_secs = timeout_secs;
                }
            }
        }

        if let Ok(debug) = env::var("LLM_DEBUG") {
            settings.debug = debug.to_lowercase() == "true" || debug == "1";
        }

        settings
    }

    /// Outer bound the router puts on one attempt: the client timeout plus a little slack
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs + ATTEMPT_GRACE_SECS)
    }

    /// Configurations for every provider in priority order that has a credential
    pub fn configured_providers(&self) -> Vec<ProviderConfig> {
        self.priority
            .iter()
            .filter_map(|kind| match ProviderConfig::from_env(*kind, self) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Provider {} disabled: {}", kind, e);
                    None
                }
            })
            .collect()
    }
}

/// Parse a comma-separated provider order, skipping unknown and repeated names
pub fn parse_priority(value: &str) -> Vec<ProviderKind> {
    let mut order = Vec::new();
    for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match ProviderKind::parse(name) {
            Some(kind) if !order.contains(&kind) => order.push(kind),
            Some(_) => {}
            None => tracing::warn!("Ignoring unknown provider '{}' in FLOWCORE_PROVIDERS", name),
        }
    }
    order
}

pub mod config;
pub mod prompts;
pub mod provider;
pub mod service;

pub use config::{ProviderConfig, ProviderKind, ProviderSettings};
pub use provider::{GenerationParams, Provider, ProviderError, ProviderOutput};
pub use service::LlmService;

use std::sync::Arc;

/// Build provider clients for every configured vendor, in priority order
pub fn providers_from_env(settings: &ProviderSettings) -> Vec<Arc<dyn Provider>> {
    settings
        .configured_providers()
        .into_iter()
        .filter_map(|config| {
            let kind = config.kind;
            match LlmService::new(config) {
                Ok(service) => Some(Arc::new(service) as Arc<dyn Provider>),
                Err(e) => {
                    tracing::warn!("Provider {} disabled: {}", kind, e);
                    None
                }
            }
        })
        .collect()
}

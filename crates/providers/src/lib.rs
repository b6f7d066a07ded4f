//! Model provider implementations for Roster.
//!
//! All providers implement the `roster_core::Provider` trait. Gemini, OpenAI,
//! and local servers are all reached through their OpenAI-compatible
//! `/chat/completions` and `/embeddings` endpoints.

pub mod openai_compat;

use std::sync::Arc;

use roster_config::AppConfig;
use roster_core::error::ProviderError;
use roster_core::provider::Provider;

pub use openai_compat::OpenAiCompatProvider;

/// Build the configured provider.
///
/// Fails with [`ProviderError::NotConfigured`] when no API key is available.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(format!(
            "no API key for provider '{}' (set ROSTER_API_KEY or api_key in config.toml)",
            config.provider.name
        ))
    })?;

    Ok(Arc::new(OpenAiCompatProvider::new(
        &config.provider.name,
        &config.provider.base_url,
        api_key,
    )))
}

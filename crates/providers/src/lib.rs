//! Hosted LLM client implementations for Touchline.
//!
//! All providers implement the `touchline_core::ChatProvider` trait. The
//! completion endpoint, the embedding endpoint, and token-level SSE
//! streaming all live behind one OpenAI-compatible client.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use touchline_config::AppConfig;

/// Build the configured provider from application config.
pub fn build_from_config(config: &AppConfig) -> OpenAiCompatProvider {
    OpenAiCompatProvider::new(
        "openai",
        &config.base_url,
        config.api_key.clone().unwrap_or_default(),
    )
}

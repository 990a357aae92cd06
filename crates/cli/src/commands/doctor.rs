//! `touchline doctor` — Diagnose system health.

use std::sync::Arc;
use touchline_config::AppConfig;
use touchline_core::retrieval::Retriever;
use touchline_core::ChatProvider;
use touchline_retrieval::VectorIndexClient;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Touchline Doctor — System Diagnostics");
    println!("========================================\n");

    let mut issues = 0;

    // Check config
    let config_path = AppConfig::config_dir().join("config.toml");
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid");
                Some(config)
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                issues += 1;
                None
            }
        }
    } else {
        println!("  ⚠️  No config file — run `touchline onboard` (using defaults)");
        AppConfig::load().ok()
    };

    if let Some(config) = config {
        // Check API key
        if config.has_api_key() {
            println!("  ✅ API key configured");
        } else {
            println!("  ⚠️  No API key — set TOUCHLINE_API_KEY or add api_key to config.toml");
            issues += 1;
        }

        // Check completion endpoint
        let provider: Arc<dyn ChatProvider> =
            Arc::new(touchline_providers::build_from_config(&config));
        match provider.health_check().await {
            Ok(true) => println!("  ✅ Completion endpoint reachable: {}", config.base_url),
            Ok(false) => {
                println!("  ❌ Completion endpoint unhealthy: {}", config.base_url);
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Completion endpoint unreachable: {e}");
                issues += 1;
            }
        }

        // Check vector index
        let retriever = VectorIndexClient::from_config(&config.retrieval, provider);
        match retriever.health_check().await {
            Ok(true) => println!(
                "  ✅ Vector index reachable: collection '{}'",
                config.retrieval.collection
            ),
            Ok(false) => {
                println!(
                    "  ❌ Vector index responded but collection '{}' is missing",
                    config.retrieval.collection
                );
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Vector index unreachable: {e}");
                issues += 1;
            }
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

use crate::llm::{ProviderConfig, ProviderKind, ProviderSettings};
use crate::server::ServerConfig;
use anyhow::Result;
use std::env;

pub fn handle_config_command() -> Result<()> {
    // Load .env file if it exists
    let env_file_loaded = dotenv::dotenv().is_ok();

    println!("🔧 FlowCore Configuration");
    println!("═══════════════════════════════════════");
    println!();

    println!("📦 Version Information:");
    println!("  • FlowCore: v{}", env!("CARGO_PKG_VERSION"));
    println!("  • Authors: {}", env!("CARGO_PKG_AUTHORS"));
    println!("  • License: {}", env!("CARGO_PKG_LICENSE"));
    println!();

    println!("🌍 Environment Configuration:");
    if env_file_loaded {
        println!("  • .env file: ✅ Loaded");
    } else {
        println!("  • .env file: ⚠️  Not found (using system environment)");
    }

    let settings = ProviderSettings::from_env();
    match env::var("LLM_DEBUG") {
        Ok(val) => println!("  • LLM_DEBUG: {}", val),
        Err(_) => println!("  • LLM_DEBUG: false (default)"),
    }
    match env::var("RUST_LOG") {
        Ok(val) => println!("  • RUST_LOG: {}", val),
        Err(_) => println!("  • RUST_LOG: info (default)"),
    }
    println!();

    println!("🤖 Providers:");
    for kind in ProviderKind::ALL {
        match ProviderConfig::from_env(kind, &settings) {
            Ok(Some(config)) => {
                println!("  • {}: ✅ {} set (hidden)", kind, kind.api_key_var());
                println!("      model: {}", config.model);
                if let Some(base) = &config.api_base {
                    println!("      api base: {}", base);
                }
            }
            Ok(None) => println!("  • {}: ❌ {} not set", kind, kind.api_key_var()),
            Err(e) => println!("  • {}: ⚠️  invalid ({})", kind, e),
        }
    }
    println!();

    println!("🔀 Fallback Order:");
    let configured = settings.configured_providers();
    let order: Vec<String> = settings
        .priority
        .iter()
        .map(|kind| {
            if configured.iter().any(|c| c.kind == *kind) {
                kind.to_string()
            } else {
                format!("{} (skipped)", kind)
            }
        })
        .collect();
    if order.is_empty() {
        println!("  • FLOWCORE_PROVIDERS lists no known provider");
    } else {
        println!("  • {}", order.join(" → "));
    }
    println!("  • Request timeout: {} seconds", settings.timeout_secs);
    if configured.is_empty() {
        println!("  • AI Analysis: ❌ Disabled, built-in fallback results are returned");
    }
    println!();

    let server = ServerConfig::from_env();
    println!("🌐 Server:");
    println!("  • Bind address: {}", server.bind_addr());
    println!("  • Database: {}", server.database_path.display());

    println!();
    println!("💡 Tips:");
    if configured.is_empty() {
        println!("  • Set DEEPSEEK_API_KEY, GROQ_API_KEY or OPENAI_API_KEY to enable AI analysis");
    }
    println!("  • Use FLOWCORE_PROVIDERS=groq,openai to change the fallback order");
    println!("  • Use RUST_LOG=debug for detailed logging");

    Ok(())
}

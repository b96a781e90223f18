//! JuniorDebug API
//!
//! Backend that accepts source code from the JuniorDebug frontend, asks an
//! AI provider (Gemini, OpenAI or Anthropic) to debug or improve it, and
//! returns the improved code with explanations.

mod api;
mod conversion;
mod core;
mod models;

use crate::api::endpoints::{AppState, create_router};
use crate::core::config::{Config, mask_key};
use crate::core::logging::init_logging;
use crate::core::provider::ProviderType;
use anyhow::{Context, Result};
use tracing::{error, info, warn};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help") {
        print_help();
        return;
    }

    // A missing .env file is fine; the process environment is used as is.
    dotenv::dotenv().ok();

    let config = match load_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.log_level);

    print_startup_banner(&config);

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(workers) = config.workers {
        builder.worker_threads(workers);
    }
    let runtime = match builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(serve(config)) {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }
}

/// `--config <path>` reads only that file; otherwise `CONFIG_PATH` plus env
fn load_config(args: &[String]) -> Result<Config> {
    match args.iter().position(|arg| arg == "--config") {
        Some(i) => {
            let path = args.get(i + 1).context("--config requires a file path")?;
            Config::from_file(path)
        }
        None => Config::from_env(),
    }
}

async fn serve(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState::from_config(config).context("Failed to create AI providers")?;
    if state.providers.is_empty() {
        warn!("No AI provider key configured; /analyze will answer with demonstration results");
    }
    for provider in state.providers.values() {
        info!("Provider ready: {}", provider.provider_name());
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await.context("HTTP server stopped")?;
    Ok(())
}

/// Print startup banner with configuration
fn print_startup_banner(config: &Config) {
    println!("🚀 JuniorDebug API v{}", env!("CARGO_PKG_VERSION"));
    println!("✅ Configuration loaded successfully");
    for provider in ProviderType::AUTO_ORDER {
        let key = config
            .credentials(provider)
            .map(|c| mask_key(&c.api_key))
            .unwrap_or_else(|| "<none>".to_string());
        println!("   {} key: {}", provider, key);
    }
    let auto_order: Vec<&str> = config
        .configured_providers()
        .iter()
        .map(|p| p.as_str())
        .collect();
    println!("   Auto model order: {}", auto_order.join(", "));
    println!("   Max Tokens: {}", config.max_tokens);
    println!("   Temperature: {}", config.temperature);
    println!("   Request Timeout: {}s", config.request_timeout);
    println!("   Demo Mode: {}", if config.demo_mode { "Enabled" } else { "Disabled" });
    println!("   Allowed Origins: {}", config.allowed_origins.join(", "));
    match config.workers {
        Some(workers) => println!("   Workers: {}", workers),
        None => println!("   Workers: one per CPU"),
    }
    println!("   Server: {}:{}", config.host, config.port);
    println!();
}

/// Print help message
fn print_help() {
    println!("JuniorDebug API v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: juniordebug-api [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>  Read configuration from a TOML file only");
    println!("  --help           Display this help message");
    println!();
    println!("Environment variables (override config.toml, .env is loaded first):");
    println!("  GEMINI_API_KEY     - Google Gemini API key");
    println!("  OPENAI_API_KEY     - OpenAI API key");
    println!("  ANTHROPIC_API_KEY  - Anthropic API key");
    println!("  GEMINI_BASE_URL / OPENAI_BASE_URL / ANTHROPIC_BASE_URL - API base URLs");
    println!("  AUTO_PROVIDERS     - Provider order for model \"auto\" (default: gemini,openai,anthropic)");
    println!("  FRONTEND_URL       - Extra origin allowed by CORS");
    println!("  HOST               - Server host (default: 0.0.0.0)");
    println!("  PORT               - Server port (default: 8000)");
    println!("  WEB_CONCURRENCY    - Runtime worker threads (default: one per CPU)");
    println!("  LOG_LEVEL          - Logging level (default: info)");
    println!("  REQUEST_TIMEOUT    - Provider request timeout in seconds (default: 60)");
    println!("  CONFIG_PATH        - TOML config file (default: config.toml, optional; an explicit path must exist)");
    println!();
    println!("Endpoints:");
    println!("  GET  /         Liveness check");
    println!("  GET  /health   Liveness check");
    println!("  POST /analyze  Analyze code");
}

use std::sync::Arc;

use anyhow::Context;

use offer_signup::config::AppConfig;
use offer_signup::services::HttpSignupService;
use offer_signup::signup::{SignupRouteState, StepFlow, signup_routes};
use offer_signup::store::{MemorySessionStore, spawn_sweeper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("  export SIGNUP_SERVICE_URL=https://<project>.example.com");
        eprintln!("  export SIGNUP_SERVICE_KEY=...");
        std::process::exit(1);
    });

    eprintln!("📝 Offer Signup v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Service: {}", config.service.base_url);
    eprintln!("   API: http://0.0.0.0:{}/api/signup", config.port);
    eprintln!(
        "   Sessions: idle after {}s, swept every {}s\n",
        config.session_idle_timeout.as_secs(),
        config.sweep_interval.as_secs()
    );

    // ── Sessions ────────────────────────────────────────────────────────
    let store = MemorySessionStore::new(config.session_idle_timeout);
    let _sweeper = spawn_sweeper(Arc::clone(&store), config.sweep_interval);

    // ── Flow ────────────────────────────────────────────────────────────
    let service = Arc::new(HttpSignupService::new(&config.service));
    let flow = Arc::new(StepFlow::new(store, service));
    let app = signup_routes(SignupRouteState { flow });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "Signup server started");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

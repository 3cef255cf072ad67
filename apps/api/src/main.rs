use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use persona_api::config::Config;
use persona_api::llm_client::{self, LlmClient};
use persona_api::persona::analyzer::RuleBasedAnalyzer;
use persona_api::persona::catalog::load_personas;
use persona_api::persona::predictor::PersonaPredictor;
use persona_api::persona::refinement::PersonaClassifier;
use persona_api::routes::build_router;
use persona_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("persona_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Persona API v{}", env!("CARGO_PKG_VERSION"));

    // Load the persona catalog once; a bad catalog is fatal
    let personas = load_personas(&config.catalog_path)
        .with_context(|| format!("Failed to load persona catalog from {}", config.catalog_path))?;

    let mut predictor =
        PersonaPredictor::new(personas, Arc::new(RuleBasedAnalyzer::new()), config.top_n);

    // Initialize LLM refinement when an API key is available
    match &config.openai_api_key {
        Some(api_key) => {
            let llm = LlmClient::with_base_url(
                api_key.clone(),
                &config.openai_base_url,
                config.llm_timeout_secs,
            )
            .context("Failed to build LLM client")?;
            let classifier = PersonaClassifier::new(Arc::new(llm), &config.prompt_template_path);
            info!(
                "LLM refinement enabled (model: {}, template: {})",
                llm_client::MODEL,
                classifier.template_path().display()
            );
            predictor = predictor.with_classifier(classifier);
        }
        None => warn!("OPENAI_API_KEY not set; predictions will be rule-based only"),
    }

    let state = AppState {
        predictor: Arc::new(predictor),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

mod admin;
mod career;
mod config;
mod db;
mod errors;
mod export;
mod llm_client;
mod models;
mod payments;
mod routes;
mod state;
mod users;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::llm_client::{GeminiClient, LlmProvider};
use crate::payments::intasend::{IntaSendClient, PaymentGateway};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite
    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;
    info!("Database ready at {}", config.database_url);

    // Initialize LLM client
    let llm: Option<Arc<dyn LlmProvider>> = match GeminiClient::from_config(&config.gemini)? {
        Some(client) => {
            info!("LLM client initialized (model: {})", client.model());
            Some(Arc::new(client))
        }
        None => {
            warn!("GEMINI_API_KEY not set, generation endpoints will answer 503");
            None
        }
    };

    // Initialize payment gateway
    let gateway: Option<Arc<dyn PaymentGateway>> =
        match IntaSendClient::from_config(&config.intasend)? {
            Some(client) => {
                info!("IntaSend client initialized ({})", config.intasend.base_url);
                Some(Arc::new(client))
            }
            None => {
                warn!("IntaSend keys not set, STK push disabled. Manual WhatsApp unlocks still work");
                None
            }
        };
    if let Some(webhook_url) = &config.intasend.webhook_url {
        info!("IntaSend callbacks expected at {webhook_url}");
    }
    if config.intasend.api_key.is_none() {
        warn!("INTASEND_API_KEY not set, webhook signatures will NOT be verified");
    }
    if config.admin_password.is_none() {
        warn!("ADMIN_PASSWORD not set, admin endpoints are disabled");
    }

    let state = AppState {
        db,
        llm,
        gateway,
        config: config.clone(),
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

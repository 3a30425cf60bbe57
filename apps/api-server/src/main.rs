//! # Chatgate API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use chatgate_infra::{FixedWindowRateLimiter, OpenAiCompletionProvider};
use middleware::client::ClientTokenConfig;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

#[cfg(test)]
mod tests;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Chatgate API Server on {}:{}",
        config.host,
        config.port
    );

    let limiter = Arc::new(
        FixedWindowRateLimiter::new(config.quota.limiter.clone()).map_err(std::io::Error::other)?,
    );
    let provider = Arc::new(
        OpenAiCompletionProvider::new(config.openai.clone()).map_err(std::io::Error::other)?,
    );

    #[cfg(feature = "scheduler")]
    let mut scheduler = start_scheduler(limiter.clone()).await;

    let state = AppState::new(
        limiter,
        provider,
        config.completion.clone(),
        config.quota.clone(),
    );

    let client_config = ClientTokenConfig::new(config.trust_proxy_headers);
    if client_config.trust_proxy_headers {
        tracing::info!("Client quotas keyed on forwarded headers");
    }

    // Start HTTP server
    let result = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(client_config)
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    #[cfg(feature = "scheduler")]
    {
        if let Some(scheduler) = scheduler.as_mut() {
            if let Err(e) = scheduler.shutdown().await {
                tracing::error!("Failed to stop scheduler: {:?}", e);
            }
        }
    }

    result
}

/// Start the purge job; the server keeps running without it on failure.
#[cfg(feature = "scheduler")]
async fn start_scheduler(limiter: Arc<FixedWindowRateLimiter>) -> Option<background::Scheduler> {
    let scheduler = match background::Scheduler::new(background::SchedulerConfig::from_env()).await
    {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!("Failed to create scheduler: {:?}", e);
            return None;
        }
    };

    if let Err(e) = scheduler.add_usage_purge(limiter).await {
        tracing::error!("Failed to register rate limit purge job: {:?}", e);
        return None;
    }
    if let Err(e) = scheduler.start().await {
        tracing::error!("Failed to start scheduler: {:?}", e);
        return None;
    }

    Some(scheduler)
}

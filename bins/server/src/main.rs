//! Spendflow API Server
//!
//! Main entry point for the expense approval service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spendflow_api::{AppState, create_router};
use spendflow_core::currency::{CurrencyConverter, HttpRateProvider};
use spendflow_core::workflow::ApprovalFlow;
use spendflow_db::connect;
use spendflow_shared::types::CurrencyCode;
use spendflow_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spendflow=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let flow = ApprovalFlow::from_names(&config.approval.flow)
        .context("Invalid approval.flow configuration")?;
    info!(flow = ?flow.roles(), "Approval flow configured");

    let db = connect(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("Failed to connect to database")?;
    info!("Connected to database");

    let base_currency = CurrencyCode::parse(&config.currency.base_currency)
        .context("Invalid currency.base_currency")?;
    let provider = HttpRateProvider::new(
        config.currency.rates_api_url.clone(),
        Duration::from_secs(config.currency.fetch_timeout_secs),
    )?;
    let converter = Arc::new(CurrencyConverter::new(
        base_currency.clone(),
        Arc::new(provider),
        config.currency.fallback_to_identity,
    ));

    // Startup continues without quotes; conversions will retry on demand.
    if let Err(e) = converter.refresh().await {
        warn!(error = %e, base = %base_currency, "Initial exchange-rate fetch failed");
    }

    let refresh_task = (config.currency.refresh_interval_secs > 0).then(|| {
        info!(
            interval_secs = config.currency.refresh_interval_secs,
            "Starting background exchange-rate refresh"
        );
        Arc::clone(&converter).spawn_refresh(Duration::from_secs(
            config.currency.refresh_interval_secs,
        ))
    });

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));
    let state = AppState::with_database(db, jwt_service, converter, flow);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = refresh_task {
        task.abort();
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

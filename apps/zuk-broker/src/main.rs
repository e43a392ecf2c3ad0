//! ZukBroker - Query Routing Service
//!
//! HTTP service that keeps the routing tables of ZukLink streaming tables.
//! The cluster watcher pushes every external view change; the broker rebuilds
//! the set of alternative routing tables and serves the current set.

mod config;
mod dto;
mod error;
mod handlers;
mod routes;
mod service;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use zuklink_domain::routing::{LowLevelConsumerRoutingTableBuilder, RoutingTableBuilder};

use crate::config::BrokerConfig;
use crate::service::RoutingService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub routing_service: Arc<RoutingService<LowLevelConsumerRoutingTableBuilder>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting ZukBroker routing service");

    let config = BrokerConfig::from_env();

    // Create routing table builder
    let mut builder = LowLevelConsumerRoutingTableBuilder::new();
    builder.init(&config.builder)?;

    info!(
        table_count = builder.table_count(),
        seeded = builder.settings().random_seed.is_some(),
        "Initialized routing table builder"
    );

    // Create shared application state
    let state = AppState {
        routing_service: Arc::new(RoutingService::new(builder)),
    };

    // Build HTTP router
    let app = routes::create_router(state);

    let addr = config.bind_addr();
    info!(addr = %addr, "Starting HTTP server");

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

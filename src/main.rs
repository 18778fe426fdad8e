//! gatecheck server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gatecheck::api;
use gatecheck::app_state::AppState;
use gatecheck::config::{EngineConfig, StoreBackend};
use gatecheck::domain::EventBus;
use gatecheck::service::{
    AttendanceRecorder, MetricsAggregator, RsvpLedger, TicketIssuer, TicketValidator,
    WaitlistPromoter,
};
use gatecheck::store::memory::MemoryStore;
use gatecheck::store::postgres::PgStore;
use gatecheck::store::RecordStore;
use gatecheck::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = EngineConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting gatecheck");

    // Build record store
    let store: Arc<dyn RecordStore> = match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("using in-memory record store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .min_connections(config.database_min_connections)
                .acquire_timeout(std::time::Duration::from_secs(
                    config.database_connect_timeout_secs,
                ))
                .connect(&config.database_url)
                .await?;
            let store = PgStore::new(pool);
            store
                .run_migrations()
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            tracing::info!("using postgresql record store");
            Arc::new(store)
        }
    };

    // Build domain and service layers
    let event_bus = EventBus::new(config.event_bus_capacity);
    let metrics = MetricsAggregator::new(Arc::clone(&store));
    let promoter = Arc::new(WaitlistPromoter::new(
        Arc::clone(&store),
        metrics.clone(),
        event_bus.clone(),
    ));
    let ledger = Arc::new(RsvpLedger::new(
        Arc::clone(&store),
        metrics.clone(),
        Arc::clone(&promoter),
        event_bus.clone(),
    ));
    let issuer = Arc::new(TicketIssuer::new(Arc::clone(&store), event_bus.clone()));
    let recorder = AttendanceRecorder::new(Arc::clone(&store), metrics.clone(), event_bus.clone());
    let validator = Arc::new(TicketValidator::new(
        Arc::clone(&store),
        recorder.clone(),
        event_bus.clone(),
        config.max_ticket_age(),
        config.ticket_clock_skew(),
    ));

    // Build application state
    let app_state = AppState {
        store,
        ledger,
        promoter,
        issuer,
        validator,
        recorder: Arc::new(recorder),
        metrics: Arc::new(metrics),
        event_bus,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

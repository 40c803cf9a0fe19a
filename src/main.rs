use git_event_monitor::api::create_router;
use git_event_monitor::db::{SqlEventStore, init_db};
use git_event_monitor::error::MonitorError;
use git_event_monitor::ingest::IngestService;
use git_event_monitor::logging::setup_logging;
use git_event_monitor::{AppState, MonitorConfig, load_config};
use std::sync::Arc;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "monitor_config.toml";

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

async fn run(config: MonitorConfig) -> Result<(), MonitorError> {
    let pool = init_db(&config.database.path, config.database.max_connections).await?;
    let store = SqlEventStore::new(pool);
    let state = Arc::new(AppState::new(IngestService::new(store.clone())));
    let app = create_router(state);

    let bind_address = &config.server.bind_address;
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("Listening on http://{}", bind_address);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("Closing event store");
    store.close().await;
    served.map_err(MonitorError::from)
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config_path =
        std::env::var("MONITOR_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let config = match load_config(&config_path) {
        Ok(cfg) => cfg.with_env_overrides(),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let _log_guard = match setup_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Logging setup error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting GitHub event monitor");
    info!("Using config at {:?}", config_path);
    info!("Event store: {:?}", config.database.path);

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

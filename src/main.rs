//! CampusEvents server
//!
//! Main application entry point

use tokio::net::TcpListener;
use tracing::{info, warn};

use CampusEvents::{
    config::Settings,
    database::DatabaseService,
    handlers::{router, AppState},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", CampusEvents::info());

    info!("Connecting to store...");
    let database = DatabaseService::connect(&settings.database).await?;

    let services = ServiceFactory::new(&settings, database);

    if let Some(admin) = services.admin_service.ensure_default_admin().await? {
        info!(admin_id = admin.id, email = %admin.email, "Created default admin account");
    }

    let state = AppState::new(&settings, services);
    if state.rate_limiter.is_none() {
        warn!("Rate limiting is disabled");
    }
    let app = router(state);

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on {}", address);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("CampusEvents has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

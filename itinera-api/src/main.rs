use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use itinera_api::{
    adapters::outbound::SimulatedBackend, app_state::AppState, config::read_config, router,
};

#[tokio::main]
async fn main() {
    dotenvy::from_filename("./itinera-api/.env.local").ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = read_config().expect("Failed to read configuration");

    let backend = SimulatedBackend::new()
        .with_delay(Duration::from_millis(config.backend.fetch_delay_ms));
    let app_state = AppState::new(Arc::new(backend));
    let app = router::create(app_state, &config);

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind listener");
    tracing::info!("listening on {address}");

    axum::serve(listener, app)
        .await
        .expect("Failed to run server");
}

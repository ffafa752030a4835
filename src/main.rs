use mood_check::auth::{AuthProvider, LocalAuth};
use mood_check::store::LocalStore;
use mood_check::{AppState, Config, Controller, load_data, router};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let data = load_data(&config.data_path).await?;
    info!(path = %config.data_path.display(), entries = data.entries.len(), "entry store loaded");
    let store = LocalStore::with_data(Some(config.data_path.clone()), data);

    let auth = LocalAuth::new();
    if let Some(name) = &config.auto_sign_in {
        if let Err(err) = auth.sign_in(name).await {
            warn!(error = %err, "automatic sign-in failed");
        }
    }

    let view = Controller::spawn(Arc::new(auth), Arc::new(store), config.suggestion_window).await;
    let app = router(AppState::new(view));

    let addr = config.listen_addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

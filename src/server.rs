use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use crate::api;
use crate::auth::hash_password;
use crate::config::{AdminSeed, Config};
use crate::db::{BoodaiDb, NewUser};
use crate::error::Result;
use crate::state::AppState;

/// Creates the configured admin account if it does not exist yet.
///
/// # Errors
/// Returns an error if hashing or the insert fails.
pub async fn seed_admin(db: &BoodaiDb, admin: &AdminSeed) -> Result<bool> {
    let Some(password) = admin.password.as_deref().filter(|p| !p.is_empty()) else {
        if db.count_admins().await? == 0 {
            warn!("No admin account exists and admin_password is not set");
        }
        return Ok(false);
    };

    db.seed_admin(&NewUser {
        name: admin.name.clone(),
        email: admin.email.clone(),
        password_hash: hash_password(password).await?,
        is_admin: true,
    })
    .await
}

/// Connects, migrates, seeds and serves until Ctrl+C or SIGTERM.
///
/// # Errors
/// Returns an error if any startup step fails or the listener cannot bind.
pub async fn start_server(config: Config) -> Result<()> {
    info!("Initializing state...");
    let state = AppState::from_config(&config).await?;

    state.db.initialize_schema().await?;
    seed_admin(&state.db, &config.admin).await?;

    let app = api::router(state, &config.cors_origins);

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

use std::sync::Arc;

use anyhow::{anyhow, Context};
use api::db::PgRepository;
use api::settings::Settings;
use api::AppContext;
use store::S3BlobStore;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{time, Key, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::EnvFilter;

mod error;
mod extract;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    tracing::debug!(?settings, "settings loaded");

    let pool = api::db::connect(&settings.database)
        .await
        .context("failed to connect to database")?;
    api::db::migrate(&pool)
        .await
        .context("failed to run migrations")?;

    let session_store = PostgresStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .context("failed to migrate session store")?;

    let blobs = S3BlobStore::from_env(&settings.storage.s3_config())
        .context("failed to configure object storage")?;

    let ctx = AppContext::new(
        Arc::new(PgRepository::new(pool)),
        Arc::new(blobs),
        settings.uploads,
    );

    let key = Key::try_from(settings.session.secret.as_bytes())
        .map_err(|e| anyhow!("invalid session secret: {e:?}"))?;
    let inactivity = i64::try_from(settings.session.inactivity_hours)
        .context("session.inactivity_hours is too large")?;
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(settings.session.secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(inactivity)))
        .with_signed(key);

    let app = routes::router(ctx)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&settings.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.listen_addr))?;
    tracing::info!("Server listening on {}", settings.server.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

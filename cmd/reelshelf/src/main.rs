//! # reelshelf
//!
//! Assembles the service from settings and compiled-in adapters, then serves
//! HTTP until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::{router, AppState, HttpConfig};
use auth_adapters::{Argon2Hasher, JwtTokenService};
use configs::{LogFormat, LogSettings, Settings};
use secrecy::ExposeSecret;
use services::{Repositories, Services};
use storage_adapters::{LocalMediaStore, MemoryStore};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[cfg(feature = "db-postgres")]
async fn repositories(settings: &Settings) -> anyhow::Result<Repositories> {
    use storage_adapters::{PgStore, PoolSettings};

    let Some(url) = settings.database.url.as_ref() else {
        warn!("no database url configured, running on the in-memory store; data is lost on exit");
        return Ok(Repositories::from_store(Arc::new(MemoryStore::new())));
    };
    let pool = PoolSettings {
        max_connections: settings.database.max_connections,
        acquire_timeout: settings.database.acquire_timeout(),
        idle_timeout: settings.database.idle_timeout(),
    };
    let store = PgStore::connect(url.expose_secret(), &pool)
        .await
        .context("connecting to PostgreSQL")?;
    store.migrate().await.context("running migrations")?;
    info!(max_connections = pool.max_connections, "PostgreSQL store ready");
    Ok(Repositories::from_store(Arc::new(store)))
}

#[cfg(not(feature = "db-postgres"))]
async fn repositories(settings: &Settings) -> anyhow::Result<Repositories> {
    if settings.database.url.is_some() {
        warn!("database url ignored: built without db-postgres");
    }
    warn!("running on the in-memory store; data is lost on exit");
    Ok(Repositories::from_store(Arc::new(MemoryStore::new())))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
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
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let repos = repositories(&settings).await?;

    let auth = &settings.auth;
    let hasher = Argon2Hasher::new(auth.argon2_memory_kib, auth.argon2_iterations, auth.argon2_parallelism)
        .context("configuring argon2")?;
    let tokens = JwtTokenService::new(
        auth.jwt_secret.expose_secret().as_bytes(),
        chrono::Duration::days(auth.token_ttl_days),
    );

    let media = &settings.media;
    tokio::fs::create_dir_all(&media.upload_dir)
        .await
        .with_context(|| format!("creating upload dir {}", media.upload_dir.display()))?;
    let avatars = LocalMediaStore::new(media.upload_dir.clone(), media.url_prefix.clone());

    let services = Services::new(repos, Arc::new(hasher), Arc::new(tokens), Arc::new(avatars));
    let http = HttpConfig {
        cors_origins: settings.server.cors_origins.clone(),
        upload_dir: media.upload_dir.clone(),
        url_prefix: media.url_prefix.clone(),
        max_upload_bytes: media.max_upload_bytes,
    };
    let app = router(AppState::new(services), &http);

    let addr = settings.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "reelshelf listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;
    info!("reelshelf stopped");
    Ok(())
}

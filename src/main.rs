//! elmo-back binary entrypoint wiring the REST API, the room store, and the text generator.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use elmo_back::{
    ai::{DiscussionGenerator, canned::CannedGenerator},
    config::{AiBackend, AiSettings, AppConfig},
    dao::room_store::{RoomStore, memory::MemoryRoomStore},
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let config = AppConfig::load();
    let store = connect_store(&config).await?;
    let generator = build_generator(&config.ai)?;

    let port = config.port;
    let app_state = AppState::new(store, generator, config);
    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Connect to Postgres when `DATABASE_URL` is set, otherwise keep rooms in memory.
async fn connect_store(config: &AppConfig) -> anyhow::Result<Arc<dyn RoomStore>> {
    #[cfg(feature = "postgres-store")]
    {
        use elmo_back::dao::room_store::postgres::{PgConfig, PostgresRoomStore};

        match PgConfig::from_env() {
            Ok(pg_config) => {
                let pg_config = pg_config.with_max_connections(config.max_connections);
                let store = PostgresRoomStore::connect(pg_config)
                    .await
                    .context("connecting to Postgres")?;
                info!("using Postgres room store");
                return Ok(Arc::new(store));
            }
            Err(err) => warn!(error = %err, "falling back to in-memory room store"),
        }
    }

    #[cfg(not(feature = "postgres-store"))]
    {
        let _ = config;
        warn!("built without postgres-store; using in-memory room store");
    }

    Ok(Arc::new(MemoryRoomStore::new()))
}

/// Select the text generator named by the configuration.
fn build_generator(settings: &AiSettings) -> anyhow::Result<Arc<dyn DiscussionGenerator>> {
    match settings.backend {
        AiBackend::Canned => {
            warn!("using canned text generator; questions and summaries are fixed");
            Ok(Arc::new(CannedGenerator::new()))
        }
        AiBackend::Gemini => gemini_generator(settings),
    }
}

#[cfg(feature = "gemini")]
fn gemini_generator(settings: &AiSettings) -> anyhow::Result<Arc<dyn DiscussionGenerator>> {
    use elmo_back::ai::gemini::{GeminiConfig, GeminiGenerator};

    let mut config = GeminiConfig::from_env()
        .context("configuring Gemini (set ELMO_AI_BACKEND=canned to run without it)")?
        .with_timeout(settings.timeout);
    if let Some(model) = &settings.model {
        config = config.with_model(model.clone());
    }
    if let Some(base_url) = &settings.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(temperature) = settings.temperature {
        config = config.with_temperature(temperature);
    }

    info!(model = %config.model, "using Gemini text generator");
    let generator = GeminiGenerator::new(config).context("building Gemini client")?;
    Ok(Arc::new(generator))
}

#[cfg(not(feature = "gemini"))]
fn gemini_generator(_settings: &AiSettings) -> anyhow::Result<Arc<dyn DiscussionGenerator>> {
    anyhow::bail!("built without the `gemini` feature; set ELMO_AI_BACKEND=canned")
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

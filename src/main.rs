use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moderation_api::config::Config;
use moderation_api::db::{Database, ModerationStore, SideEffectSink};
use moderation_api::services::{ModerationService, SeverityPolicy, SideEffectDispatcher};
use moderation_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::load()?;
    tracing::info!("Configuration loaded successfully");

    let db = Arc::new(Database::connect(&config).await?);
    tracing::info!("Database connections established");

    db.run_migrations().await?;

    let policy = Arc::new(SeverityPolicy::with_overrides(&config.moderation.severity_overrides));
    let sink: Arc<dyn SideEffectSink> = db.clone();
    let (dispatcher, worker) = SideEffectDispatcher::from_config(sink, &config.dispatch);

    let store: Arc<dyn ModerationStore> = db;
    let moderation = ModerationService::new(
        store,
        policy,
        dispatcher,
        config.moderation.default_suspension_days,
    );

    let state = AppState {
        moderation: Arc::new(moderation),
        config: config.clone(),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and every dispatcher clone it held) is gone, so the worker
    // sees a closed queue and finishes what is left.
    if let Some(worker) = worker {
        let timeout = config.dispatch.shutdown_timeout();
        if worker.drain(timeout).await {
            tracing::info!("Pending side effects delivered");
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "moderation_api=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
}

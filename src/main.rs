// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NextGen Fit API Server
//!
//! Generates personalised weekly workout plans and keeps them in the
//! profile store and the device-local cache.

use nextgen_fit::{
    cache::{FileCache, LocalCache},
    config::{Config, ProfileStoreKind},
    db::{FirestoreDb, MemoryProfileStore, ProfileStore},
    services::{GeminiClient, PersistencePolicy, PlanGenerator},
    AppState,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        models = ?config.gemini_models,
        "Starting NextGen Fit API"
    );

    let db: Arc<dyn ProfileStore> = match config.profile_store {
        ProfileStoreKind::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        ProfileStoreKind::Memory => {
            tracing::warn!("Using in-memory profile store; data is lost on restart");
            Arc::new(MemoryProfileStore::new())
        }
    };

    let cache: Arc<dyn LocalCache> = Arc::new(FileCache::open(&config.local_cache_dir).await?);

    let backend = Arc::new(GeminiClient::new(
        config.gemini_base_url.clone(),
        config.gemini_api_key.clone(),
    ));
    let generator = PlanGenerator::new(
        backend,
        config.gemini_models.clone(),
        config.generation_timeout,
    );

    let shutdown = CancellationToken::new();

    // Build shared state
    let state = Arc::new(AppState {
        persistence_policy: PersistencePolicy {
            remote_writes: config.remote_write_policy,
            reconcile: config.reconcile_policy,
        },
        config: config.clone(),
        db,
        cache,
        generator,
        shutdown: shutdown.clone(),
    });

    // Build router
    let app = nextgen_fit::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;
    Ok(())
}

/// Wait for Ctrl-C or SIGTERM, then cancel in-flight work.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown requested, cancelling in-flight generations");
    shutdown.cancel();
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nextgen_fit=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}

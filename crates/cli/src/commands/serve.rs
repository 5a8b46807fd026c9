use std::sync::Arc;

use anyhow::Result;
use pixelpost_core::{AppConfig, RelayConfig, WorkerConfig};
use pixelpost_http::{create_router, start_delivery_worker, AppState};
use pixelpost_service::{
    DeliveryWorker, EnqueueService, EventLog, HickoryMxLookup, Relay, SmtpRelay, TrackingService,
};
use pixelpost_storage::StorageBackend;
use tokio::sync::watch;

pub(crate) async fn run(port: u16, host: String) -> Result<()> {
    let storage = match std::env::var("DATABASE_URL") {
        Ok(url) => Arc::new(StorageBackend::new_postgres(&url).await?),
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, queue is in-memory and lost on exit");
            Arc::new(StorageBackend::new_memory())
        },
    };
    tracing::info!(backend = storage.kind(), "Storage ready");

    let relay_config = RelayConfig::from_env()?;
    let worker_config = WorkerConfig::from_env();
    let app_config = AppConfig::from_env();
    tracing::info!(?relay_config, "Relay configured");

    let mx = Arc::new(
        HickoryMxLookup::new(worker_config.dns_timeout)
            .map_err(|e| anyhow::anyhow!("Failed to initialize DNS resolver: {e}"))?,
    );
    let relay: Arc<dyn Relay> = Arc::new(SmtpRelay::new(relay_config.clone()));
    let events = EventLog::new(worker_config.log_dir.clone());

    let worker = Arc::new(DeliveryWorker::new(
        Arc::clone(&storage),
        relay,
        mx,
        &relay_config,
        worker_config,
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = start_delivery_worker(worker, shutdown_rx);

    let state = Arc::new(AppState {
        storage: Arc::clone(&storage),
        enqueue_service: Arc::new(EnqueueService::new(Arc::clone(&storage), app_config)),
        tracking_service: Arc::new(TrackingService::new(storage, events)),
    });

    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("HTTP server stopped, waiting for delivery worker");
    if shutdown_tx.send(true).is_err() {
        tracing::debug!("delivery worker already gone before shutdown signal");
    }
    if let Err(e) = worker_handle.await {
        tracing::error!("Delivery worker task failed: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;
    let ctrl_c = async {
        signal::ctrl_c().await.ok();
    };
    #[cfg(unix)]
    let term = async {
        if let Ok(mut s) = signal::unix::signal(signal::unix::SignalKind::terminate()) {
            s.recv().await;
        }
    };
    #[cfg(not(unix))]
    let term = std::future::pending::<()>();
    tokio::select! { () = ctrl_c => {}, () = term => {} }
}

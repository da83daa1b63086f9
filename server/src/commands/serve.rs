use color_eyre::Result;
use tokio::sync::watch;
use tracing::info;

use crate::{
    http_server::{routes, run_server},
    jobs::{worker::job_worker, Jobs},
    AppState,
};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received terminate signal, shutting down"),
    }
}

pub(crate) async fn serve() -> Result<()> {
    let app_state = AppState::from_env().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    info!("Spawning Tasks");
    let mut server = tokio::spawn({
        let app_state = app_state.clone();
        let shutdown = shutdown_rx.clone();
        async move {
            let router = routes::make_router().with_state(app_state.clone());
            run_server(router, &app_state.app, shutdown).await
        }
    });
    let worker = tokio::spawn(job_worker(app_state.clone(), Jobs, shutdown_rx));
    info!("Tasks Spawned");

    // Either a signal or the server stopping on its own ends the worker too.
    let finished_server = tokio::select! {
        () = shutdown_signal() => None,
        result = &mut server => Some(result),
    };
    let _ = shutdown_tx.send(true);

    let server_result = match finished_server {
        Some(result) => result,
        None => server.await,
    };
    let worker_result = worker.await;

    server_result??;
    worker_result??;

    app_state.db().close().await;
    info!("Main Returning");

    Ok(())
}

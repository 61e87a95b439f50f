//! Process supervision (spec.md §4.G, §5): brings components up in a fixed
//! order, listens for termination/reload signals, and drives a cooperative
//! shutdown. Grounded in the teacher's `AppLifecycleCoordinator` — a struct
//! that owns its collaborators and sequences their startup through plain
//! `execute().await?` calls rather than a generic plugin system.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::deps::AppDeps;
use crate::ipc;
use crate::monitor::ClipboardMonitor;

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("device registration failed: {0}")]
    Device(String),
    #[error("monitor task failed: {0}")]
    Monitor(String),
    #[error("ipc server failed: {0}")]
    Ipc(String),
}

/// Brings up the local device record, the monitor and the IPC server
/// against an already constructed [`AppDeps`] (the store and adapter are
/// constructed by the caller, since they are needed before the PID lock
/// decision can even be made), and runs until a termination signal or the
/// `shutdown` IPC command fires. PID-file and daemonization are
/// process-lifecycle concerns handled by the binary entry point before this
/// function is called, not by the supervisor itself (see DESIGN.md's "Where
/// the PID lock lives" note).
pub async fn run(deps: AppDeps) -> Result<(), SupervisorError> {
    let device = deps
        .devices
        .get_or_create(deps.device_id, &deps.config.device_name)
        .await
        .map_err(|e| SupervisorError::Device(e.to_string()))?;
    info!(device_id = %device.device_id, device_name = %device.device_name, "local device registered");

    let shutdown = CancellationToken::new();

    let monitor = Arc::new(ClipboardMonitor::new(deps.clone()));
    let monitor_handle = tokio::spawn(monitor.run(shutdown.clone()));
    let ipc_handle = tokio::spawn(ipc::serve(deps.clone(), shutdown.clone()));

    // A fatal monitor error must also unblock the IPC acceptor and the
    // signal wait below, so it gets its own watcher rather than being
    // raced directly against `wait_for_signal` — both converge on the same
    // `shutdown` token, which tolerates being cancelled more than once.
    let monitor_watch = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let result = monitor_handle.await;
            shutdown.cancel();
            result
        })
    };

    // Races the OS signal wait against the monitor's own watcher: a fatal
    // monitor error must unblock shutdown here too, not just leave the
    // process sitting with both the monitor and the IPC server already
    // stopped but nothing to wake this function up.
    tokio::select! {
        _ = wait_for_signal() => info!("shutdown signal received"),
        _ = shutdown.cancelled() => info!("shutting down after a component failure"),
    }
    shutdown.cancel();

    let monitor_result = monitor_watch.await.map_err(|e| SupervisorError::Monitor(e.to_string()))?;
    match monitor_result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "clipboard monitor exited with an error"),
        Err(join_err) => warn!(error = %join_err, "clipboard monitor task panicked"),
    }

    ipc_handle
        .await
        .map_err(|e| SupervisorError::Ipc(e.to_string()))?
        .map_err(|e| SupervisorError::Ipc(e.to_string()))?;

    if let Err(e) = deps.store.flush(deps.config.storage.keep_items).await {
        warn!(error = %e, "final flush before shutdown failed");
    }

    info!("supervisor shut down cleanly");
    Ok(())
}

/// Listens for TERM/INT (graceful shutdown) and HUP (reload) on Unix, or
/// Ctrl-C on Windows. Returns once a shutdown-worthy signal arrives.
#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
    let mut int = signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");
    let mut hup = signal(SignalKind::hangup()).expect("failed to register SIGHUP handler");

    loop {
        tokio::select! {
            _ = term.recv() => {
                info!("received SIGTERM");
                return;
            }
            _ = int.recv() => {
                info!("received SIGINT");
                return;
            }
            _ = hup.recv() => {
                // AppConfig is immutable to the core once loaded (see
                // uc-core::config's doc comment) and the logging backend
                // has no live reload handle wired up, so there is nothing
                // reloadable yet; HUP is acknowledged but otherwise a no-op.
                warn!("received SIGHUP: no reloadable state, continuing to run");
            }
        }
    }
}

#[cfg(windows)]
async fn wait_for_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl-C");
    }
}

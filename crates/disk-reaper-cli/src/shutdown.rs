use anyhow::Context;
use std::future;
use std::io;
use std::thread;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Block until Enter is pressed, CTRL+C or SIGTERM arrives.
///
/// A closed stdin (running without a terminal) is not a stop request; the
/// signals still are.
pub fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Error starting signal listener")?;

    let enter = watch_stdin();
    runtime.block_on(async {
        tokio::select! {
            _ = enter_pressed(enter) => info!("Received Enter"),
            _ = ctrl_c() => info!("Received CTRL+C"),
            _ = terminate() => info!("Received SIGTERM"),
        }
    });
    Ok(())
}

fn watch_stdin() -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();
    thread::spawn(move || {
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => info!("stdin closed, waiting for a signal to stop"),
            Ok(_) => {
                let _ = tx.send(());
            }
            Err(e) => warn!("Error reading stdin: {}", e),
        }
    });
    rx
}

async fn enter_pressed(rx: oneshot::Receiver<()>) {
    if rx.await.is_err() {
        future::pending::<()>().await;
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for CTRL+C: {}", e);
        future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Could not listen for SIGTERM: {}", e);
            future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    future::pending::<()>().await;
}

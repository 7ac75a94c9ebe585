//! Process-wide shutdown state.
//!
//! `SHUTDOWN` is raised by Ctrl+C. When a watch loop has registered its
//! wake-up channel the handler only signals it, so the loop can destroy its
//! session before exiting; otherwise the process exits right away.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use tokio::sync::mpsc::UnboundedSender;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Wake-up channel of the running watch loop
static SHUTDOWN_TX: OnceLock<UnboundedSender<()>> = OnceLock::new();

/// Install the global Ctrl+C handler. Call once at program start.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);
        match SHUTDOWN_TX.get() {
            Some(tx) => {
                let _ = tx.send(());
            }
            None => std::process::exit(130),
        }
    })
    .context("failed to install Ctrl+C handler")
}

/// Route the next Ctrl+C to `tx` instead of exiting.
pub fn register_shutdown(tx: UnboundedSender<()>) {
    let _ = SHUTDOWN_TX.set(tx);
}

pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

//! Host shutdown tracking.
//!
//! The Ctrl+C / SIGTERM handler never touches worker processes itself. Once
//! watch mode has registered its channel, the handler only flags shutdown and
//! wakes the event loop, which signals the live worker before `main` returns.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;

/// Shutdown has been requested (Ctrl+C or SIGTERM received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for the watch loop
static SHUTDOWN_TX: OnceLock<UnboundedSender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// The handler behavior depends on whether a loop has been registered:
/// - Before `register_shutdown()`: nothing to clean up, exit immediately
/// - After `register_shutdown()`: set SHUTDOWN flag and wake the loop
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        match SHUTDOWN_TX.get() {
            Some(tx) if tx.send(()).is_ok() => crate::log!("watch"; "shutting down..."),
            // Loop not running (yet or anymore): no worker can be alive
            _ => std::process::exit(0),
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the watch loop for graceful shutdown
///
/// Returns `false` if a loop was already registered.
pub fn register_shutdown(tx: UnboundedSender<()>) -> bool {
    register_in(&SHUTDOWN_TX, tx)
}

fn register_in(slot: &OnceLock<UnboundedSender<()>>, tx: UnboundedSender<()>) -> bool {
    slot.set(tx).is_ok()
}

/// Whether a watch loop has registered for shutdown in this process
#[cfg(test)]
pub(crate) fn is_registered() -> bool {
    SHUTDOWN_TX.get().is_some()
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

//! Graceful shutdown via atomic flag and signal handlers

use std::sync::atomic::{AtomicBool, Ordering};

static FLAG: AtomicBool = AtomicBool::new(false);

/// Check if shutdown was requested.
pub fn is_shutdown_requested() -> bool {
    FLAG.load(Ordering::Relaxed)
}

/// Request shutdown (also usable from tests).
pub fn request_shutdown() {
    FLAG.store(true, Ordering::Relaxed);
}

/// Register SIGINT/SIGTERM handlers.
///
/// First signal sets the flag so the job can stop between datasets; a second
/// signal force-exits with the conventional 130.
pub fn install_signal_handlers() {
    // SAFETY: AtomicBool::swap and process::exit are async-signal-safe
    unsafe {
        for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
            signal_hook::low_level::register(signal, || {
                if FLAG.swap(true, Ordering::Relaxed) {
                    std::process::exit(130);
                }
            })
            .expect("failed to register signal handler");
        }
    }
}

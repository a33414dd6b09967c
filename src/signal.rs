//! Ctrl+C handling.
//!
//! A single `AtomicBool` is shared by the walker, every hashing task and the
//! finder. Setting it stops the walk, turns not-yet-started hashes into
//! cancelled results and makes the CLI exit with 130.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The flag to hand to [`FinderConfig::with_shutdown_flag`](crate::duplicates::FinderConfig::with_shutdown_flag).
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C hook, or reuse it if already installed.
///
/// `ctrlc` allows one hook per process. Repeated calls (several `run_app`
/// invocations in one test binary) get the same handler with its flag
/// cleared. If the hook cannot be registered at all, an unhooked handler
/// is returned; it still honours [`ShutdownHandler::request_shutdown`].
#[must_use]
pub fn install_handler() -> ShutdownHandler {
    let handler = GLOBAL_HANDLER.get_or_init(|| {
        let handler = ShutdownHandler::new();
        let flag = handler.get_flag();
        let hooked = ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\nInterrupted. Finishing in-flight work...");
            let _ = stderr.flush();
        });
        if let Err(e) = hooked {
            log::debug!("Ctrl+C hook unavailable, using unhooked handler: {}", e);
        }
        handler
    });
    handler.reset();
    handler.clone()
}

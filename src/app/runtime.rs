//! Lifecycle of the background threads owned by the application.

use log::warn;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Join handles for the simulation and input threads.
///
/// The simulation thread watches `SimControl`'s shutdown flag; the input thread watches
/// `input_shutdown`. Both must be signalled before [`stop`](Self::stop) joins them.
#[derive(Debug, Default)]
pub struct BackgroundThreads {
    pub simulation: Option<JoinHandle<()>>,
    pub input: Option<JoinHandle<()>>,
    pub input_shutdown: Arc<AtomicBool>,
}

impl BackgroundThreads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the input thread and join everything that was started.
    pub fn stop(&mut self) {
        self.input_shutdown.store(true, Ordering::SeqCst);
        for (name, handle) in [
            ("simulation", self.simulation.take()),
            ("input", self.input.take()),
        ] {
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    warn!("{name} thread panicked");
                }
            }
        }
    }
}

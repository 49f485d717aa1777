//! Background producer: a free-running clock simulation.
//!
//! This stands in for the circuit simulator. It toggles a single clock signal at a configurable
//! rate, keeps a bounded history of the signal for the waveform display, and tells the repaint
//! coordinator the view is stale after every tick. It performs no circuit evaluation.

use crate::error::{PacerError, Result};
use crate::render::DirtyNotifier;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Slowest supported tick rate.
pub const MIN_TICK_HZ: u32 = 1;
/// Fastest supported tick rate.
pub const MAX_TICK_HZ: u32 = 10_000;
/// Number of clock samples retained for display.
pub const WAVEFORM_CAPACITY: usize = 512;

/// Longest single sleep in the tick loop, so shutdown and rate changes are noticed promptly.
const MAX_SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Published state of the simulation, read by the drawing loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimSnapshot {
    /// Clock half-periods simulated so far
    pub ticks: u64,
    /// Current clock level
    pub clock_high: bool,
    /// Most recent clock levels, oldest first
    pub waveform: VecDeque<bool>,
}

/// Knobs shared between the simulation thread and the UI.
#[derive(Debug)]
pub struct SimControl {
    tick_hz: AtomicU32,
    paused: AtomicBool,
    shutdown: AtomicBool,
}

impl SimControl {
    pub fn new(tick_hz: u32) -> Self {
        Self {
            tick_hz: AtomicU32::new(clamp_hz(tick_hz)),
            paused: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn tick_hz(&self) -> u32 {
        self.tick_hz.load(Ordering::Relaxed)
    }

    /// Set the tick rate, clamped to the supported range. Returns the rate applied.
    pub fn set_tick_hz(&self, hz: u32) -> u32 {
        let hz = clamp_hz(hz);
        self.tick_hz.store(hz, Ordering::Relaxed);
        hz
    }

    /// Double the tick rate.
    pub fn faster(&self) -> u32 {
        self.set_tick_hz(self.tick_hz().saturating_mul(2))
    }

    /// Halve the tick rate.
    pub fn slower(&self) -> u32 {
        self.set_tick_hz(self.tick_hz() / 2)
    }

    /// Flip the paused flag, returning the new value.
    pub fn toggle_pause(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

fn clamp_hz(hz: u32) -> u32 {
    hz.clamp(MIN_TICK_HZ, MAX_TICK_HZ)
}

/// The simulation itself. Owns the producer side of the repaint coordinator.
#[derive(Debug)]
pub struct ClockSimulation {
    snapshot: Arc<RwLock<SimSnapshot>>,
    control: Arc<SimControl>,
    notifier: DirtyNotifier,
}

impl ClockSimulation {
    pub fn new(control: Arc<SimControl>, notifier: DirtyNotifier) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(SimSnapshot::default())),
            control,
            notifier,
        }
    }

    /// Shared handle to the published state.
    pub fn snapshot_handle(&self) -> Arc<RwLock<SimSnapshot>> {
        Arc::clone(&self.snapshot)
    }

    /// Advance one half-period and mark the view dirty.
    pub fn step(&self) {
        {
            let mut snapshot = self.snapshot.write();
            snapshot.ticks += 1;
            snapshot.clock_high = !snapshot.clock_high;
            let level = snapshot.clock_high;
            if snapshot.waveform.len() == WAVEFORM_CAPACITY {
                snapshot.waveform.pop_front();
            }
            snapshot.waveform.push_back(level);
        }
        self.notifier.notify_dirty();
    }

    /// Run the tick loop on a dedicated thread until [`SimControl::request_shutdown`].
    pub fn spawn(self) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("clock-sim".to_string())
            .spawn(move || self.run())
            .map_err(|e| PacerError::io("Failed to spawn simulation thread", e))
    }

    fn run(self) {
        info!(
            "simulation thread started at {} Hz",
            self.control.tick_hz()
        );
        let mut next_tick = Instant::now();
        while !self.control.is_shutdown() {
            if self.control.is_paused() {
                thread::sleep(MAX_SLEEP_SLICE);
                next_tick = Instant::now();
                continue;
            }

            let now = Instant::now();
            if now < next_tick {
                thread::sleep((next_tick - now).min(MAX_SLEEP_SLICE));
                continue;
            }

            self.step();
            let period = Duration::from_secs_f64(1.0 / f64::from(self.control.tick_hz()));
            next_tick += period;
            // Fell far behind (e.g. rate was lowered or the machine stalled): resync.
            if next_tick + period < now {
                next_tick = now + period;
            }
        }
        debug!("simulation thread stopped");
    }
}

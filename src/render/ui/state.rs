//! Canvas state for rendering
//!
//! `CanvasView` holds everything a single redraw needs. It is owned by the drawing loop and
//! refreshed from the simulation snapshot immediately before each render.

use crate::render::RepaintStats;
use crate::sim::SimSnapshot;
use std::time::{Duration, Instant};

/// Glyph drawn for a high clock sample.
pub const HIGH_GLYPH: char = '▀';
/// Glyph drawn for a low clock sample.
pub const LOW_GLYPH: char = '▄';

/// Smoothing factor for the observed redraw rate.
const RATE_SMOOTHING: f64 = 0.2;

/// What the canvas shows on the next redraw.
#[derive(Debug, Clone)]
pub struct CanvasView {
    /// Latest simulation state
    pub snapshot: SimSnapshot,

    /// Coordinator counters at the time of the redraw
    pub stats: RepaintStats,

    /// Simulation tick rate currently requested
    pub tick_hz: u32,

    /// Whether the simulation is paused
    pub paused: bool,

    /// Mean repaint interval of the configured rotation
    pub nominal_interval: Duration,

    /// Frames drawn by this view
    pub frames_drawn: u64,

    /// Smoothed observed redraws per second
    pub redraw_rate: f64,

    last_frame_at: Option<Instant>,

    /// Canvas dimensions
    pub width: u16,
    pub height: u16,
}

impl CanvasView {
    pub fn new(width: u16, height: u16, nominal_interval: Duration) -> Self {
        Self {
            snapshot: SimSnapshot::default(),
            stats: RepaintStats::default(),
            tick_hz: 0,
            paused: false,
            nominal_interval,
            frames_drawn: 0,
            redraw_rate: 0.0,
            last_frame_at: None,
            width,
            height,
        }
    }

    /// Refresh the view from producer-side state.
    pub fn update(&mut self, snapshot: SimSnapshot, stats: RepaintStats, tick_hz: u32, paused: bool) {
        self.snapshot = snapshot;
        self.stats = stats;
        self.tick_hz = tick_hz;
        self.paused = paused;
    }

    /// Account for a frame about to be drawn at `now`.
    pub fn record_frame(&mut self, now: Instant) {
        if let Some(previous) = self.last_frame_at {
            let gap = now.saturating_duration_since(previous).as_secs_f64();
            if gap > 0.0 {
                let instantaneous = 1.0 / gap;
                self.redraw_rate = if self.frames_drawn <= 1 {
                    instantaneous
                } else {
                    self.redraw_rate + RATE_SMOOTHING * (instantaneous - self.redraw_rate)
                };
            }
        }
        self.last_frame_at = Some(now);
        self.frames_drawn += 1;
    }

    /// Update canvas dimensions. Returns true if they changed.
    pub fn update_terminal_size(&mut self, width: u16, height: u16) -> bool {
        let changed = self.width != width || self.height != height;
        if changed {
            self.width = width;
            self.height = height;
        }
        changed
    }

    /// Render the most recent `columns` clock samples, newest on the right.
    pub fn waveform_line(&self, columns: usize) -> String {
        let waveform = &self.snapshot.waveform;
        let skip = waveform.len().saturating_sub(columns);
        waveform
            .iter()
            .skip(skip)
            .map(|&high| if high { HIGH_GLYPH } else { LOW_GLYPH })
            .collect()
    }

    /// Fraction of notifications that did not cause their own redraw.
    pub fn coalescing_ratio(&self) -> f64 {
        if self.stats.dirty_notifications == 0 {
            return 0.0;
        }
        self.stats.coalesced_notifications as f64 / self.stats.dirty_notifications as f64
    }

    /// One-line summary for the status bar.
    pub fn format_status_line(&self) -> String {
        let state = if self.paused { "paused" } else { "running" };
        format!(
            "{} @ {} Hz | interval ~{}ms | {:.1} fps | q quit, +/- rate, space pause",
            state,
            self.tick_hz,
            self.nominal_interval.as_millis(),
            self.redraw_rate
        )
    }
}

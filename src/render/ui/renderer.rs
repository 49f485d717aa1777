//! Canvas renderer trait
//!
//! This module defines the `CanvasRenderer` trait for drawing a `CanvasView` and managing
//! lifecycle hooks such as initialization and cleanup.

use crate::error::Result;
use crate::render::ui::state::CanvasView;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Core trait for canvas rendering
pub trait CanvasRenderer {
    /// Draw the current view
    ///
    /// This method should:
    /// - Redraw the waveform area
    /// - Update the statistics panel
    /// - Update the status line
    fn render(&mut self, view: &CanvasView) -> Result<()>;

    /// Initialize the drawing surface
    ///
    /// This method should:
    /// - Set up raw mode
    /// - Enter the alternate screen
    /// - Hide cursor
    fn initialize(&mut self) -> Result<()>;

    /// Clean up and restore terminal state
    fn cleanup(&mut self) -> Result<()>;

    /// Get current surface dimensions
    fn get_terminal_size(&self) -> Result<(u16, u16)>; // (width, height)
}

/// Renderer with no output, used for headless runs.
///
/// Frames are counted through a shared counter so the count stays observable after the renderer
/// has been boxed and handed to the application.
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    frames: Arc<AtomicU64>,
    size: (u16, u16),
}

impl HeadlessRenderer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            size: (width, height),
        }
    }

    /// Shared handle to the frame counter.
    pub fn frame_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.frames)
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl CanvasRenderer for HeadlessRenderer {
    fn render(&mut self, _view: &CanvasView) -> Result<()> {
        self.frames.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        Ok(self.size)
    }
}

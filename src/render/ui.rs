//! Canvas rendering components.
//!
//! This module hosts the terminal canvas implementation along with the view state it draws and
//! its styling.

pub mod renderer;
pub mod state;
pub mod terminal;
pub mod theme;

pub use renderer::{CanvasRenderer, HeadlessRenderer};
pub use state::CanvasView;
pub use terminal::TerminalCanvas;
pub use theme::ColorTheme;

#[cfg(test)]
pub use renderer::tests::MockCanvasRenderer;

pub use ratatui::style::{Color, Style};

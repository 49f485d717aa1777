//! Rendering subsystem.
//!
//! The [`coordinator`] decides *when* the canvas is redrawn, [`protocol`] carries that decision to
//! the drawing loop, and [`ui`] does the drawing.

pub mod coordinator;
pub mod protocol;
pub mod ui;

pub use coordinator::{
    DirtyNotifier, RedrawCompleter, RepaintCoordinator, RepaintStats, RepaintTarget,
};
pub use protocol::{ChannelTarget, RepaintRequest};

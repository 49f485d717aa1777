//! # canvas-pacer - Rate-Limited Repaint Coordination
//!
//! Bridges a producer that changes state at arbitrary rates (a simulation thread) and a consumer
//! that draws that state (a UI thread). Producers say "the view is dirty" as often as they like;
//! the consumer is asked to redraw at most once per interval and never while a previous redraw
//! is still in flight, and no dirty notification is ever lost.
//!
//! ## Architecture
//!
//! - [`render::coordinator`] - the repaint coordinator and its role handles
//! - [`pacing`] - rotating repaint intervals
//! - [`clock`] and [`timer`] - time sources and one-shot deferred triggers
//! - [`sim`] - a background clock simulation used as the producer
//! - [`render::ui`] - the terminal canvas that consumes redraw requests
//! - [`input`] - terminal key handling
//! - [`app`] - wires everything onto a tokio event loop
//! - [`config`] and [`error`] - configuration and error types
//!
//! ## Example
//!
//! ```
//! use canvas_pacer::{IntervalRotation, RepaintCoordinator};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let redraws = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&redraws);
//! let coordinator = RepaintCoordinator::with_rotation(
//!     Arc::new(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     }),
//!     IntervalRotation::fixed(Duration::from_millis(50)),
//! )
//! .unwrap();
//!
//! let notifier = coordinator.notifier();
//! for _ in 0..100 {
//!     notifier.notify_dirty();
//! }
//! // One redraw in flight; the other 99 notifications were coalesced into it.
//! assert_eq!(redraws.load(Ordering::SeqCst), 1);
//! ```

// Core modules
pub mod clock;
pub mod config;
pub mod error;
pub mod pacing;
pub mod timer;

pub mod input;
pub mod render;
pub mod sim;

pub mod app;

pub use error::{PacerError, Result};

pub use app::{Application, RunSummary};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::PacerConfig;
pub use pacing::IntervalRotation;
pub use render::{DirtyNotifier, RedrawCompleter, RepaintCoordinator, RepaintStats, RepaintTarget};
pub use timer::{ManualTimer, ThreadTimer, Timer, TokioTimer};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

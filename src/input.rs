//! Terminal input.
//!
//! Keys are polled on a blocking thread and translated into [`InputAction`]s that the drawing
//! loop consumes. Input handlers are producers too: anything that changes what is shown marks
//! the canvas dirty rather than drawing directly.

pub mod service;

pub use service::{map_event, map_key, spawn_input_thread, InputAction, InputService};

//! Key polling and key-to-action mapping.

use crate::error::{PacerError, Result};
use log::error;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// High-level actions understood by the application loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    /// Double the simulation tick rate
    FasterTicks,
    /// Halve the simulation tick rate
    SlowerTicks,
    TogglePause,
    Resize {
        width: u16,
        height: u16,
    },
    NoAction,
}

/// Translate a key press into an action.
pub fn map_key(key_event: KeyEvent) -> InputAction {
    if key_event.kind != KeyEventKind::Press {
        return InputAction::NoAction;
    }

    match (key_event.code, key_event.modifiers) {
        (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            InputAction::Quit
        }
        (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => InputAction::Quit,
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) | (KeyCode::Up, _) => {
            InputAction::FasterTicks
        }
        (KeyCode::Char('-'), _) | (KeyCode::Down, _) => InputAction::SlowerTicks,
        (KeyCode::Char(' '), _) | (KeyCode::Char('p'), _) => InputAction::TogglePause,
        _ => InputAction::NoAction,
    }
}

/// Translate any terminal event into an action.
pub fn map_event(event: Event) -> InputAction {
    match event {
        Event::Key(key_event) => map_key(key_event),
        Event::Resize(width, height) => InputAction::Resize { width, height },
        _ => InputAction::NoAction,
    }
}

/// Polls crossterm for events.
#[derive(Debug, Default)]
pub struct InputService;

impl InputService {
    pub fn new() -> Self {
        Self
    }

    /// Wait up to `timeout` for the next meaningful action.
    pub fn poll_action(&mut self, timeout: Duration) -> Result<Option<InputAction>> {
        if !event::poll(timeout).map_err(|e| PacerError::io("Failed to poll terminal", e))? {
            return Ok(None);
        }
        let event = event::read().map_err(|e| PacerError::io("Failed to read terminal event", e))?;
        match map_event(event) {
            InputAction::NoAction => Ok(None),
            action => Ok(Some(action)),
        }
    }
}

/// Spawn a blocking thread that polls for terminal events and forwards actions to the loop.
pub fn spawn_input_thread(
    tx: UnboundedSender<InputAction>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || {
            let mut service = InputService::new();
            while !shutdown.load(Ordering::SeqCst) {
                match service.poll_action(poll_interval) {
                    Ok(Some(action)) => {
                        if tx.send(action).is_err() {
                            break;
                        }
                    }
                    Ok(None) => continue,
                    Err(err) => {
                        error!("Input thread error: {}", err);
                        break;
                    }
                }
            }
        })
        .map_err(|e| PacerError::io("Failed to spawn input thread", e))
}

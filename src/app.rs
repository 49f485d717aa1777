//! Application orchestration layer
//!
//! Wires the three roles together:
//!
//! - the simulation thread is the producer and owns a `DirtyNotifier`;
//! - the repaint coordinator decides when to redraw and posts `RepaintRequest`s onto a channel;
//! - this loop is the consumer: it drains that channel, draws, and reports completion.
//!
//! Input actions arrive on a second channel and are handled on the same loop, so drawing and
//! input handling never race each other.

pub mod runtime;

use crate::clock::SystemClock;
use crate::config::PacerConfig;
use crate::error::{PacerError, Result};
use crate::input::{spawn_input_thread, InputAction};
use crate::render::ui::{CanvasRenderer, CanvasView};
use crate::render::{
    ChannelTarget, RedrawCompleter, RepaintCoordinator, RepaintRequest, RepaintStats,
};
use crate::sim::{ClockSimulation, SimControl, SimSnapshot};
use crate::timer::{ThreadTimer, Timer, TokioTimer};
use log::{debug, info, trace};
use parking_lot::RwLock;
use runtime::BackgroundThreads;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Totals reported when the loop exits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub elapsed: Duration,
    pub ticks: u64,
    pub frames: u64,
    pub stats: RepaintStats,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed.as_secs_f64();
        let fps = if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        };
        write!(
            f,
            "{} frames in {:.2}s ({:.1} fps); {} ticks, {} dirty notifications, {} coalesced, {} deferred redraws",
            self.frames,
            secs,
            fps,
            self.ticks,
            self.stats.dirty_notifications,
            self.stats.coalesced_notifications,
            self.stats.deferred_redraws
        )
    }
}

/// Application orchestrator
pub struct Application {
    config: PacerConfig,
    renderer: Box<dyn CanvasRenderer>,
    coordinator: RepaintCoordinator,
    completer: RedrawCompleter,
    repaint_rx: UnboundedReceiver<RepaintRequest>,
    control: Arc<SimControl>,
    simulation: Option<ClockSimulation>,
    snapshot: Arc<RwLock<SimSnapshot>>,
    view: CanvasView,
}

impl Application {
    /// Create application by initializing and wiring components together
    pub fn new(config: PacerConfig, renderer: Box<dyn CanvasRenderer>) -> Result<Self> {
        config.validate()?;
        let rotation = config.rotation()?;
        let nominal = rotation.nominal();

        let (repaint_tx, repaint_rx) = mpsc::unbounded_channel();
        let coordinator = RepaintCoordinator::with_parts(
            Arc::new(ChannelTarget::new(repaint_tx)),
            rotation,
            Arc::new(SystemClock),
            repaint_timer()?,
        );
        let completer = coordinator.completer();

        let control = Arc::new(SimControl::new(config.tick_hz));
        let simulation = ClockSimulation::new(Arc::clone(&control), coordinator.notifier());
        let snapshot = simulation.snapshot_handle();

        let (width, height) = renderer.get_terminal_size()?;
        let view = CanvasView::new(width, height, nominal);

        Ok(Self {
            config,
            renderer,
            coordinator,
            completer,
            repaint_rx,
            control,
            simulation: Some(simulation),
            snapshot,
            view,
        })
    }

    pub fn coordinator(&self) -> &RepaintCoordinator {
        &self.coordinator
    }

    pub fn control(&self) -> Arc<SimControl> {
        Arc::clone(&self.control)
    }

    /// Run interactively until the user quits.
    pub async fn run(&mut self) -> Result<RunSummary> {
        self.drive(true, None).await
    }

    /// Run without reading input for a fixed duration.
    pub async fn run_for(&mut self, duration: Duration) -> Result<RunSummary> {
        self.drive(false, Some(duration)).await
    }

    async fn drive(&mut self, interactive: bool, duration: Option<Duration>) -> Result<RunSummary> {
        let started = Instant::now();
        self.renderer.initialize()?;

        let mut threads = BackgroundThreads::new();
        let outcome = self.start_and_loop(&mut threads, interactive, duration).await;

        self.control.request_shutdown();
        threads.stop();
        let cleanup = self.renderer.cleanup();
        outcome?;
        cleanup?;

        let summary = RunSummary {
            elapsed: started.elapsed(),
            ticks: self.snapshot.read().ticks,
            frames: self.view.frames_drawn,
            stats: self.coordinator.stats(),
        };
        info!("run finished: {summary}");
        Ok(summary)
    }

    async fn start_and_loop(
        &mut self,
        threads: &mut BackgroundThreads,
        interactive: bool,
        duration: Option<Duration>,
    ) -> Result<()> {
        let simulation = self
            .simulation
            .take()
            .ok_or_else(|| PacerError::other("application has already been run"))?;

        let deadline = duration.map(|d| tokio::time::Instant::now() + d);

        let mut input_rx = if interactive {
            let (input_tx, input_rx) = mpsc::unbounded_channel();
            threads.input = Some(spawn_input_thread(
                input_tx,
                Arc::clone(&threads.input_shutdown),
                self.config.input_poll_interval(),
            )?);
            Some(input_rx)
        } else {
            None
        };

        threads.simulation = Some(simulation.spawn()?);

        // First frame regardless of whether the simulation has ticked yet.
        self.coordinator.notify_dirty();

        self.event_loop(&mut input_rx, deadline).await
    }

    async fn event_loop(
        &mut self,
        input_rx: &mut Option<UnboundedReceiver<InputAction>>,
        deadline: Option<tokio::time::Instant>,
    ) -> Result<()> {
        let far_future = tokio::time::Instant::now() + Duration::from_secs(86_400 * 365);
        loop {
            tokio::select! {
                request = self.repaint_rx.recv() => match request {
                    Some(request) => self.redraw(request)?,
                    None => break,
                },
                action = next_input(input_rx) => match action {
                    Some(action) => {
                        if !self.handle_action(action) {
                            break;
                        }
                    }
                    None => {
                        debug!("input channel closed");
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or(far_future)), if deadline.is_some() => break,
            }
        }
        Ok(())
    }

    /// Draw one frame and report completion to the coordinator.
    fn redraw(&mut self, request: RepaintRequest) -> Result<()> {
        trace!("drawing frame for request {}", request.request_id);
        let snapshot = self.snapshot.read().clone();
        self.view.update(
            snapshot,
            self.coordinator.stats(),
            self.control.tick_hz(),
            self.control.is_paused(),
        );
        self.view.record_frame(Instant::now());
        let rendered = self.renderer.render(&self.view);
        // Completion is owed even when drawing failed, or the coordinator would stall.
        self.completer.on_redraw_completed();
        rendered
    }

    /// Apply an input action. Returns false when the loop should exit.
    fn handle_action(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::Quit => return false,
            InputAction::FasterTicks => {
                let hz = self.control.faster();
                info!("tick rate now {hz} Hz");
            }
            InputAction::SlowerTicks => {
                let hz = self.control.slower();
                info!("tick rate now {hz} Hz");
            }
            InputAction::TogglePause => {
                let paused = self.control.toggle_pause();
                info!("simulation {}", if paused { "paused" } else { "resumed" });
            }
            InputAction::Resize { width, height } => {
                if !self.view.update_terminal_size(width, height) {
                    return true;
                }
            }
            InputAction::NoAction => return true,
        }
        self.coordinator.notify_dirty();
        true
    }
}

/// Deferred repaints sleep on the surrounding tokio runtime; outside one they get a timer thread.
fn repaint_timer() -> Result<Arc<dyn Timer>> {
    match TokioTimer::current() {
        Ok(timer) => {
            debug!("deferred repaints scheduled on the tokio runtime");
            Ok(Arc::new(timer))
        }
        Err(_) => {
            debug!("no tokio runtime, deferred repaints use a timer thread");
            Ok(Arc::new(ThreadTimer::new("repaint-timer")?))
        }
    }
}

async fn next_input(rx: &mut Option<UnboundedReceiver<InputAction>>) -> Option<InputAction> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ui::MockCanvasRenderer;

    fn app() -> Application {
        let config = PacerConfig::default().with_fixed_interval(20).with_tick_hz(500);
        Application::new(config, Box::new(MockCanvasRenderer::new())).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = PacerConfig {
            intervals_ms: Vec::new(),
            ..PacerConfig::default()
        };
        let result = Application::new(config, Box::new(MockCanvasRenderer::new()));
        assert!(matches!(result, Err(PacerError::Config { .. })));
    }

    #[test]
    fn test_handle_action_adjusts_simulation() {
        let mut app = app();
        let control = app.control();

        assert!(app.handle_action(InputAction::FasterTicks));
        assert_eq!(control.tick_hz(), 1000);
        assert!(app.handle_action(InputAction::SlowerTicks));
        assert_eq!(control.tick_hz(), 500);
        assert!(app.handle_action(InputAction::TogglePause));
        assert!(control.is_paused());
        assert!(!app.handle_action(InputAction::Quit));

        // Each state change marked the canvas dirty.
        assert_eq!(app.coordinator().dirty_epoch(), 3);
    }

    #[test]
    fn test_rate_actions_apply_with_logging_disabled() {
        log::set_max_level(log::LevelFilter::Off);
        let mut app = app();
        let control = app.control();

        assert!(app.handle_action(InputAction::FasterTicks));
        assert_eq!(control.tick_hz(), 1000);
        assert!(app.handle_action(InputAction::FasterTicks));
        assert_eq!(control.tick_hz(), 2000);
        assert!(app.handle_action(InputAction::SlowerTicks));
        assert!(app.handle_action(InputAction::SlowerTicks));
        assert!(app.handle_action(InputAction::SlowerTicks));
        assert_eq!(control.tick_hz(), 250);
    }

    #[test]
    fn test_resize_only_dirties_on_change() {
        let mut app = app();
        assert!(app.handle_action(InputAction::Resize {
            width: 80,
            height: 24
        }));
        assert_eq!(app.coordinator().dirty_epoch(), 0);

        assert!(app.handle_action(InputAction::Resize {
            width: 120,
            height: 40
        }));
        assert_eq!(app.coordinator().dirty_epoch(), 1);
    }

    #[test]
    fn test_redraw_always_completes() {
        let mut renderer = MockCanvasRenderer::new();
        renderer.fail_renders = true;
        let mut app = Application::new(PacerConfig::default(), Box::new(renderer)).unwrap();

        app.coordinator().notify_dirty();
        assert!(!app.coordinator().is_idle());
        let request = app.repaint_rx.try_recv().unwrap();

        assert!(app.redraw(request).is_err());
        assert!(app.coordinator().is_idle());
        assert_eq!(app.view.frames_drawn, 1);
    }

    #[tokio::test]
    async fn test_headless_run_draws_paced_frames() {
        let mut app = app();
        let summary = app.run_for(Duration::from_millis(300)).await.unwrap();

        assert!(summary.ticks > 0);
        assert!(summary.frames >= 2, "frames: {}", summary.frames);
        // 20ms minimum spacing over ~300ms
        assert!(summary.frames <= 17, "frames: {}", summary.frames);
        assert_eq!(summary.stats.completions, summary.frames);
    }

    #[tokio::test]
    async fn test_deferred_repaints_fire_on_the_runtime() {
        // Built inside the runtime, so deferred repaints go through TokioTimer.
        let mut app = app();
        let summary = app.run_for(Duration::from_millis(300)).await.unwrap();

        assert!(summary.stats.deferred_redraws > 0, "stats: {:?}", summary.stats);
        assert_eq!(summary.stats.stale_timer_firings, 0);
        assert_eq!(summary.stats.completions, summary.frames);
    }

    #[tokio::test]
    async fn test_run_twice_is_rejected() {
        let mut app = app();
        app.run_for(Duration::from_millis(10)).await.unwrap();
        assert!(app.run_for(Duration::from_millis(10)).await.is_err());
    }
}

//! Repaint coordination between producer threads and the drawing thread.
//!
//! Producers (the simulation thread, input handlers, anything that changes what is on screen)
//! call [`DirtyNotifier::notify_dirty`] as often as they like. The coordinator turns that stream
//! into redraw requests on a [`RepaintTarget`] such that:
//!
//! 1. at most one redraw is scheduled or executing at any time;
//! 2. consecutive redraw starts are spaced by at least the current interval from an
//!    [`IntervalRotation`];
//! 3. no notification is lost: a notification that arrives while a redraw is in flight is picked
//!    up when the consumer reports completion through [`RedrawCompleter::on_redraw_completed`].
//!
//! All bookkeeping lives in one [`ScheduleState`] behind a single mutex. Each entry point takes
//! the lock, makes its decision, releases the lock and only then invokes the target or arms a
//! timer, so the redraw never runs under the lock.
//!
//! ```text
//!            notify_dirty                      notify_dirty (epoch bump only)
//!   Idle ───────────────────▶ Pending/Active ◀──────────────┐
//!    ▲                          │    │                      │
//!    │ completed, nothing new   │    └──────────────────────┘
//!    └──────────────────────────┘    completed, newer epoch: re-trigger
//! ```

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::pacing::IntervalRotation;
use crate::timer::{ThreadTimer, Timer};
use log::{debug, trace};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

/// The action a redraw trigger invokes.
///
/// Implementations should be cheap and non-blocking: typically they enqueue a repaint on the
/// thread that owns the drawing surface. Whoever performs the redraw must then call
/// [`RedrawCompleter::on_redraw_completed`] exactly once.
pub trait RepaintTarget: Send + Sync {
    fn request_redraw(&self);
}

impl<F> RepaintTarget for F
where
    F: Fn() + Send + Sync,
{
    fn request_redraw(&self) {
        self()
    }
}

/// Counters describing what the coordinator has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepaintStats {
    /// Every call to `notify_dirty`
    pub dirty_notifications: u64,
    /// Notifications absorbed because a redraw was already pending or active
    pub coalesced_notifications: u64,
    /// Redraws triggered synchronously inside a notify/complete call
    pub immediate_redraws: u64,
    /// Redraws triggered by a deferred timer
    pub deferred_redraws: u64,
    /// Completions that matched an active redraw
    pub completions: u64,
    /// Completions received with no redraw outstanding
    pub ignored_completions: u64,
    /// Timer firings that no longer matched the armed trigger
    pub stale_timer_firings: u64,
}

impl RepaintStats {
    /// Total redraws triggered on the target.
    pub fn redraws(&self) -> u64 {
        self.immediate_redraws + self.deferred_redraws
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// A deferred trigger is armed; only the timer firing carrying `ticket` may start the redraw.
    Pending { ticket: u64 },
    /// The target has been asked to redraw and completion has not been reported yet.
    Active,
}

/// Shared bookkeeping, always accessed under the coordinator's lock.
#[derive(Debug)]
pub struct ScheduleState {
    dirty_epoch: u64,
    dirtied_at: Option<Instant>,
    clean_epoch: u64,
    cleaned_at: Option<Instant>,
    phase: Phase,
    next_ticket: u64,
    rotation: IntervalRotation,
    stats: RepaintStats,
}

enum Decision {
    Nothing,
    RedrawNow,
    RedrawAfter { delay: Duration, ticket: u64 },
}

impl ScheduleState {
    fn new(rotation: IntervalRotation) -> Self {
        Self {
            dirty_epoch: 0,
            dirtied_at: None,
            clean_epoch: 0,
            cleaned_at: None,
            phase: Phase::Idle,
            next_ticket: 0,
            rotation,
            stats: RepaintStats::default(),
        }
    }

    fn is_cleaning(&self) -> bool {
        self.phase != Phase::Idle
    }

    fn has_unclean_work(&self) -> bool {
        self.clean_epoch < self.dirty_epoch
    }

    /// Choose between an immediate and a deferred redraw. Caller guarantees the phase is idle.
    fn decide(&mut self, now: Instant) -> Decision {
        debug_assert_eq!(self.phase, Phase::Idle);
        let interval = self.rotation.next();
        let since_clean = self
            .cleaned_at
            .map(|t| now.saturating_duration_since(t));

        match since_clean {
            Some(ago) if ago < interval => {
                let ticket = self.next_ticket;
                self.next_ticket += 1;
                self.phase = Phase::Pending { ticket };
                Decision::RedrawAfter {
                    delay: interval - ago,
                    ticket,
                }
            }
            _ => {
                self.begin_clean(now);
                self.stats.immediate_redraws += 1;
                Decision::RedrawNow
            }
        }
    }

    fn begin_clean(&mut self, now: Instant) {
        self.clean_epoch = self.dirty_epoch;
        self.cleaned_at = Some(now);
        self.phase = Phase::Active;
    }
}

struct Core {
    state: Mutex<ScheduleState>,
    clock: Arc<dyn Clock>,
    timer: Arc<dyn Timer>,
    target: Arc<dyn RepaintTarget>,
}

impl Core {
    fn notify_dirty(self: &Arc<Self>) {
        let now = self.clock.now();
        let decision = {
            let mut state = self.state.lock();
            state.dirty_epoch += 1;
            state.dirtied_at = Some(now);
            state.stats.dirty_notifications += 1;
            if state.is_cleaning() {
                state.stats.coalesced_notifications += 1;
                Decision::Nothing
            } else {
                state.decide(now)
            }
        };
        self.apply(decision);
    }

    fn on_redraw_completed(self: &Arc<Self>) {
        let now = self.clock.now();
        let decision = {
            let mut state = self.state.lock();
            if state.phase != Phase::Active {
                state.stats.ignored_completions += 1;
                debug!("redraw completion with no active redraw ignored");
                Decision::Nothing
            } else {
                state.stats.completions += 1;
                state.phase = Phase::Idle;
                if state.has_unclean_work() {
                    state.decide(now)
                } else {
                    trace!("repaint coordinator idle at epoch {}", state.clean_epoch);
                    Decision::Nothing
                }
            }
        };
        self.apply(decision);
    }

    fn on_timer(&self, ticket: u64) {
        let now = self.clock.now();
        let fire = {
            let mut state = self.state.lock();
            if state.phase == (Phase::Pending { ticket }) {
                state.begin_clean(now);
                state.stats.deferred_redraws += 1;
                true
            } else {
                state.stats.stale_timer_firings += 1;
                false
            }
        };
        if fire {
            trace!("deferred redraw fired (ticket {ticket})");
            self.target.request_redraw();
        }
    }

    fn apply(self: &Arc<Self>, decision: Decision) {
        match decision {
            Decision::Nothing => {}
            Decision::RedrawNow => {
                trace!("immediate redraw");
                self.target.request_redraw();
            }
            Decision::RedrawAfter { delay, ticket } => {
                trace!("redraw deferred by {delay:?} (ticket {ticket})");
                let core: Weak<Self> = Arc::downgrade(self);
                self.timer.schedule(
                    delay,
                    Box::new(move || {
                        if let Some(core) = core.upgrade() {
                            core.on_timer(ticket);
                        }
                    }),
                );
            }
        }
    }
}

/// Throttles dirty notifications into rate-limited, non-overlapping redraws.
///
/// Cloning is cheap and yields another handle to the same coordinator.
#[derive(Clone)]
pub struct RepaintCoordinator {
    core: Arc<Core>,
}

impl RepaintCoordinator {
    /// Create a coordinator using the system clock, a dedicated timer thread and the default
    /// interval rotation.
    pub fn new(target: Arc<dyn RepaintTarget>) -> Result<Self> {
        Self::with_rotation(target, IntervalRotation::default())
    }

    /// Create a coordinator using the system clock and a dedicated timer thread.
    pub fn with_rotation(target: Arc<dyn RepaintTarget>, rotation: IntervalRotation) -> Result<Self> {
        let timer = ThreadTimer::new("repaint-timer")?;
        Ok(Self::with_parts(
            target,
            rotation,
            Arc::new(SystemClock),
            Arc::new(timer),
        ))
    }

    /// Create a coordinator from explicit parts.
    pub fn with_parts(
        target: Arc<dyn RepaintTarget>,
        rotation: IntervalRotation,
        clock: Arc<dyn Clock>,
        timer: Arc<dyn Timer>,
    ) -> Self {
        Self {
            core: Arc::new(Core {
                state: Mutex::new(ScheduleState::new(rotation)),
                clock,
                timer,
                target,
            }),
        }
    }

    /// Record that the view is stale. Never blocks on the redraw.
    ///
    /// When idle and the last redraw started at least one interval ago, the target is invoked
    /// before this call returns. When idle but too soon, a deferred trigger is armed for the
    /// remainder of the interval. Otherwise only the dirty epoch advances.
    pub fn notify_dirty(&self) {
        self.core.notify_dirty();
    }

    /// Report that the redraw the target was asked to perform has finished.
    ///
    /// If anything was dirtied since that redraw started, exactly one new redraw is triggered or
    /// scheduled. Calls with no redraw outstanding are ignored.
    pub fn on_redraw_completed(&self) {
        self.core.on_redraw_completed();
    }

    /// Producer-side handle.
    pub fn notifier(&self) -> DirtyNotifier {
        DirtyNotifier {
            core: Arc::clone(&self.core),
        }
    }

    /// Consumer-side handle. A deployment should hand out exactly one.
    pub fn completer(&self) -> RedrawCompleter {
        RedrawCompleter {
            core: Arc::clone(&self.core),
        }
    }

    /// True when no redraw is pending or active.
    pub fn is_idle(&self) -> bool {
        !self.core.state.lock().is_cleaning()
    }

    pub fn dirty_epoch(&self) -> u64 {
        self.core.state.lock().dirty_epoch
    }

    pub fn clean_epoch(&self) -> u64 {
        self.core.state.lock().clean_epoch
    }

    /// Time of the most recent dirty notification, if any.
    pub fn last_dirtied_at(&self) -> Option<Instant> {
        self.core.state.lock().dirtied_at
    }

    /// Start time of the most recent redraw, if any.
    pub fn last_cleaned_at(&self) -> Option<Instant> {
        self.core.state.lock().cleaned_at
    }

    pub fn stats(&self) -> RepaintStats {
        self.core.state.lock().stats
    }
}

impl std::fmt::Debug for RepaintCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.core.state.lock();
        f.debug_struct("RepaintCoordinator")
            .field("dirty_epoch", &state.dirty_epoch)
            .field("clean_epoch", &state.clean_epoch)
            .field("phase", &state.phase)
            .finish()
    }
}

/// Handle for code that makes the view stale. May be cloned and shared across threads.
#[derive(Clone)]
pub struct DirtyNotifier {
    core: Arc<Core>,
}

impl DirtyNotifier {
    pub fn notify_dirty(&self) {
        self.core.notify_dirty();
    }
}

impl std::fmt::Debug for DirtyNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirtyNotifier").finish_non_exhaustive()
    }
}

/// Handle for the thread that performs redraws.
pub struct RedrawCompleter {
    core: Arc<Core>,
}

impl RedrawCompleter {
    pub fn on_redraw_completed(&self) {
        self.core.on_redraw_completed();
    }
}

impl std::fmt::Debug for RedrawCompleter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedrawCompleter").finish_non_exhaustive()
    }
}

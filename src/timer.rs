//! One-shot deferred triggers.
//!
//! The coordinator never sleeps on the caller's thread. When a redraw has to wait out the rest of
//! an interval it hands a task to a [`Timer`], which runs it once the delay has elapsed. Three
//! implementations are provided:
//!
//! - [`ThreadTimer`] - a dedicated daemon thread with a deadline-ordered queue
//! - [`TokioTimer`] - spawns a `tokio::time::sleep` task on a runtime handle
//! - [`ManualTimer`] - fires only when asked to, against a [`ManualClock`]

use crate::clock::{Clock, ManualClock};
use crate::error::{PacerError, Result};
use parking_lot::{Condvar, Mutex};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;

/// Work handed to a timer.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Schedules a task to run once after a delay.
///
/// Implementations must return immediately and must not run the task on the calling thread
/// before `delay` has elapsed.
pub trait Timer: Send + Sync {
    fn schedule(&self, delay: Duration, task: TimerTask);
}

struct Entry {
    deadline: Instant,
    seq: u64,
    task: TimerTask,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so BinaryHeap pops the earliest deadline first; ties keep submission order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct QueueState {
    entries: BinaryHeap<Entry>,
    next_seq: u64,
    shutdown: bool,
}

impl QueueState {
    fn push(&mut self, deadline: Instant, task: TimerTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            deadline,
            seq,
            task,
        });
    }
}

struct TimerShared {
    queue: Mutex<QueueState>,
    wakeup: Condvar,
}

/// Timer backed by a single background thread.
///
/// The thread sleeps until the earliest deadline, pops every due task and runs it outside the
/// queue lock. Dropping the timer stops the thread; tasks still queued at that point are
/// discarded.
pub struct ThreadTimer {
    shared: Arc<TimerShared>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadTimer {
    /// Spawn the timer thread with the given name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let shared = Arc::new(TimerShared {
            queue: Mutex::new(QueueState::default()),
            wakeup: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || timer_loop(worker_shared))
            .map_err(|e| PacerError::io("Failed to spawn timer thread", e))?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Number of tasks waiting for their deadline.
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().entries.len()
    }
}

fn timer_loop(shared: Arc<TimerShared>) {
    loop {
        let task = {
            let mut state = shared.queue.lock();
            loop {
                if state.shutdown {
                    return;
                }
                match state.entries.peek().map(|entry| entry.deadline) {
                    None => shared.wakeup.wait(&mut state),
                    Some(deadline) if deadline <= Instant::now() => {
                        if let Some(entry) = state.entries.pop() {
                            break entry.task;
                        }
                    }
                    Some(deadline) => {
                        shared.wakeup.wait_until(&mut state, deadline);
                    }
                }
            }
        };
        task();
    }
}

impl Timer for ThreadTimer {
    fn schedule(&self, delay: Duration, task: TimerTask) {
        let deadline = Instant::now() + delay;
        self.shared.queue.lock().push(deadline, task);
        self.shared.wakeup.notify_one();
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.shared.queue.lock().shutdown = true;
        self.shared.wakeup.notify_one();
        if let Some(handle) = self.handle.take() {
            // A task running on the timer thread may drop the last handle; joining there would
            // wait on ourselves.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl std::fmt::Debug for ThreadTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadTimer")
            .field("pending", &self.pending())
            .finish()
    }
}

/// Timer that sleeps on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioTimer {
    handle: Handle,
}

impl TokioTimer {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Capture the runtime the caller is running on.
    pub fn current() -> Result<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| PacerError::other(format!("no tokio runtime available: {e}")))
    }
}

impl Timer for TokioTimer {
    fn schedule(&self, delay: Duration, task: TimerTask) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

/// Timer driven explicitly by the caller.
///
/// Deadlines are computed from a shared [`ManualClock`]. Nothing fires until [`fire_due`] is
/// called; this makes interleavings of timer firings and other calls fully reproducible.
///
/// [`fire_due`]: ManualTimer::fire_due
#[derive(Clone)]
pub struct ManualTimer {
    clock: ManualClock,
    queue: Arc<Mutex<QueueState>>,
}

impl ManualTimer {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            queue: Arc::new(Mutex::new(QueueState::default())),
        }
    }

    /// Run every task whose deadline is at or before the clock's current time.
    ///
    /// Tasks run outside the queue lock, so a task may schedule further work; anything it
    /// schedules that is already due runs in the same call. Returns the number of tasks run.
    pub fn fire_due(&self) -> usize {
        let mut fired = 0;
        loop {
            let now = self.clock.now();
            let task = {
                let mut state = self.queue.lock();
                let due = state
                    .entries
                    .peek()
                    .is_some_and(|entry| entry.deadline <= now);
                if due {
                    state.entries.pop().map(|entry| entry.task)
                } else {
                    None
                }
            };
            match task {
                Some(task) => {
                    task();
                    fired += 1;
                }
                None => return fired,
            }
        }
    }

    /// Offset from the clock origin of the earliest queued deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue
            .lock()
            .entries
            .peek()
            .map(|entry| entry.deadline.saturating_duration_since(self.clock.origin()))
    }

    /// Advance the clock to the earliest deadline (if any) and fire what is due.
    pub fn advance_to_next(&self) -> usize {
        match self.next_deadline() {
            Some(offset) => {
                self.clock.set(offset);
                self.fire_due()
            }
            None => 0,
        }
    }

    /// Number of tasks waiting for their deadline.
    pub fn pending(&self) -> usize {
        self.queue.lock().entries.len()
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay: Duration, task: TimerTask) {
        let deadline = self.clock.now() + delay;
        self.queue.lock().push(deadline, task);
    }
}

impl std::fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTimer")
            .field("now", &self.clock.elapsed())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::mpsc;

    #[test]
    fn test_manual_timer_fires_only_when_due() {
        let clock = ManualClock::new();
        let timer = ManualTimer::new(clock.clone());
        let count = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&count);
        timer.schedule(
            Duration::from_millis(30),
            Box::new(move || {
                c.fetch_add(1, AtomicOrdering::SeqCst);
            }),
        );

        clock.advance(Duration::from_millis(29));
        assert_eq!(timer.fire_due(), 0);
        assert_eq!(count.load(AtomicOrdering::SeqCst), 0);

        clock.advance(Duration::from_millis(1));
        assert_eq!(timer.fire_due(), 1);
        assert_eq!(count.load(AtomicOrdering::SeqCst), 1);

        // One-shot: nothing left
        assert_eq!(timer.fire_due(), 0);
        assert_eq!(timer.pending(), 0);
    }

    #[test]
    fn test_manual_timer_orders_by_deadline() {
        let clock = ManualClock::new();
        let timer = ManualTimer::new(clock.clone());
        let order = Arc::new(Mutex::new(Vec::new()));

        for (label, ms) in [("late", 20u64), ("early", 5), ("mid", 10)] {
            let order = Arc::clone(&order);
            timer.schedule(
                Duration::from_millis(ms),
                Box::new(move || order.lock().push(label)),
            );
        }

        assert_eq!(timer.next_deadline(), Some(Duration::from_millis(5)));
        clock.advance(Duration::from_millis(25));
        assert_eq!(timer.fire_due(), 3);
        assert_eq!(*order.lock(), vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_advance_to_next_moves_clock() {
        let clock = ManualClock::new();
        let timer = ManualTimer::new(clock.clone());
        timer.schedule(Duration::from_millis(12), Box::new(|| {}));

        assert_eq!(timer.advance_to_next(), 1);
        assert_eq!(clock.elapsed(), Duration::from_millis(12));
        assert_eq!(timer.advance_to_next(), 0);
    }

    #[test]
    fn test_thread_timer_runs_task_after_delay() {
        let timer = ThreadTimer::new("test-timer").unwrap();
        let (tx, rx) = mpsc::channel();
        let scheduled_at = Instant::now();

        timer.schedule(
            Duration::from_millis(20),
            Box::new(move || {
                let _ = tx.send(Instant::now());
            }),
        );

        let fired_at = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("timer task did not run");
        assert!(fired_at.duration_since(scheduled_at) >= Duration::from_millis(20));
    }

    #[test]
    fn test_thread_timer_earlier_deadline_preempts_sleep() {
        let timer = ThreadTimer::new("test-timer-order").unwrap();
        let (tx, rx) = mpsc::channel();

        let tx_late = tx.clone();
        timer.schedule(
            Duration::from_millis(500),
            Box::new(move || {
                let _ = tx_late.send("late");
            }),
        );
        timer.schedule(
            Duration::from_millis(5),
            Box::new(move || {
                let _ = tx.send("early");
            }),
        );

        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, "early");
    }

    #[test]
    fn test_thread_timer_drop_discards_pending() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let timer = ThreadTimer::new("test-timer-drop").unwrap();
            let c = Arc::clone(&count);
            timer.schedule(
                Duration::from_secs(60),
                Box::new(move || {
                    c.fetch_add(1, AtomicOrdering::SeqCst);
                }),
            );
            assert_eq!(timer.pending(), 1);
        }
        assert_eq!(count.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tokio_timer_runs_task() {
        let timer = TokioTimer::current().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();

        timer.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        tokio::time::timeout(Duration::from_secs(2), rx)
            .await
            .expect("tokio timer did not fire")
            .unwrap();
    }

    #[test]
    fn test_tokio_timer_requires_runtime() {
        assert!(TokioTimer::current().is_err());
    }
}

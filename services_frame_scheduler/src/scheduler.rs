//! # Frame Scheduler
//!
//! Buffers frame requests and feeds them to the real primitive under
//! pause/run/step control.
//!
//! At most one real request is outstanding at a time: the `armed` flag is set
//! when the real primitive is asked for a frame and cleared when that frame
//! fires. One firing drains the whole queue.

use crate::primitive::{FrameCallback, FramePrimitive, FrameTime};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, trace};

/// Observer told whether frame work is outstanding
///
/// Called with `true` on every queued request and with `false` at the start of
/// every firing.
pub type PendingRequestObserver = Rc<dyn Fn(bool)>;

/// Frame scheduler error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Frame scheduler is already interposed")]
    AlreadyInterposed,
}

/// Point-in-time view of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    /// Whether a real primitive has been captured
    pub interposed: bool,
    /// Whether requests arm the real primitive automatically
    pub running: bool,
    /// Whether a real request is outstanding
    pub armed: bool,
    /// Number of queued callbacks
    pub pending: usize,
    /// Number of real firings delivered so far
    pub firings: u64,
}

struct SchedulerState {
    /// Callbacks waiting for the next firing, in registration order
    queue: Vec<FrameCallback>,
    running: bool,
    armed: bool,
    /// An arm requested before interposition, honoured by `interpose`
    deferred_arm: bool,
    observer: Option<PendingRequestObserver>,
    /// Captured once by `interpose`, never reassigned
    real: Option<Rc<dyn FramePrimitive>>,
    firings: u64,
}

/// Interposing frame scheduler
///
/// Cloning yields another handle to the same scheduler.
#[derive(Clone)]
pub struct FrameScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl FrameScheduler {
    /// Creates a running, not yet interposed scheduler
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SchedulerState {
                queue: Vec::new(),
                running: true,
                armed: false,
                deferred_arm: false,
                observer: None,
                real: None,
                firings: 0,
            })),
        }
    }

    /// Captures `real` as the primitive that actually delivers frames
    ///
    /// Requests queued before interposition are armed now if running, and a
    /// `step()` made before interposition is delivered on the first firing.
    pub fn interpose(&self, real: Rc<dyn FramePrimitive>) -> Result<(), SchedulerError> {
        let should_arm = {
            let mut state = self.state.borrow_mut();
            if state.real.is_some() {
                return Err(SchedulerError::AlreadyInterposed);
            }
            state.real = Some(real);
            let deferred = std::mem::take(&mut state.deferred_arm);
            deferred || (state.running && !state.queue.is_empty())
        };

        debug!("frame scheduler interposed");
        if should_arm {
            self.arm();
        }
        Ok(())
    }

    /// Returns true once a real primitive has been captured
    pub fn is_interposed(&self) -> bool {
        self.state.borrow().real.is_some()
    }

    /// Stops arming the real primitive automatically
    ///
    /// An already armed firing still fires.
    pub fn pause(&self) {
        self.set_running(false);
    }

    /// Resumes automatic arming, arming now if work is queued
    pub fn run(&self) {
        self.set_running(true);
    }

    /// Flips between paused and running
    pub fn toggle_pause(&self) {
        let running = self.is_running();
        self.set_running(!running);
    }

    /// Delivers exactly one upcoming firing, paused or not
    ///
    /// If a firing is already armed, that firing is the step. Before
    /// interposition the step waits for `interpose`.
    pub fn step(&self) {
        debug!("step: request one frame");
        self.arm();
    }

    /// Returns true when requests arm the real primitive automatically
    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    /// Returns true while a real request is outstanding
    pub fn is_armed(&self) -> bool {
        self.state.borrow().armed
    }

    /// Returns the number of queued callbacks
    pub fn pending_count(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Returns the number of firings delivered so far
    pub fn firings(&self) -> u64 {
        self.state.borrow().firings
    }

    /// Installs, replaces or (with `None`) removes the pending-request observer
    pub fn set_pending_request_observer(&self, observer: Option<PendingRequestObserver>) {
        self.state.borrow_mut().observer = observer;
    }

    /// Returns a point-in-time view of the scheduler
    pub fn snapshot(&self) -> SchedulerSnapshot {
        let state = self.state.borrow();
        SchedulerSnapshot {
            interposed: state.real.is_some(),
            running: state.running,
            armed: state.armed,
            pending: state.queue.len(),
            firings: state.firings,
        }
    }

    fn set_running(&self, running: bool) {
        let should_arm = {
            let mut state = self.state.borrow_mut();
            state.running = running;
            running && !state.queue.is_empty()
        };

        debug!(running, "frame scheduler running state changed");
        if should_arm {
            self.arm();
        }
    }

    /// Asks the real primitive for one firing unless one is outstanding
    fn arm(&self) {
        let real = {
            let mut state = self.state.borrow_mut();
            if state.armed {
                return;
            }
            let Some(real) = state.real.clone() else {
                trace!("frame scheduler not interposed, firing deferred");
                state.deferred_arm = true;
                return;
            };
            state.armed = true;
            real
        };

        let weak = Rc::downgrade(&self.state);
        real.request_frame(Box::new(move |time| {
            if let Some(state) = weak.upgrade() {
                FrameScheduler { state }.fire(time);
            }
        }));
    }

    fn fire(&self, time: FrameTime) {
        let observer = {
            let mut state = self.state.borrow_mut();
            state.armed = false;
            state.firings += 1;
            state.observer.clone()
        };
        if let Some(observer) = observer {
            observer(false);
        }

        // Requests made by these callbacks land in the fresh queue
        let batch = std::mem::take(&mut self.state.borrow_mut().queue);
        trace!(callbacks = batch.len(), "delivering frame");
        for callback in batch {
            callback(time);
        }
    }
}

impl FramePrimitive for FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) {
        let (observer, running) = {
            let mut state = self.state.borrow_mut();
            state.queue.push(callback);
            (state.observer.clone(), state.running)
        };

        if let Some(observer) = observer {
            observer(true);
        }
        if running {
            self.arm();
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FrameScheduler").field(&self.snapshot()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;

    /// Real primitive stand-in: holds requests until `fire_all`
    #[derive(Default)]
    struct ManualPrimitive {
        requests: RefCell<Vec<FrameCallback>>,
        now: Cell<f64>,
    }

    impl ManualPrimitive {
        fn outstanding(&self) -> usize {
            self.requests.borrow().len()
        }

        fn fire_all(&self) -> usize {
            self.now.set(self.now.get() + 16.0);
            let requests = std::mem::take(&mut *self.requests.borrow_mut());
            let count = requests.len();
            for request in requests {
                request(FrameTime(self.now.get()));
            }
            count
        }
    }

    impl FramePrimitive for ManualPrimitive {
        fn request_frame(&self, callback: FrameCallback) {
            self.requests.borrow_mut().push(callback);
        }
    }

    fn interposed() -> (FrameScheduler, Rc<ManualPrimitive>) {
        let real = Rc::new(ManualPrimitive::default());
        let scheduler = FrameScheduler::new();
        scheduler.interpose(real.clone()).unwrap();
        (scheduler, real)
    }

    fn logging(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> FrameCallback {
        let log = log.clone();
        Box::new(move |_| log.borrow_mut().push(name))
    }

    #[test]
    fn test_scheduler_creation() {
        let scheduler = FrameScheduler::new();
        let snapshot = scheduler.snapshot();
        assert!(!snapshot.interposed);
        assert!(snapshot.running);
        assert!(!snapshot.armed);
        assert_eq!(snapshot.pending, 0);
        assert_eq!(snapshot.firings, 0);
    }

    #[test]
    fn test_fifo_within_one_firing() {
        let (scheduler, real) = interposed();
        let log = Rc::new(RefCell::new(Vec::new()));

        scheduler.request_frame(logging(&log, "a"));
        scheduler.request_frame(logging(&log, "b"));
        scheduler.request_frame(logging(&log, "c"));

        assert_eq!(real.outstanding(), 1);
        real.fire_all();

        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.firings(), 1);
    }

    #[test]
    fn test_arming_is_idempotent_per_cycle() {
        let (scheduler, real) = interposed();

        for _ in 0..5 {
            scheduler.request_frame(Box::new(|_| {}));
        }
        assert!(scheduler.is_armed());
        assert_eq!(real.outstanding(), 1);

        real.fire_all();
        assert!(!scheduler.is_armed());

        scheduler.request_frame(Box::new(|_| {}));
        assert_eq!(real.outstanding(), 1);
    }

    #[test]
    fn test_requests_during_drain_go_to_next_firing() {
        let (scheduler, real) = interposed();
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_scheduler = scheduler.clone();
        let inner_log = log.clone();
        scheduler.request_frame(Box::new(move |_| {
            inner_log.borrow_mut().push("outer");
            inner_scheduler.request_frame(logging(&inner_log, "inner"));
        }));

        real.fire_all();
        assert_eq!(*log.borrow(), vec!["outer"]);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(real.outstanding(), 1);

        real.fire_all();
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_callbacks_receive_frame_time() {
        let (scheduler, real) = interposed();
        let seen = Rc::new(Cell::new(0.0));

        let seen_by_callback = seen.clone();
        scheduler.request_frame(Box::new(move |time| seen_by_callback.set(time.as_millis())));
        real.fire_all();

        assert_eq!(seen.get(), 16.0);
    }

    #[test]
    fn test_pause_blocks_arming() {
        let (scheduler, real) = interposed();
        let count = Rc::new(Cell::new(0));

        scheduler.pause();
        for _ in 0..3 {
            let count = count.clone();
            scheduler.request_frame(Box::new(move |_| count.set(count.get() + 1)));
        }

        assert_eq!(real.outstanding(), 0);
        assert_eq!(real.fire_all(), 0);
        assert_eq!(real.fire_all(), 0);
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.pending_count(), 3);
    }

    #[test]
    fn test_pause_does_not_cancel_armed_firing() {
        let (scheduler, real) = interposed();
        let count = Rc::new(Cell::new(0));

        let counter = count.clone();
        scheduler.request_frame(Box::new(move |_| counter.set(counter.get() + 1)));
        scheduler.pause();

        real.fire_all();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_step_while_paused_delivers_once() {
        let (scheduler, real) = interposed();
        let count = Rc::new(Cell::new(0));

        scheduler.pause();
        for _ in 0..3 {
            let count = count.clone();
            scheduler.request_frame(Box::new(move |_| count.set(count.get() + 1)));
        }

        scheduler.step();
        assert_eq!(real.outstanding(), 1);
        real.fire_all();

        assert_eq!(count.get(), 3);
        assert!(!scheduler.is_running());
        assert_eq!(real.fire_all(), 0);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_step_when_already_armed_adds_no_request() {
        let (scheduler, real) = interposed();
        scheduler.request_frame(Box::new(|_| {}));

        scheduler.step();
        assert_eq!(real.outstanding(), 1);
    }

    #[test]
    fn test_run_arms_when_queue_non_empty() {
        let (scheduler, real) = interposed();
        scheduler.pause();
        scheduler.run();
        assert_eq!(real.outstanding(), 0);

        scheduler.pause();
        scheduler.request_frame(Box::new(|_| {}));
        scheduler.run();
        assert_eq!(real.outstanding(), 1);
    }

    #[test]
    fn test_toggle_pause() {
        let (scheduler, _real) = interposed();
        assert!(scheduler.is_running());
        scheduler.toggle_pause();
        assert!(!scheduler.is_running());
        scheduler.toggle_pause();
        assert!(scheduler.is_running());
    }

    #[test]
    fn test_observer_notifications() {
        let (scheduler, real) = interposed();
        let events = Rc::new(RefCell::new(Vec::new()));
        let order = Rc::new(RefCell::new(Vec::new()));

        let observed = events.clone();
        let observed_order = order.clone();
        scheduler.set_pending_request_observer(Some(Rc::new(move |pending: bool| {
            observed.borrow_mut().push(pending);
            observed_order.borrow_mut().push(if pending { "pending" } else { "idle" });
        })));

        let callback_order = order.clone();
        scheduler.request_frame(Box::new(move |_| callback_order.borrow_mut().push("callback")));
        assert_eq!(*events.borrow(), vec![true]);

        real.fire_all();
        assert_eq!(*events.borrow(), vec![true, false]);
        assert_eq!(*order.borrow(), vec!["pending", "idle", "callback"]);
    }

    #[test]
    fn test_observer_removal() {
        let (scheduler, real) = interposed();
        let count = Rc::new(Cell::new(0));

        let counter = count.clone();
        scheduler.set_pending_request_observer(Some(Rc::new(move |_: bool| {
            counter.set(counter.get() + 1)
        })));
        scheduler.request_frame(Box::new(|_| {}));
        scheduler.set_pending_request_observer(None);
        real.fire_all();

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_requests_before_interpose_are_armed_on_interpose() {
        let scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));

        let counter = count.clone();
        scheduler.request_frame(Box::new(move |_| counter.set(counter.get() + 1)));
        assert!(!scheduler.is_armed());

        let real = Rc::new(ManualPrimitive::default());
        scheduler.interpose(real.clone()).unwrap();
        assert_eq!(real.outstanding(), 1);

        real.fire_all();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_step_before_interpose_fires_after_interpose() {
        let scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));
        scheduler.pause();

        let counter = count.clone();
        scheduler.request_frame(Box::new(move |_| counter.set(counter.get() + 1)));
        scheduler.step();
        assert!(!scheduler.is_armed());

        let real = Rc::new(ManualPrimitive::default());
        scheduler.interpose(real.clone()).unwrap();
        assert_eq!(real.outstanding(), 1);

        real.fire_all();
        assert_eq!(count.get(), 1);
        assert!(!scheduler.is_running());

        // The deferred step is spent
        scheduler.request_frame(Box::new(|_| {}));
        assert_eq!(real.outstanding(), 0);
    }

    #[test]
    fn test_paused_request_before_interpose_stays_queued() {
        let scheduler = FrameScheduler::new();
        scheduler.pause();
        scheduler.request_frame(Box::new(|_| {}));

        let real = Rc::new(ManualPrimitive::default());
        scheduler.interpose(real.clone()).unwrap();
        assert_eq!(real.outstanding(), 0);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn test_second_interpose_rejected() {
        let (scheduler, first) = interposed();
        let second = Rc::new(ManualPrimitive::default());

        assert_eq!(
            scheduler.interpose(second.clone()),
            Err(SchedulerError::AlreadyInterposed)
        );

        scheduler.request_frame(Box::new(|_| {}));
        assert_eq!(first.outstanding(), 1);
        assert_eq!(second.outstanding(), 0);
    }

    #[test]
    fn test_firing_after_scheduler_dropped_is_harmless() {
        let (scheduler, real) = interposed();
        scheduler.request_frame(Box::new(|_| panic!("scheduler was dropped")));
        drop(scheduler);

        assert_eq!(real.fire_all(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Request,
        Pause,
        Run,
        Step,
        Fire,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => Just(Op::Request),
            1 => Just(Op::Pause),
            1 => Just(Op::Run),
            1 => Just(Op::Step),
            2 => Just(Op::Fire),
        ]
    }

    proptest! {
        #[test]
        fn prop_each_registration_runs_once_in_order(ops in proptest::collection::vec(op(), 0..64)) {
            let (scheduler, real) = interposed();
            let delivered = Rc::new(RefCell::new(Vec::new()));
            let mut registered = 0usize;

            for op in ops {
                match op {
                    Op::Request => {
                        let delivered = delivered.clone();
                        let id = registered;
                        registered += 1;
                        scheduler.request_frame(Box::new(move |_| delivered.borrow_mut().push(id)));
                    }
                    Op::Pause => scheduler.pause(),
                    Op::Run => scheduler.run(),
                    Op::Step => scheduler.step(),
                    Op::Fire => {
                        real.fire_all();
                    }
                }
                prop_assert!(real.outstanding() <= 1);
            }

            scheduler.step();
            real.fire_all();

            let delivered = delivered.borrow();
            prop_assert_eq!(delivered.len(), registered);
            prop_assert!(delivered.iter().enumerate().all(|(index, id)| index == *id));
        }

        #[test]
        fn prop_paused_scheduler_never_delivers(requests in 1usize..16, fires in 1usize..8) {
            let (scheduler, real) = interposed();
            let count = Rc::new(Cell::new(0));
            scheduler.pause();

            for _ in 0..requests {
                let count = count.clone();
                scheduler.request_frame(Box::new(move |_| count.set(count.get() + 1)));
            }
            for _ in 0..fires {
                real.fire_all();
            }

            prop_assert_eq!(count.get(), 0);
            prop_assert_eq!(scheduler.pending_count(), requests);
        }
    }
}

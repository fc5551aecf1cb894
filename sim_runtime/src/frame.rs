//! # Simulated Frame Primitive
//!
//! Deterministic stand-in for the browser's animation-frame primitive.
//!
//! Time advances only through `advance_frame()`. Each call fires the requests
//! outstanding at that moment, as one display refresh would.

use services_frame_scheduler::{FrameCallback, FramePrimitive, FrameTime};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Default refresh interval, roughly 60 Hz
pub const DEFAULT_FRAME_INTERVAL_MS: f64 = 16.0;

struct FrameState {
    pending: Vec<FrameCallback>,
    requests: usize,
    now: f64,
    interval: f64,
}

/// Shared handle to a simulated frame clock
///
/// # Examples
///
/// ```
/// use services_frame_scheduler::FramePrimitive;
/// use sim_runtime::SimFramePrimitive;
///
/// let frames = SimFramePrimitive::new();
/// frames.request_frame(Box::new(|time| assert_eq!(time.as_millis(), 16.0)));
/// assert_eq!(frames.pending_requests(), 1);
///
/// assert_eq!(frames.advance_frame(), 1);
/// assert_eq!(frames.pending_requests(), 0);
/// ```
#[derive(Clone)]
pub struct SimFramePrimitive {
    state: Rc<RefCell<FrameState>>,
}

impl SimFramePrimitive {
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_FRAME_INTERVAL_MS)
    }

    /// Creates a clock advancing `interval_ms` per frame
    pub fn with_interval(interval_ms: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(FrameState {
                pending: Vec::new(),
                requests: 0,
                now: 0.0,
                interval: interval_ms,
            })),
        }
    }

    /// Fires one frame and returns how many callbacks it delivered
    ///
    /// Requests made by those callbacks wait for the next frame.
    pub fn advance_frame(&self) -> usize {
        let (callbacks, time) = {
            let mut state = self.state.borrow_mut();
            state.now += state.interval;
            (std::mem::take(&mut state.pending), state.now)
        };

        let delivered = callbacks.len();
        for callback in callbacks {
            callback(FrameTime::from_millis(time));
        }
        delivered
    }

    /// Returns the number of callbacks waiting for the next frame
    pub fn pending_requests(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Returns the number of requests made since creation
    pub fn request_count(&self) -> usize {
        self.state.borrow().requests
    }

    /// Returns the timestamp of the last frame fired
    pub fn now(&self) -> FrameTime {
        FrameTime::from_millis(self.state.borrow().now)
    }
}

impl Default for SimFramePrimitive {
    fn default() -> Self {
        Self::new()
    }
}

impl FramePrimitive for SimFramePrimitive {
    fn request_frame(&self, callback: FrameCallback) {
        let mut state = self.state.borrow_mut();
        state.pending.push(callback);
        state.requests += 1;
    }
}

impl fmt::Debug for SimFramePrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SimFramePrimitive")
            .field("pending", &state.pending.len())
            .field("requests", &state.requests)
            .field("now", &state.now)
            .finish()
    }
}

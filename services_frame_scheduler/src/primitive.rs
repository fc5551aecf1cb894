//! # Frame Primitive
//!
//! The environment's "call me on the next frame" operation.
//!
//! A primitive invokes each registered callback once, on a later frame, with
//! that frame's timestamp. It never invokes a callback synchronously from
//! inside `request_frame`.

use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Timestamp of a frame, in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FrameTime(pub f64);

impl FrameTime {
    /// Creates a frame time from milliseconds
    pub fn from_millis(millis: f64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp in milliseconds
    pub fn as_millis(&self) -> f64 {
        self.0
    }
}

/// Callback registered for the next frame
pub type FrameCallback = Box<dyn FnOnce(FrameTime)>;

/// A "request next frame" operation
pub trait FramePrimitive {
    /// Registers `callback` for the next frame
    fn request_frame(&self, callback: FrameCallback);
}

impl<P: FramePrimitive + ?Sized> FramePrimitive for Rc<P> {
    fn request_frame(&self, callback: FrameCallback) {
        (**self).request_frame(callback);
    }
}

//! # Frame Scheduler Service
//!
//! A controllable stand-in for the environment's "request next frame"
//! primitive, used to pause, resume or single-step animation while debugging.
//!
//! ## Philosophy
//!
//! - **Interposed, not invasive**: Frame-producing code keeps calling
//!   `request_frame`; it cannot tell it is being throttled
//! - **Explicit ownership**: The scheduler is an object handed to whoever needs
//!   frame control, not a hidden global
//! - **FIFO per frame**: Everything queued before a firing runs in that firing,
//!   in registration order
//! - **No cancellation**: The only brake is the global pause
//!
//! ## Example
//!
//! ```
//! use services_frame_scheduler::{FramePrimitive, FrameScheduler, FrameTime, FrameCallback};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! // A primitive that holds requests until told to fire
//! #[derive(Default)]
//! struct Manual(RefCell<Vec<FrameCallback>>);
//! impl FramePrimitive for Manual {
//!     fn request_frame(&self, callback: FrameCallback) {
//!         self.0.borrow_mut().push(callback);
//!     }
//! }
//!
//! let real = Rc::new(Manual::default());
//! let scheduler = FrameScheduler::new();
//! scheduler.interpose(real.clone()).unwrap();
//!
//! scheduler.pause();
//! scheduler.request_frame(Box::new(|_| println!("frame")));
//! assert!(real.0.borrow().is_empty());
//!
//! scheduler.step();
//! let fires: Vec<FrameCallback> = real.0.borrow_mut().drain(..).collect();
//! for fire in fires {
//!     fire(FrameTime::from_millis(16.0));
//! }
//! assert_eq!(scheduler.pending_count(), 0);
//! ```

pub mod primitive;
pub mod scheduler;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use primitive::{FrameCallback, FramePrimitive, FrameTime};
pub use scheduler::{FrameScheduler, PendingRequestObserver, SchedulerError, SchedulerSnapshot};

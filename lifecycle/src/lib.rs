//! # Lifecycle
//!
//! Deterministic readiness primitives for single-threaded, callback-driven hosts.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: Readiness is a signal, never a timed guess
//! - **Testability first**: Resolution is driven by the caller, no hidden clocks
//! - **Mechanism not policy**: Provides primitives, services decide what to wait for
//! - **No async runtime required**: Works in plain callback contexts
//!
//! ## Core Concepts
//!
//! - `ReadySource`: Controller that resolves the signal exactly once
//! - `ReadyToken`: Cloneable handle to query the signal or wait on it
//! - `LifecycleError`: Misuse of a signal (resolving it twice)

#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

type Waiter<T> = Box<dyn FnOnce(T)>;

/// Internal state of a readiness signal
enum ReadyState<T> {
    Pending(Vec<Waiter<T>>),
    Ready(T),
}

/// Shared state between ReadyToken and ReadySource
struct SharedReadyState<T> {
    state: Rc<RefCell<ReadyState<T>>>,
}

impl<T> Clone for SharedReadyState<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: Clone + 'static> SharedReadyState<T> {
    fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ReadyState::Pending(Vec::new()))),
        }
    }

    fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), ReadyState::Ready(_))
    }

    fn value(&self) -> Option<T> {
        match &*self.state.borrow() {
            ReadyState::Pending(_) => None,
            ReadyState::Ready(value) => Some(value.clone()),
        }
    }

    fn resolve(&self, value: T) -> Result<(), LifecycleError> {
        let waiters = {
            let mut state = self.state.borrow_mut();
            let waiters = match &mut *state {
                ReadyState::Ready(_) => return Err(LifecycleError::AlreadyResolved),
                ReadyState::Pending(waiters) => core::mem::take(waiters),
            };
            *state = ReadyState::Ready(value.clone());
            waiters
        };

        // Borrow released: waiters may query the signal or wait on it again
        for waiter in waiters {
            waiter(value.clone());
        }
        Ok(())
    }

    fn when_ready(&self, waiter: impl FnOnce(T) + 'static) {
        match self.value() {
            Some(value) => waiter(value),
            None => {
                if let ReadyState::Pending(waiters) = &mut *self.state.borrow_mut() {
                    waiters.push(Box::new(waiter));
                }
            }
        }
    }
}

/// A cloneable handle to wait on a readiness signal
///
/// ## Example
///
/// ```
/// use lifecycle::ReadySource;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let source = ReadySource::new();
/// let token = source.token();
/// let seen = Rc::new(Cell::new(0));
///
/// let seen_by_waiter = seen.clone();
/// token.when_ready(move |value: u32| seen_by_waiter.set(value));
/// assert_eq!(seen.get(), 0);
///
/// source.resolve(7).unwrap();
/// assert_eq!(seen.get(), 7);
/// ```
pub struct ReadyToken<T> {
    shared: SharedReadyState<T>,
}

impl<T> Clone for ReadyToken<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + 'static> ReadyToken<T> {
    /// Checks if the signal has been resolved
    pub fn is_ready(&self) -> bool {
        self.shared.is_ready()
    }

    /// Returns the resolved value, if resolved
    pub fn value(&self) -> Option<T> {
        self.shared.value()
    }

    /// Runs `waiter` once the signal resolves
    ///
    /// Runs immediately when already resolved. Queued waiters run in
    /// registration order.
    pub fn when_ready(&self, waiter: impl FnOnce(T) + 'static) {
        self.shared.when_ready(waiter);
    }
}

impl<T: Clone + 'static> fmt::Debug for ReadyToken<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyToken")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// The resolving side of a readiness signal
///
/// ## Example
///
/// ```
/// use lifecycle::{LifecycleError, ReadySource};
///
/// let source = ReadySource::new();
/// let token = source.token();
///
/// source.resolve("module").unwrap();
/// assert_eq!(token.value(), Some("module"));
/// assert_eq!(source.resolve("again"), Err(LifecycleError::AlreadyResolved));
/// ```
pub struct ReadySource<T> {
    shared: SharedReadyState<T>,
}

impl<T> Clone for ReadySource<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + 'static> ReadySource<T> {
    /// Creates a new unresolved signal
    pub fn new() -> Self {
        Self {
            shared: SharedReadyState::new(),
        }
    }

    /// Creates a token for this signal
    pub fn token(&self) -> ReadyToken<T> {
        ReadyToken {
            shared: self.shared.clone(),
        }
    }

    /// Resolves the signal and runs every queued waiter
    pub fn resolve(&self, value: T) -> Result<(), LifecycleError> {
        self.shared.resolve(value)
    }

    /// Checks if this signal has been resolved
    pub fn is_ready(&self) -> bool {
        self.shared.is_ready()
    }
}

impl<T: Clone + 'static> Default for ReadySource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> fmt::Debug for ReadySource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadySource")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// Errors related to lifecycle operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    AlreadyResolved,
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::AlreadyResolved => write!(f, "Signal was already resolved"),
        }
    }
}

impl core::error::Error for LifecycleError {}

//! # Runtime Capability
//!
//! The precompiled rendering runtime, seen as an opaque object.
//!
//! ## Philosophy
//!
//! **The runtime is a capability, not a dependency.**
//!
//! A controller feeds the runtime source content and reads back its errors.
//! It does NOT:
//! - Parse or validate the hosted source language
//! - Render anything itself
//! - Retry failed loads
//!
//! Methods take `&self`: a runtime handle behaves like a foreign object whose
//! state lives on the other side of the boundary. Implementations may call
//! their handlers from inside any of these methods.

use runtime_types::{ErrorRecord, StatusCode};
use std::fmt;
use std::rc::Rc;

/// Status handler invoked by a runtime instance
pub type StatusHandler = Box<dyn Fn(StatusCode)>;

/// Warning handler invoked by a runtime instance
pub type WarningHandler = Box<dyn Fn(&str)>;

/// Handlers a runtime instance reports through
///
/// Passed once, at construction, to [`RuntimeModule::instantiate`].
pub struct CapabilityHandlers {
    on_status_change: StatusHandler,
    on_warning: WarningHandler,
}

impl CapabilityHandlers {
    /// Creates a handler set from a status and a warning closure
    pub fn new(
        on_status_change: impl Fn(StatusCode) + 'static,
        on_warning: impl Fn(&str) + 'static,
    ) -> Self {
        Self {
            on_status_change: Box::new(on_status_change),
            on_warning: Box::new(on_warning),
        }
    }

    /// Creates a handler set that ignores every report
    pub fn noop() -> Self {
        Self::new(|_| {}, |_| {})
    }

    /// Reports a status change
    pub fn status_changed(&self, code: StatusCode) {
        (self.on_status_change)(code);
    }

    /// Reports a warning
    pub fn warning(&self, text: &str) {
        (self.on_warning)(text);
    }
}

impl fmt::Debug for CapabilityHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityHandlers").finish_non_exhaustive()
    }
}

/// A live runtime instance
pub trait RuntimeCapability {
    /// Replaces the source with inline code
    fn set_source_code(&self, source: &str);

    /// Replaces the source with a URL the runtime fetches
    fn set_source_url(&self, url: &str);

    /// Returns the number of errors currently reported
    fn error_count(&self) -> usize;

    /// Returns the error at `index` (0-indexed), if present
    fn error(&self, index: usize) -> Option<ErrorRecord>;

    /// Makes the runtime's output visible
    fn show(&self);

    /// Releases the runtime instance
    ///
    /// No other method is called after this one.
    fn dispose(&self);
}

/// The instantiated runtime module
///
/// Made available by a module loader once the runtime binary is ready.
pub trait RuntimeModule {
    /// Module name, as requested from the loader
    fn name(&self) -> &str;

    /// Constructs a runtime instance reporting through `handlers`
    fn instantiate(&self, handlers: CapabilityHandlers) -> Rc<dyn RuntimeCapability>;
}

/// Shared handle to a ready runtime module
pub type ModuleHandle = Rc<dyn RuntimeModule>;

//! # Module Loader
//!
//! Asynchronous loader that fetches and instantiates the runtime module.
//!
//! The loader reports progress through [`LoaderEvents`] and, once the
//! module's constructor is reachable, resolves the request's `module_ready`
//! signal. A loader reports `show_canvas` before or after resolving; the
//! controller waits on the signal either way.

use crate::capability::ModuleHandle;
use lifecycle::ReadySource;
use runtime_types::{ElementId, ExitStatus, LoaderStatus};
use std::fmt;
use std::rc::Rc;

/// Presentation callbacks a loader invokes during a module load
pub trait LoaderEvents {
    /// The module is being fetched or compiled
    fn show_loader(&self, status: LoaderStatus);

    /// The module failed to load
    fn show_error(&self, text: &str);

    /// The module exited
    fn show_exit(&self, status: ExitStatus);

    /// The module is about to draw on its canvas
    fn show_canvas(&self);
}

/// One module-load request
pub struct LoadRequest {
    /// Name of the module to load
    pub module_name: String,
    /// Canvases the module renders into
    pub canvas_elements: Vec<ElementId>,
    /// Lifecycle callbacks
    pub events: Rc<dyn LoaderEvents>,
    /// Resolved by the loader once the module can be instantiated
    pub module_ready: ReadySource<ModuleHandle>,
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("module_name", &self.module_name)
            .field("canvas_elements", &self.canvas_elements)
            .field("module_ready", &self.module_ready)
            .finish_non_exhaustive()
    }
}

/// Loader for the runtime module
pub trait ModuleLoader {
    /// Starts loading a module
    ///
    /// Returns immediately; progress is reported through the request's
    /// callbacks. Failures surface through `show_error`, never as a return.
    fn load_module(&mut self, request: LoadRequest);
}

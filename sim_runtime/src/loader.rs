//! # Simulated Module Loader
//!
//! Stores the load request it receives and lets the test play the loader's
//! callbacks in any order.
//!
//! Driver methods return false when no request has been received yet.

use crate::module::SimRuntimeModule;
use runtime_api::{LoadRequest, LoaderEvents, ModuleHandle, ModuleLoader};
use runtime_types::{ElementId, ExitStatus, LoaderStatus};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

#[derive(Default)]
struct LoaderState {
    load_count: usize,
    request: Option<LoadRequest>,
}

/// Shared handle to a simulated loader
#[derive(Clone, Default)]
pub struct SimModuleLoader {
    state: Rc<RefCell<LoaderState>>,
}

impl SimModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a boxed clone for handing to a controller
    pub fn boxed(&self) -> Box<dyn ModuleLoader> {
        Box::new(self.clone())
    }

    /// Returns how many load requests were received
    pub fn load_count(&self) -> usize {
        self.state.borrow().load_count
    }

    /// Returns the module name of the last request
    pub fn module_name(&self) -> Option<String> {
        self.state
            .borrow()
            .request
            .as_ref()
            .map(|request| request.module_name.clone())
    }

    /// Returns the canvases of the last request
    pub fn canvas_elements(&self) -> Vec<ElementId> {
        self.state
            .borrow()
            .request
            .as_ref()
            .map(|request| request.canvas_elements.clone())
            .unwrap_or_default()
    }

    pub fn show_loader(&self, status: LoaderStatus) -> bool {
        self.with_events(|events| events.show_loader(status))
    }

    pub fn show_error(&self, text: &str) -> bool {
        self.with_events(|events| events.show_error(text))
    }

    pub fn show_exit(&self, status: ExitStatus) -> bool {
        self.with_events(|events| events.show_exit(status))
    }

    pub fn show_canvas(&self) -> bool {
        self.with_events(|events| events.show_canvas())
    }

    /// Resolves the request's module signal with `module`
    ///
    /// Returns false without a request or if the signal was already resolved.
    pub fn resolve_module(&self, module: ModuleHandle) -> bool {
        let source = self
            .state
            .borrow()
            .request
            .as_ref()
            .map(|request| request.module_ready.clone());
        let Some(source) = source else {
            return false;
        };

        match source.resolve(module) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "module signal not resolved");
                false
            }
        }
    }

    /// Plays a successful load: download, compile, canvas, module ready
    pub fn complete(&self, module: &SimRuntimeModule) -> bool {
        self.show_loader(LoaderStatus::Downloading)
            && self.show_loader(LoaderStatus::Compiling)
            && self.show_canvas()
            && self.resolve_module(module.handle())
    }

    fn with_events(&self, call: impl FnOnce(&dyn LoaderEvents)) -> bool {
        let events = self
            .state
            .borrow()
            .request
            .as_ref()
            .map(|request| Rc::clone(&request.events));
        match events {
            Some(events) => {
                call(events.as_ref());
                true
            }
            None => false,
        }
    }
}

impl ModuleLoader for SimModuleLoader {
    fn load_module(&mut self, request: LoadRequest) {
        debug!(module = %request.module_name, "load request received");
        let mut state = self.state.borrow_mut();
        state.load_count += 1;
        state.request = Some(request);
    }
}

impl fmt::Debug for SimModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SimModuleLoader")
            .field("load_count", &state.load_count)
            .field("request", &state.request)
            .finish()
    }
}

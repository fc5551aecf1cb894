//! # Simulated Runtime Module
//!
//! A runtime module whose instances record everything pushed into them and
//! report status only when the test says so.

use runtime_api::{CapabilityHandlers, ModuleHandle, RuntimeCapability, RuntimeModule};
use runtime_types::{ErrorRecord, SourceSpec, StatusCode};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

#[derive(Default)]
struct ModuleState {
    instances: usize,
    capability: Option<SimCapability>,
}

/// Shared handle to a simulated runtime module
#[derive(Clone)]
pub struct SimRuntimeModule {
    name: Rc<str>,
    state: Rc<RefCell<ModuleState>>,
}

impl SimRuntimeModule {
    pub fn new(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            state: Rc::new(RefCell::new(ModuleState::default())),
        }
    }

    /// Returns this module as the handle a loader resolves
    pub fn handle(&self) -> ModuleHandle {
        Rc::new(self.clone())
    }

    /// Returns how many instances were constructed
    pub fn instance_count(&self) -> usize {
        self.state.borrow().instances
    }

    /// Returns the most recently constructed instance
    pub fn capability(&self) -> Option<SimCapability> {
        self.state.borrow().capability.clone()
    }
}

impl RuntimeModule for SimRuntimeModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn instantiate(&self, handlers: CapabilityHandlers) -> Rc<dyn RuntimeCapability> {
        let capability = SimCapability::new(handlers);
        let mut state = self.state.borrow_mut();
        state.instances += 1;
        state.capability = Some(capability.clone());
        debug!(module = %self.name, instances = state.instances, "instance constructed");
        Rc::new(capability)
    }
}

impl fmt::Debug for SimRuntimeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimRuntimeModule")
            .field("name", &self.name)
            .field("instances", &self.state.borrow().instances)
            .finish()
    }
}

#[derive(Debug, Default)]
struct CapabilityState {
    last_source: Option<SourceSpec>,
    push_count: usize,
    shown: bool,
    disposed: bool,
    errors: Vec<ErrorRecord>,
}

/// Shared handle to one simulated runtime instance
#[derive(Clone)]
pub struct SimCapability {
    handlers: Rc<CapabilityHandlers>,
    state: Rc<RefCell<CapabilityState>>,
}

impl SimCapability {
    /// Creates an instance reporting through `handlers`
    pub fn new(handlers: CapabilityHandlers) -> Self {
        Self {
            handlers: Rc::new(handlers),
            state: Rc::new(RefCell::new(CapabilityState::default())),
        }
    }

    /// Returns the last source pushed into the instance
    pub fn last_source(&self) -> Option<SourceSpec> {
        self.state.borrow().last_source.clone()
    }

    /// Returns how many times a source was pushed
    pub fn push_count(&self) -> usize {
        self.state.borrow().push_count
    }

    pub fn is_shown(&self) -> bool {
        self.state.borrow().shown
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Reports a status code as the real runtime would
    pub fn report_status(&self, code: impl Into<StatusCode>) {
        self.handlers.status_changed(code.into());
    }

    /// Reports a warning as the real runtime would
    pub fn report_warning(&self, text: &str) {
        self.handlers.warning(text);
    }

    /// Appends an error to the instance's error list
    pub fn push_error(&self, error: ErrorRecord) {
        self.state.borrow_mut().errors.push(error);
    }

    pub fn clear_errors(&self) {
        self.state.borrow_mut().errors.clear();
    }

    fn push_source(&self, source: SourceSpec) {
        let mut state = self.state.borrow_mut();
        state.last_source = Some(source);
        state.push_count += 1;
    }
}

impl RuntimeCapability for SimCapability {
    fn set_source_code(&self, source: &str) {
        self.push_source(SourceSpec::Code(source.to_string()));
    }

    fn set_source_url(&self, url: &str) {
        self.push_source(SourceSpec::Url(url.to_string()));
    }

    fn error_count(&self) -> usize {
        self.state.borrow().errors.len()
    }

    fn error(&self, index: usize) -> Option<ErrorRecord> {
        self.state.borrow().errors.get(index).cloned()
    }

    fn show(&self) {
        self.state.borrow_mut().shown = true;
    }

    fn dispose(&self) {
        self.state.borrow_mut().disposed = true;
    }
}

impl fmt::Debug for SimCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimCapability")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

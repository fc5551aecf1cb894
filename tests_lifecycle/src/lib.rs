//! Lifecycle Test Utilities
//!
//! This crate provides shared utilities for cross-crate integration tests.
//!
//! ## Test Philosophy
//!
//! - **Observable transitions**: Every run state change is recorded and checked
//! - **Deterministic delivery**: Loader progress and frames advance only when driven
//! - **Re-entrancy is normal**: Host callbacks may call back into the controller
//! - **Safe defaults**: Queries on missing collaborators return empty values

use runtime_types::RunState;
use services_frame_scheduler::{FrameCallback, FrameScheduler, PendingRequestObserver};
use services_runtime_host::{ControllerConfig, RuntimeController};
use sim_runtime::{SimDocument, SimFramePrimitive, SimModuleLoader, SimRuntimeModule};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A controller wired to simulated collaborators
pub struct Harness {
    pub controller: Rc<RuntimeController>,
    pub document: SimDocument,
    pub loader: SimModuleLoader,
    pub module: SimRuntimeModule,
    /// Every status notification, in order
    pub statuses: Rc<RefCell<Vec<RunState>>>,
    /// Every forwarded warning, in order
    pub warnings: Rc<RefCell<Vec<String>>>,
}

/// Bootstrap helper for tests
///
/// Creates a controller with a container and recording status/warning
/// handlers.
pub fn test_bootstrap() -> Harness {
    bootstrap_with(|config| config)
}

/// Bootstrap helper that lets the test adjust the configuration last
pub fn bootstrap_with(configure: impl FnOnce(ControllerConfig) -> ControllerConfig) -> Harness {
    let document = SimDocument::new();
    let loader = SimModuleLoader::new();
    let module = SimRuntimeModule::new("qtquickruntime");
    let statuses = Rc::new(RefCell::new(Vec::new()));
    let warnings = Rc::new(RefCell::new(Vec::new()));

    let status_log = statuses.clone();
    let warning_log = warnings.clone();
    let config = ControllerConfig::new()
        .with_container(document.create_container("app"))
        .with_status_handler(move |state| status_log.borrow_mut().push(state))
        .with_warning_handler(move |text| warning_log.borrow_mut().push(text.to_string()));

    let controller = RuntimeController::new(configure(config), document.boxed(), loader.boxed());

    Harness {
        controller: Rc::new(controller),
        document,
        loader,
        module,
        statuses,
        warnings,
    }
}

impl Harness {
    /// Loads and plays a successful module load
    pub fn load_and_complete(&self) {
        self.controller.load().unwrap();
        assert!(self.loader.complete(&self.module));
    }

    /// Returns the recorded status notifications
    pub fn statuses(&self) -> Vec<RunState> {
        self.statuses.borrow().clone()
    }
}

/// Creates a scheduler interposed on a simulated display
pub fn interposed_scheduler() -> (FrameScheduler, SimFramePrimitive) {
    let frames = SimFramePrimitive::new();
    let scheduler = FrameScheduler::new();
    scheduler.interpose(Rc::new(frames.clone())).unwrap();
    (scheduler, frames)
}

/// Frame callback that increments `counter`
pub fn counting_callback(counter: &Rc<Cell<usize>>) -> FrameCallback {
    let counter = counter.clone();
    Box::new(move |_| counter.set(counter.get() + 1))
}

/// Frame callback that appends `name` to `log`
pub fn recording_callback(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> FrameCallback {
    let log = log.clone();
    Box::new(move |_| log.borrow_mut().push(name))
}

/// Pending-request observer recording every notification
pub fn observer_log() -> (Rc<RefCell<Vec<bool>>>, PendingRequestObserver) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let observer: PendingRequestObserver = Rc::new(move |pending: bool| sink.borrow_mut().push(pending));
    (log, observer)
}

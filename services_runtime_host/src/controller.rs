//! # Runtime Controller
//!
//! Owns one runtime capability and exposes it as an observable state machine.
//!
//! ## Transitions
//!
//! - `set_source_code` / `set_source_url` / `load`: force `Loading`
//! - Capability status `0`: `Running`
//! - Any other capability status: `Error`
//!
//! The host is notified only when the state actually changes.
//!
//! ## Re-entrancy
//!
//! Controller state sits behind a `RefCell`. No borrow is held while host
//! callbacks, the loader or the capability run, so each of them may call back
//! into the controller.

use crate::config::{ControllerConfig, PresentationSettings, StatusChangeCallback, WarningCallback};
use crate::presentation::PresentationHandoff;
use crate::ControllerError;
use lifecycle::{ReadySource, ReadyToken};
use runtime_api::{
    CapabilityHandlers, LoadRequest, LoaderEvents, ModuleHandle, ModuleLoader, Presentation,
    RuntimeCapability,
};
use runtime_types::{
    ElementId, ErrorRecord, ExitStatus, LoaderStatus, RunState, SourceSpec, StatusCode,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

struct ControllerInner {
    run_state: RunState,
    source: Option<SourceSpec>,
    capability: Option<Rc<dyn RuntimeCapability>>,
    module: Option<ReadyToken<ModuleHandle>>,
    instantiating: bool,
    loaded: bool,
    disposed: bool,
    handoff: PresentationHandoff,
    settings: PresentationSettings,
    on_status_change: Option<StatusChangeCallback>,
    on_warning: Option<WarningCallback>,
    module_error: Option<String>,
    exit_status: Option<ExitStatus>,
}

type SharedInner = Rc<RefCell<ControllerInner>>;

fn set_run_state(inner: &SharedInner, next: RunState) {
    let callback = {
        let mut state = inner.borrow_mut();
        if state.run_state == next {
            return;
        }
        debug!(from = %state.run_state, to = %next, "run state changed");
        state.run_state = next;
        state.on_status_change.clone()
    };

    if let Some(callback) = callback {
        callback(next);
    }
}

fn capability_handlers(inner: Weak<RefCell<ControllerInner>>) -> CapabilityHandlers {
    let status_target = inner.clone();
    let warning_target = inner;

    CapabilityHandlers::new(
        move |code: StatusCode| {
            let Some(inner) = status_target.upgrade() else {
                return;
            };
            if inner.borrow().disposed {
                debug!(%code, "status from released runtime dropped");
                return;
            }
            debug!(%code, "runtime status reported");
            set_run_state(&inner, code.run_state());
        },
        move |text: &str| {
            let Some(inner) = warning_target.upgrade() else {
                return;
            };
            let callback = {
                let state = inner.borrow();
                if state.disposed {
                    debug!(warning = text, "warning from released runtime dropped");
                    return;
                }
                state.on_warning.clone()
            };
            match callback {
                Some(callback) => callback(text),
                None => debug!(warning = text, "runtime warning dropped"),
            }
        },
    )
}

/// Returns the capability, creating it if the module is ready
fn ensure_capability(inner: &SharedInner) -> Option<Rc<dyn RuntimeCapability>> {
    let module = {
        let mut state = inner.borrow_mut();
        if state.disposed || state.instantiating {
            return None;
        }
        if let Some(capability) = &state.capability {
            return Some(Rc::clone(capability));
        }
        let module = state.module.as_ref().and_then(ReadyToken::value)?;
        state.instantiating = true;
        module
    };

    let capability = module.instantiate(capability_handlers(Rc::downgrade(inner)));

    let disposed = {
        let mut state = inner.borrow_mut();
        state.instantiating = false;
        if !state.disposed {
            state.capability = Some(Rc::clone(&capability));
        }
        state.disposed
    };

    if disposed {
        // Disposed while the instance was being constructed
        capability.dispose();
        return None;
    }

    debug!(module = module.name(), "runtime capability created");
    capability.show();
    Some(capability)
}

/// Copies every reported error, one entry per index below `error_count()`
///
/// An index the capability cannot produce becomes an empty record.
fn snapshot_errors(capability: &dyn RuntimeCapability) -> Vec<ErrorRecord> {
    (0..capability.error_count())
        .map(|index| {
            capability.error(index).unwrap_or_else(|| {
                debug!(index, "runtime error entry missing");
                ErrorRecord::new(String::new())
            })
        })
        .collect()
}

/// Pushes the current source into the capability, if one can exist yet
fn sync_source(inner: &SharedInner) {
    let Some(capability) = ensure_capability(inner) else {
        return;
    };

    let source = inner.borrow().source.clone();
    match source {
        Some(SourceSpec::Code(code)) => capability.set_source_code(&code),
        Some(SourceSpec::Url(url)) => capability.set_source_url(&url),
        None => {}
    }
}

/// Loader callbacks routed back into a controller
struct LoaderEventSink {
    inner: Weak<RefCell<ControllerInner>>,
}

impl LoaderEvents for LoaderEventSink {
    fn show_loader(&self, status: LoaderStatus) {
        debug!(%status, "module loading");
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().handoff.show_placeholder();
        }
    }

    fn show_error(&self, text: &str) {
        warn!(error = text, "module load failed");
        if let Some(inner) = self.inner.upgrade() {
            let mut state = inner.borrow_mut();
            state.module_error = Some(text.to_string());
            state.handoff.show_placeholder();
        }
    }

    fn show_exit(&self, status: ExitStatus) {
        info!(%status, "module exited");
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().exit_status = Some(status);
        }
    }

    fn show_canvas(&self) {
        debug!("module canvas shown");
        let Some(inner) = self.inner.upgrade() else {
            return;
        };

        let module = {
            let mut state = inner.borrow_mut();
            state.handoff.show_canvas();
            state.module.clone()
        };

        // The instance is not constructible until the module resolves
        if let Some(module) = module {
            let target = Rc::downgrade(&inner);
            module.when_ready(move |_| {
                if let Some(inner) = target.upgrade() {
                    sync_source(&inner);
                }
            });
        }
    }
}

/// Lifecycle controller for one runtime instance
pub struct RuntimeController {
    inner: SharedInner,
    loader: RefCell<Box<dyn ModuleLoader>>,
}

impl RuntimeController {
    /// Creates a controller in the `Created` state
    ///
    /// Nothing is mounted and nothing is loaded until [`load`](Self::load).
    pub fn new(
        config: ControllerConfig,
        presentation: Box<dyn Presentation>,
        loader: Box<dyn ModuleLoader>,
    ) -> Self {
        let ControllerConfig {
            container,
            on_status_change,
            on_warning,
            presentation: settings,
        } = config;

        let inner = ControllerInner {
            run_state: RunState::Created,
            source: None,
            capability: None,
            module: None,
            instantiating: false,
            loaded: false,
            disposed: false,
            handoff: PresentationHandoff::new(presentation, container),
            settings,
            on_status_change,
            on_warning,
            module_error: None,
            exit_status: None,
        };

        Self {
            inner: Rc::new(RefCell::new(inner)),
            loader: RefCell::new(loader),
        }
    }

    /// Returns the current run state
    pub fn run_state(&self) -> RunState {
        self.inner.borrow().run_state
    }

    /// Returns a snapshot of the errors the runtime currently reports
    ///
    /// Empty until the runtime instance exists, and again after disposal.
    pub fn errors(&self) -> Vec<ErrorRecord> {
        let capability = self.inner.borrow().capability.clone();
        let Some(capability) = capability else {
            return Vec::new();
        };

        snapshot_errors(capability.as_ref())
    }

    /// Replaces the source with inline code
    pub fn set_source_code(&self, code: impl Into<String>) {
        self.set_source(SourceSpec::Code(code.into()));
    }

    /// Replaces the source with a URL
    pub fn set_source_url(&self, url: impl Into<String>) {
        self.set_source(SourceSpec::Url(url.into()));
    }

    fn set_source(&self, source: SourceSpec) {
        set_run_state(&self.inner, RunState::Loading);
        self.inner.borrow_mut().source = Some(source);
        sync_source(&self.inner);
    }

    /// Sets the element the canvas and placeholder are appended to
    ///
    /// Read once by `load()`; ignored afterwards.
    pub fn set_container(&self, container: ElementId) {
        let mut state = self.inner.borrow_mut();
        if state.loaded {
            debug!(%container, "container ignored after load");
            return;
        }
        state.handoff.set_container(container);
    }

    /// Sets a host-supplied placeholder element
    ///
    /// Read once by `load()`; ignored afterwards.
    pub fn set_placeholder(&self, placeholder: ElementId) {
        let mut state = self.inner.borrow_mut();
        if state.loaded {
            debug!(%placeholder, "placeholder ignored after load");
            return;
        }
        state.handoff.set_placeholder(placeholder);
    }

    /// Mounts the presentation and starts loading the runtime module
    pub fn load(&self) -> Result<(), ControllerError> {
        {
            let mut state = self.inner.borrow_mut();
            if state.disposed {
                return Err(ControllerError::Disposed);
            }
            if state.loaded {
                return Err(ControllerError::AlreadyLoaded);
            }
            if state.handoff.container().is_none() {
                return Err(ControllerError::MissingContainer);
            }
            state.loaded = true;
        }

        set_run_state(&self.inner, RunState::Loading);

        let request = {
            let mut guard = self.inner.borrow_mut();
            let state = &mut *guard;
            let canvas = state.handoff.mount(&state.settings)?;

            let module_ready = ReadySource::new();
            state.module = Some(module_ready.token());

            LoadRequest {
                module_name: state.settings.module_name.clone(),
                canvas_elements: vec![canvas],
                events: Rc::new(LoaderEventSink {
                    inner: Rc::downgrade(&self.inner),
                }),
                module_ready,
            }
        };

        info!(module = %request.module_name, "loading runtime module");
        self.loader.borrow_mut().load_module(request);
        Ok(())
    }

    /// Releases the runtime instance
    ///
    /// No instance is created after this; a second call fails.
    pub fn dispose(&self) -> Result<(), ControllerError> {
        let capability = {
            let mut state = self.inner.borrow_mut();
            if state.disposed {
                return Err(ControllerError::AlreadyDisposed);
            }
            state.disposed = true;
            state.capability.take()
        };

        if let Some(capability) = capability {
            debug!("disposing runtime capability");
            capability.dispose();
        }
        Ok(())
    }

    /// Returns the active source, if any
    pub fn source(&self) -> Option<SourceSpec> {
        self.inner.borrow().source.clone()
    }

    /// Returns true once the runtime instance exists
    pub fn has_capability(&self) -> bool {
        self.inner.borrow().capability.is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.borrow().loaded
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }

    /// Returns the canvas created by `load()`
    pub fn canvas(&self) -> Option<ElementId> {
        self.inner.borrow().handoff.canvas()
    }

    /// Returns the placeholder, host-supplied or created by `load()`
    pub fn placeholder(&self) -> Option<ElementId> {
        self.inner.borrow().handoff.placeholder()
    }

    /// Returns the last text reported through the loader's `show_error`
    pub fn module_error(&self) -> Option<String> {
        self.inner.borrow().module_error.clone()
    }

    /// Returns the loader's exit report, if the module exited
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.inner.borrow().exit_status.clone()
    }
}

impl fmt::Debug for RuntimeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("RuntimeController")
            .field("run_state", &state.run_state)
            .field("source", &state.source)
            .field("has_capability", &state.capability.is_some())
            .field("loaded", &state.loaded)
            .field("disposed", &state.disposed)
            .finish_non_exhaustive()
    }
}

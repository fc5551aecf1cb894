//! # Host Runtime
//!
//! Wires one runtime controller and one frame scheduler to the simulated
//! collaborators and executes script commands against them.

use crate::config::HostConfig;
use crate::script::{HostCommand, HostScript};
use runtime_types::{ErrorRecord, ExitStatus, RunState, SourceSpec};
use serde::{Deserialize, Serialize};
use services_frame_scheduler::{FramePrimitive, FrameScheduler, SchedulerError, SchedulerSnapshot};
use services_runtime_host::{ControllerConfig, ControllerError, RuntimeController};
use sim_runtime::{SimDocument, SimFramePrimitive, SimModuleLoader, SimRuntimeModule};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info};

/// Host runtime error types
#[derive(Debug, Error)]
pub enum HostRuntimeError {
    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Line {line}: {source}")]
    AtLine {
        line: usize,
        source: Box<HostRuntimeError>,
    },

    #[error("No load request has been issued")]
    NoLoadRequest,

    #[error("Runtime module signal already resolved")]
    ModuleAlreadyReady,

    #[error("No runtime instance exists")]
    NoCapability,

    #[error("Snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything observable about the host at one point of the script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    /// Commands executed so far
    pub step: usize,
    pub run_state: RunState,
    pub source: Option<SourceSpec>,
    pub has_capability: bool,
    pub errors: Vec<ErrorRecord>,
    /// Every status notification delivered to the host, in order
    pub status_changes: Vec<RunState>,
    pub warnings: Vec<String>,
    pub module_error: Option<String>,
    pub exit_status: Option<ExitStatus>,
    pub scheduler: SchedulerSnapshot,
    /// Frame callbacks invoked so far
    pub frames_delivered: usize,
    /// Last value the pending-request observer received
    pub frame_pending: Option<bool>,
}

impl HostSnapshot {
    /// Renders the snapshot as one JSON line
    pub fn to_json(&self) -> Result<String, HostRuntimeError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Scripted host runtime
pub struct HostRuntime {
    loader: SimModuleLoader,
    module: SimRuntimeModule,
    frames: SimFramePrimitive,
    scheduler: FrameScheduler,
    controller: RuntimeController,
    status_changes: Rc<RefCell<Vec<RunState>>>,
    warnings: Rc<RefCell<Vec<String>>>,
    frame_pending: Rc<Cell<Option<bool>>>,
    frames_delivered: Rc<Cell<usize>>,
    steps: usize,
}

impl HostRuntime {
    /// Creates a host runtime
    pub fn new(config: HostConfig) -> Result<Self, HostRuntimeError> {
        let document = SimDocument::new();
        let loader = SimModuleLoader::new();
        let module = SimRuntimeModule::new(&config.presentation.module_name);
        let frames = SimFramePrimitive::with_interval(config.frame_interval_ms);

        let status_changes = Rc::new(RefCell::new(Vec::new()));
        let warnings = Rc::new(RefCell::new(Vec::new()));

        let status_log = status_changes.clone();
        let warning_log = warnings.clone();
        let controller_config = ControllerConfig::new()
            .with_container(document.create_container("qtquickruntime-container"))
            .with_status_handler(move |state| status_log.borrow_mut().push(state))
            .with_warning_handler(move |text| warning_log.borrow_mut().push(text.to_string()))
            .with_presentation(config.presentation.clone());
        let controller = RuntimeController::new(controller_config, document.boxed(), loader.boxed());

        let scheduler = FrameScheduler::new();
        let frame_pending = Rc::new(Cell::new(None));
        let pending_log = frame_pending.clone();
        scheduler.set_pending_request_observer(Some(Rc::new(move |pending: bool| {
            pending_log.set(Some(pending));
        })));
        if config.start_paused {
            scheduler.pause();
        }
        if config.interpose_scheduler {
            scheduler.interpose(Rc::new(frames.clone()))?;
        }

        info!(
            module = %config.presentation.module_name,
            paused = config.start_paused,
            interposed = config.interpose_scheduler,
            "host runtime ready"
        );

        Ok(Self {
            loader,
            module,
            frames,
            scheduler,
            controller,
            status_changes,
            warnings,
            frame_pending,
            frames_delivered: Rc::new(Cell::new(0)),
            steps: 0,
        })
    }

    /// Returns the controller under test
    pub fn controller(&self) -> &RuntimeController {
        &self.controller
    }

    /// Returns the frame scheduler
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Executes one command, returning a snapshot for `snapshot`
    pub fn execute(&mut self, command: &HostCommand) -> Result<Option<HostSnapshot>, HostRuntimeError> {
        debug!(?command, step = self.steps, "executing");
        self.steps += 1;

        match command {
            HostCommand::SourceCode(code) => self.controller.set_source_code(code.as_str()),
            HostCommand::SourceUrl(url) => self.controller.set_source_url(url.as_str()),
            HostCommand::Load => self.controller.load()?,
            HostCommand::Dispose => self.controller.dispose()?,
            HostCommand::Loader(status) => self.require_request(self.loader.show_loader(*status))?,
            HostCommand::Canvas => self.require_request(self.loader.show_canvas())?,
            HostCommand::LoadError(text) => self.require_request(self.loader.show_error(text))?,
            HostCommand::Exit(status) => {
                self.require_request(self.loader.show_exit(status.clone()))?
            }
            HostCommand::ModuleReady => {
                if self.loader.load_count() == 0 {
                    return Err(HostRuntimeError::NoLoadRequest);
                }
                if !self.loader.resolve_module(self.module.handle()) {
                    return Err(HostRuntimeError::ModuleAlreadyReady);
                }
            }
            HostCommand::Status(code) => self.capability()?.report_status(*code),
            HostCommand::Warning(text) => self.capability()?.report_warning(text),
            HostCommand::Error(description) => {
                self.capability()?.push_error(ErrorRecord::new(description.as_str()))
            }
            HostCommand::Request(count) => {
                for _ in 0..*count {
                    let delivered = self.frames_delivered.clone();
                    self.scheduler.request_frame(Box::new(move |_| {
                        delivered.set(delivered.get() + 1);
                    }));
                }
            }
            HostCommand::Pause => self.scheduler.pause(),
            HostCommand::Run => self.scheduler.run(),
            HostCommand::Toggle => self.scheduler.toggle_pause(),
            HostCommand::Step => self.scheduler.step(),
            HostCommand::Tick(count) => {
                for _ in 0..*count {
                    self.frames.advance_frame();
                }
            }
            HostCommand::Snapshot => return Ok(Some(self.snapshot())),
        }

        Ok(None)
    }

    /// Executes a whole script, handing every snapshot to `emit`
    ///
    /// A final snapshot is emitted when the script ends. `max_steps` of zero
    /// means no limit.
    pub fn run_script(
        &mut self,
        script: &HostScript,
        max_steps: usize,
        mut emit: impl FnMut(HostSnapshot),
    ) -> Result<(), HostRuntimeError> {
        for (line, command) in script.commands() {
            if max_steps > 0 && self.steps >= max_steps {
                info!(max_steps, "step limit reached");
                break;
            }

            let snapshot = self.execute(command).map_err(|err| HostRuntimeError::AtLine {
                line: *line,
                source: Box::new(err),
            })?;
            if let Some(snapshot) = snapshot {
                emit(snapshot);
            }
        }

        emit(self.snapshot());
        Ok(())
    }

    /// Captures the current host state
    pub fn snapshot(&self) -> HostSnapshot {
        HostSnapshot {
            step: self.steps,
            run_state: self.controller.run_state(),
            source: self.controller.source(),
            has_capability: self.controller.has_capability(),
            errors: self.controller.errors(),
            status_changes: self.status_changes.borrow().clone(),
            warnings: self.warnings.borrow().clone(),
            module_error: self.controller.module_error(),
            exit_status: self.controller.exit_status(),
            scheduler: self.scheduler.snapshot(),
            frames_delivered: self.frames_delivered.get(),
            frame_pending: self.frame_pending.get(),
        }
    }

    fn require_request(&self, delivered: bool) -> Result<(), HostRuntimeError> {
        if delivered {
            Ok(())
        } else {
            Err(HostRuntimeError::NoLoadRequest)
        }
    }

    fn capability(&self) -> Result<sim_runtime::SimCapability, HostRuntimeError> {
        if !self.controller.has_capability() {
            return Err(HostRuntimeError::NoCapability);
        }
        self.module.capability().ok_or(HostRuntimeError::NoCapability)
    }
}

//! # Controller Configuration
//!
//! Host-supplied options for a [`RuntimeController`](crate::RuntimeController).
//!
//! Callbacks live in `ControllerConfig`; the serializable part lives in
//! `PresentationSettings` so hosts can load it from a config file.

use runtime_types::{ElementId, RunState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Invoked on every run state transition
pub type StatusChangeCallback = Rc<dyn Fn(RunState)>;

/// Invoked with the text of every runtime warning
pub type WarningCallback = Rc<dyn Fn(&str)>;

/// Naming of the module and the elements the controller creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationSettings {
    /// Module requested from the loader
    pub module_name: String,
    /// DOM id of the created canvas
    pub canvas_id: String,
    /// DOM id of the default placeholder
    pub placeholder_id: String,
    /// Text of the default placeholder
    pub placeholder_text: String,
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            module_name: "qtquickruntime".to_string(),
            canvas_id: "qtquickruntime-canvas".to_string(),
            placeholder_id: "qtquickruntime-placeholder".to_string(),
            placeholder_text: "Loading".to_string(),
        }
    }
}

/// Runtime controller configuration
#[derive(Clone, Default)]
pub struct ControllerConfig {
    /// Presentation root the canvas and placeholder are appended to
    pub container: Option<ElementId>,
    /// Run state observer
    pub on_status_change: Option<StatusChangeCallback>,
    /// Warning observer; warnings are dropped without one
    pub on_warning: Option<WarningCallback>,
    /// Module and element naming
    pub presentation: PresentationSettings,
}

impl ControllerConfig {
    /// Creates a configuration with no container and no observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the presentation root
    pub fn with_container(mut self, container: ElementId) -> Self {
        self.container = Some(container);
        self
    }

    /// Sets the run state observer
    pub fn with_status_handler(mut self, handler: impl Fn(RunState) + 'static) -> Self {
        self.on_status_change = Some(Rc::new(handler));
        self
    }

    /// Sets the warning observer
    pub fn with_warning_handler(mut self, handler: impl Fn(&str) + 'static) -> Self {
        self.on_warning = Some(Rc::new(handler));
        self
    }

    /// Replaces the presentation settings
    pub fn with_presentation(mut self, presentation: PresentationSettings) -> Self {
        self.presentation = presentation;
        self
    }
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("container", &self.container)
            .field("on_status_change", &self.on_status_change.is_some())
            .field("on_warning", &self.on_warning.is_some())
            .field("presentation", &self.presentation)
            .finish()
    }
}

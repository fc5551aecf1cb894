//! Placeholder/canvas handoff.
//!
//! `mount` creates the controller's single canvas and its placeholder; the
//! loader callbacks then flip which of the two is visible.

use crate::config::PresentationSettings;
use crate::ControllerError;
use runtime_api::Presentation;
use runtime_types::ElementId;

pub(crate) struct PresentationHandoff {
    surface: Box<dyn Presentation>,
    container: Option<ElementId>,
    placeholder: Option<ElementId>,
    canvas: Option<ElementId>,
}

impl PresentationHandoff {
    pub(crate) fn new(surface: Box<dyn Presentation>, container: Option<ElementId>) -> Self {
        Self {
            surface,
            container,
            placeholder: None,
            canvas: None,
        }
    }

    pub(crate) fn set_container(&mut self, container: ElementId) {
        self.container = Some(container);
    }

    pub(crate) fn set_placeholder(&mut self, placeholder: ElementId) {
        self.placeholder = Some(placeholder);
    }

    pub(crate) fn container(&self) -> Option<ElementId> {
        self.container
    }

    pub(crate) fn placeholder(&self) -> Option<ElementId> {
        self.placeholder
    }

    pub(crate) fn canvas(&self) -> Option<ElementId> {
        self.canvas
    }

    /// Appends the canvas and the placeholder to the container
    ///
    /// A host-supplied placeholder is reused; otherwise a default one is
    /// created from `settings`.
    pub(crate) fn mount(
        &mut self,
        settings: &PresentationSettings,
    ) -> Result<ElementId, ControllerError> {
        let container = self.container.ok_or(ControllerError::MissingContainer)?;

        let canvas = self.surface.create_canvas(&settings.canvas_id);
        self.surface.append_child(container, canvas);

        let placeholder = match self.placeholder {
            Some(placeholder) => placeholder,
            None => self
                .surface
                .create_placeholder(&settings.placeholder_id, &settings.placeholder_text),
        };
        self.surface.append_child(container, placeholder);

        self.canvas = Some(canvas);
        self.placeholder = Some(placeholder);
        Ok(canvas)
    }

    pub(crate) fn show_placeholder(&mut self) {
        self.swap_visibility(true);
    }

    pub(crate) fn show_canvas(&mut self) {
        self.swap_visibility(false);
    }

    fn swap_visibility(&mut self, placeholder_visible: bool) {
        if let Some(placeholder) = self.placeholder {
            self.surface.set_visible(placeholder, placeholder_visible);
        }
        if let Some(canvas) = self.canvas {
            self.surface.set_visible(canvas, !placeholder_visible);
        }
    }
}

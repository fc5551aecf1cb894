//! # Simulated Document
//!
//! In-memory element tree implementing [`Presentation`].

use runtime_api::Presentation;
use runtime_types::ElementId;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// What an element was created as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Container,
    Canvas,
    Placeholder,
}

/// One element of the simulated document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimElement {
    pub kind: ElementKind,
    pub dom_id: String,
    /// Text content (placeholders only)
    pub text: Option<String>,
    pub visible: bool,
    pub children: Vec<ElementId>,
}

impl SimElement {
    fn new(kind: ElementKind, dom_id: &str) -> Self {
        Self {
            kind,
            dom_id: dom_id.to_string(),
            text: None,
            visible: true,
            children: Vec::new(),
        }
    }
}

/// Shared handle to an in-memory document
#[derive(Debug, Clone, Default)]
pub struct SimDocument {
    elements: Rc<RefCell<HashMap<ElementId, SimElement>>>,
}

impl SimDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a boxed clone for handing to a controller
    pub fn boxed(&self) -> Box<dyn Presentation> {
        Box::new(self.clone())
    }

    /// Creates a detached container element
    pub fn create_container(&self, dom_id: &str) -> ElementId {
        self.insert(SimElement::new(ElementKind::Container, dom_id))
    }

    pub fn element(&self, id: ElementId) -> Option<SimElement> {
        self.elements.borrow().get(&id).cloned()
    }

    /// Returns the children of `id` in append order
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.elements
            .borrow()
            .get(&id)
            .map(|element| element.children.clone())
            .unwrap_or_default()
    }

    /// Returns false for hidden or unknown elements
    pub fn is_visible(&self, id: ElementId) -> bool {
        self.elements
            .borrow()
            .get(&id)
            .is_some_and(|element| element.visible)
    }

    pub fn element_count(&self) -> usize {
        self.elements.borrow().len()
    }

    fn insert(&self, element: SimElement) -> ElementId {
        let id = ElementId::new();
        self.elements.borrow_mut().insert(id, element);
        id
    }
}

impl Presentation for SimDocument {
    fn create_canvas(&mut self, dom_id: &str) -> ElementId {
        self.insert(SimElement::new(ElementKind::Canvas, dom_id))
    }

    fn create_placeholder(&mut self, dom_id: &str, text: &str) -> ElementId {
        let mut element = SimElement::new(ElementKind::Placeholder, dom_id);
        element.text = Some(text.to_string());
        self.insert(element)
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        let mut elements = self.elements.borrow_mut();
        match elements.get_mut(&parent) {
            Some(parent) => parent.children.push(child),
            None => tracing::debug!(%parent, "append to unknown element ignored"),
        }
    }

    fn set_visible(&mut self, element: ElementId, visible: bool) {
        if let Some(element) = self.elements.borrow_mut().get_mut(&element) {
            element.visible = visible;
        }
    }
}

//! # Presentation Surface
//!
//! The document the controller mounts its canvas and placeholder into.
//!
//! This trait does NOT:
//! - Lay out elements (created elements fill their parent)
//! - Style anything beyond visibility
//! - Remove elements

use runtime_types::ElementId;

/// Document operations needed for the placeholder/canvas handoff
pub trait Presentation {
    /// Creates a canvas element with the given DOM id
    fn create_canvas(&mut self, dom_id: &str) -> ElementId;

    /// Creates a placeholder element showing `text`
    fn create_placeholder(&mut self, dom_id: &str, text: &str) -> ElementId;

    /// Appends `child` to `parent`
    fn append_child(&mut self, parent: ElementId, child: ElementId);

    /// Shows or hides an element
    fn set_visible(&mut self, element: ElementId, visible: bool);
}

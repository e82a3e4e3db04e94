//! The rendering collaborator.
//!
//! The controller never draws anything. After every transition it hands the
//! renderer a read-only view of its state and the current query; the
//! renderer forwards user gestures back through the controller's entry
//! points.

use crate::error::RenderError;
use crate::state::ControllerState;

/// What the renderer needs to know when the controller attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachContext<'a> {
    /// Opaque template reference from the options.
    pub template: &'a str,
    /// Selector of the element to place the popup in, or `None` for the
    /// input's parent.
    pub anchor: Option<&'a str>,
    /// Whether the shadow input should be created.
    pub shadow_input: bool,
    /// Whether query matches should be emphasized.
    pub bold_matches: bool,
}

/// Draws the popup and the shadow input.
pub trait Renderer {
    /// Prepare the popup. Failing here aborts controller construction.
    fn attach(&mut self, _context: &AttachContext<'_>) -> Result<(), RenderError> {
        Ok(())
    }

    /// Redraw from the given state.
    fn render(&mut self, state: &ControllerState, query: &str);

    /// Tear down whatever `attach` created.
    fn detach(&mut self) {}
}

/// A renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _state: &ControllerState, _query: &str) {}
}

impl<F> Renderer for F
where
    F: FnMut(&ControllerState, &str),
{
    fn render(&mut self, state: &ControllerState, query: &str) {
        self(state, query)
    }
}

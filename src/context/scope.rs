//! Captured tree positions for deferred mounts.

use std::rc::Rc;

use super::frame::{ContextFrame, current_frame, with_frame};

/// Snapshot of the frame chain at one tree position.
///
/// Control flow captures a scope when it is declared and re-enters it each
/// time it mounts children later, so those children resolve contexts as if
/// they had mounted in place.
#[derive(Clone, Debug, Default)]
pub struct ContextScope {
    frame: Option<Rc<ContextFrame>>,
}

impl ContextScope {
    /// Capture the current position.
    pub fn capture() -> Self {
        Self {
            frame: current_frame(),
        }
    }

    /// The root position: no providers.
    pub fn root() -> Self {
        Self { frame: None }
    }

    /// Innermost captured frame.
    pub fn frame(&self) -> Option<&Rc<ContextFrame>> {
        self.frame.as_ref()
    }

    /// Run `f` at the captured position.
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        with_frame(self.frame.clone(), f)
    }
}

//! Context frames and the current-frame slot.
//!
//! Frames form a singly linked chain from the innermost provider out to the
//! root. During a mount pass the innermost frame sits in a thread-local slot;
//! providers swap their own frame in while their children mount and put the
//! previous one back afterwards.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Identifies one context definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

thread_local! {
    /// Innermost frame of the mount pass in progress.
    static CURRENT_FRAME: RefCell<Option<Rc<ContextFrame>>> = const { RefCell::new(None) };

    /// Counter for context ids.
    static NEXT_CONTEXT_ID: Cell<u64> = const { Cell::new(0) };
}

pub(crate) fn next_context_id() -> ContextId {
    NEXT_CONTEXT_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        ContextId(id)
    })
}

// =============================================================================
// Context Frame
// =============================================================================

/// Value installed by one provider at its mount point.
///
/// Immutable once created. A provider that remounts builds a new frame.
pub struct ContextFrame {
    context: ContextId,
    raw: Rc<dyn Any>,
    resolved: Rc<dyn Any>,
    parent: Option<Rc<ContextFrame>>,
}

impl ContextFrame {
    pub(crate) fn new(
        context: ContextId,
        raw: Rc<dyn Any>,
        resolved: Rc<dyn Any>,
        parent: Option<Rc<ContextFrame>>,
    ) -> Self {
        Self {
            context,
            raw,
            resolved,
            parent,
        }
    }

    /// Context this frame belongs to.
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Enclosing frame, of any context.
    pub fn parent(&self) -> Option<&Rc<ContextFrame>> {
        self.parent.as_ref()
    }

    /// The provider's raw input, if it has type `R`.
    pub fn raw<R: 'static>(&self) -> Option<&R> {
        self.raw.downcast_ref()
    }

    /// The transformed value, if it has type `T`.
    pub fn resolved<T: 'static>(&self) -> Option<&T> {
        self.resolved.downcast_ref()
    }

    /// Walk from `start` outward to the nearest frame of `context`.
    pub fn find(start: &Rc<ContextFrame>, context: ContextId) -> Option<Rc<ContextFrame>> {
        let mut frame = Some(start);
        while let Some(current) = frame {
            if current.context == context {
                return Some(current.clone());
            }
            frame = current.parent.as_ref();
        }
        None
    }

    /// Number of frames from this one to the root, inclusive.
    pub fn chain_len(&self) -> usize {
        let mut len = 1;
        let mut frame = self.parent.as_ref();
        while let Some(current) = frame {
            len += 1;
            frame = current.parent.as_ref();
        }
        len
    }
}

impl std::fmt::Debug for ContextFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextFrame")
            .field("context", &self.context)
            .field("chain_len", &self.chain_len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Current Frame
// =============================================================================

/// Innermost frame at the current mount position.
pub fn current_frame() -> Option<Rc<ContextFrame>> {
    CURRENT_FRAME.with(|slot| slot.borrow().clone())
}

/// Restores the previous frame on drop, so a panicking child can't leave a
/// stale frame installed.
struct FrameGuard {
    previous: Option<Rc<ContextFrame>>,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT_FRAME.with(|slot| *slot.borrow_mut() = previous);
    }
}

/// Run `f` with `frame` installed as the current frame.
pub(crate) fn with_frame<R>(frame: Option<Rc<ContextFrame>>, f: impl FnOnce() -> R) -> R {
    let previous = CURRENT_FRAME.with(|slot| std::mem::replace(&mut *slot.borrow_mut(), frame));
    let _guard = FrameGuard { previous };
    f()
}

//! Context definitions - provide and consume.

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::frame::{ContextFrame, ContextId, current_frame, next_context_id, with_frame};
use crate::primitives::{Cleanup, Component, mount_all};

type Transform<R, T> = dyn Fn(&R, Option<&T>) -> T;

struct ContextInner<R, T> {
    id: ContextId,
    default: T,
    transform: Box<Transform<R, T>>,
}

/// A context type: raw provider input `R`, resolved value `T`.
///
/// Cloning is cheap and yields the same context.
pub struct Context<R, T> {
    inner: Rc<ContextInner<R, T>>,
}

impl<R, T> fmt::Debug for Context<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("id", &self.inner.id).finish_non_exhaustive()
    }
}

impl<R, T> Clone for Context<R, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Define a context.
///
/// `transform(raw, parent)` combines a provider's raw input with the value
/// resolved by the nearest enclosing provider of the same context (`None` at
/// the outermost provider). It must be pure.
pub fn create_context<R, T>(
    default: T,
    transform: impl Fn(&R, Option<&T>) -> T + 'static,
) -> Context<R, T>
where
    R: 'static,
    T: Clone + 'static,
{
    Context {
        inner: Rc::new(ContextInner {
            id: next_context_id(),
            default,
            transform: Box::new(transform),
        }),
    }
}

impl<R, T> Context<R, T>
where
    R: 'static,
    T: Clone + 'static,
{
    /// Id of this context definition.
    pub fn id(&self) -> ContextId {
        self.inner.id
    }

    /// Value seen by consumers with no provider above them.
    pub fn default_value(&self) -> &T {
        &self.inner.default
    }

    /// Nearest frame of this context above the current mount position.
    pub fn nearest_frame(&self) -> Option<Rc<ContextFrame>> {
        current_frame().and_then(|frame| ContextFrame::find(&frame, self.inner.id))
    }

    /// Resolve the value visible at the current mount position.
    pub fn resolve(&self) -> T {
        self.nearest_frame()
            .and_then(|frame| frame.resolved::<T>().cloned())
            .unwrap_or_else(|| self.inner.default.clone())
    }

    /// Provider component.
    ///
    /// When mounted, installs a new frame holding `raw` and its resolved
    /// value, mounts `children` beneath it, then restores the enclosing
    /// frame. The returned cleanup unmounts the children in reverse order.
    pub fn provide(&self, raw: R, children: Vec<Component>) -> Component {
        let context = self.clone();
        Box::new(move || {
            let parent = current_frame();
            let inherited = parent
                .as_ref()
                .and_then(|frame| ContextFrame::find(frame, context.inner.id));
            let resolved = (context.inner.transform)(
                &raw,
                inherited.as_ref().and_then(|frame| frame.resolved::<T>()),
            );

            let frame = Rc::new(ContextFrame::new(
                context.inner.id,
                Rc::new(raw),
                Rc::new(resolved),
                parent,
            ));
            trace!(context = ?context.inner.id, depth = frame.chain_len(), "context frame installed");

            with_frame(Some(frame), || mount_all(children))
        })
    }

    /// Consumer component.
    ///
    /// Resolution happens once, when the returned component mounts. Later
    /// provider remounts do not reach an already mounted consumer.
    pub fn consume<F, C>(&self, component: F) -> Component
    where
        F: FnOnce(T) -> C + 'static,
        C: Into<Cleanup>,
    {
        let context = self.clone();
        Box::new(move || component(context.resolve()).into())
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Primitive types - components and cleanup.
//!
//! A component is a mountable unit: a one-shot closure that, when called,
//! performs its mount-time work (resolving contexts, registering resources,
//! mounting children) and hands back the [`Cleanup`] that undoes it.

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by mounted components.
///
/// Call this to unmount the component and release its resources.
pub type Cleanup = Box<dyn FnOnce()>;

/// Cleanup that does nothing.
pub fn noop_cleanup() -> Cleanup {
    Box::new(|| {})
}

// =============================================================================
// Component
// =============================================================================

/// A mountable unit. Calling it mounts the component at the current tree
/// position.
pub type Component = Box<dyn FnOnce() -> Cleanup>;

/// Mount a component at the current tree position.
pub fn mount(component: Component) -> Cleanup {
    component()
}

/// Group several components into one. Children mount in order and unmount
/// in reverse order.
pub fn fragment(children: Vec<Component>) -> Component {
    Box::new(move || mount_all(children))
}

/// Mount every child in order, returning a cleanup that tears them down in
/// reverse order.
pub(crate) fn mount_all(children: Vec<Component>) -> Cleanup {
    let cleanups: Vec<Cleanup> = children.into_iter().map(|child| child()).collect();
    Box::new(move || {
        for cleanup in cleanups.into_iter().rev() {
            cleanup();
        }
    })
}

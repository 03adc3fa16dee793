//! Host targets - where rendered winners end up.
//!
//! The render sink never rebuilds its host. It forwards three incremental
//! operations, each addressed by position in the sink's ordered collection:
//!
//! - [`HeadTarget::insert`] - a group got its first winner (always appended)
//! - [`HeadTarget::replace`] - a group's winner changed
//! - [`HeadTarget::remove`] - a group lost its last entry
//!
//! Two targets ship with the crate:
//! - [`MemoryHead`] - shared in-memory list, for headless use and tests
//! - [`TerminalHead`] - mirrors the winning title into the terminal window title

mod memory;
mod terminal;

use std::rc::Rc;

use crate::types::HeadNode;

pub use memory::{HostOps, MemoryHead};
pub use terminal::{TerminalHead, terminal_host};

/// Receiver of incremental render-sink updates.
pub trait HeadTarget {
    /// A new node appears at `index`.
    fn insert(&mut self, index: usize, node: &HeadNode);

    /// The node at `index` is swapped for `node`.
    fn replace(&mut self, index: usize, node: &HeadNode);

    /// The node at `index` disappears.
    fn remove(&mut self, index: usize);
}

/// Produces the host target the first time the sink mounts.
///
/// Returning `None` means no host is available; the sink then stays
/// unmounted for good and the registry keeps working headless.
pub type HostSource = Rc<dyn Fn() -> Option<Box<dyn HeadTarget>>>;

/// Host source that always yields `target`'s shared list.
pub fn memory_host(target: &MemoryHead) -> HostSource {
    let target = target.clone();
    Rc::new(move || Some(Box::new(target.clone()) as Box<dyn HeadTarget>))
}

/// Host source for environments without a head.
pub fn no_host() -> HostSource {
    Rc::new(|| None)
}

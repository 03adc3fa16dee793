//! In-memory head target.

use std::cell::RefCell;
use std::rc::Rc;

use super::HeadTarget;
use crate::types::HeadNode;

/// Counters of host operations received, for asserting incremental updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostOps {
    /// `insert` calls.
    pub inserts: usize,
    /// `replace` calls.
    pub replaces: usize,
    /// `remove` calls.
    pub removes: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    nodes: Vec<HeadNode>,
    ops: HostOps,
}

/// Ordered list of head nodes shared between clones.
///
/// Hand one clone to the registry through [`memory_host`](super::memory_host)
/// and keep another to inspect what was rendered.
#[derive(Debug, Clone, Default)]
pub struct MemoryHead {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryHead {
    /// Empty head.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered nodes in order.
    pub fn nodes(&self) -> Vec<HeadNode> {
        self.state.borrow().nodes.clone()
    }

    /// Number of rendered nodes.
    pub fn len(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    /// True when nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().nodes.is_empty()
    }

    /// Operations received so far.
    pub fn ops(&self) -> HostOps {
        self.state.borrow().ops
    }

    /// Text of the first rendered title.
    pub fn title(&self) -> Option<String> {
        self.state
            .borrow()
            .nodes
            .iter()
            .find_map(|node| node.element().as_title().map(str::to_string))
    }
}

impl HeadTarget for MemoryHead {
    fn insert(&mut self, index: usize, node: &HeadNode) {
        let mut state = self.state.borrow_mut();
        let index = index.min(state.nodes.len());
        state.nodes.insert(index, node.clone());
        state.ops.inserts += 1;
    }

    fn replace(&mut self, index: usize, node: &HeadNode) {
        let mut state = self.state.borrow_mut();
        if let Some(slot) = state.nodes.get_mut(index) {
            *slot = node.clone();
            state.ops.replaces += 1;
        }
    }

    fn remove(&mut self, index: usize) {
        let mut state = self.state.borrow_mut();
        if index < state.nodes.len() {
            state.nodes.remove(index);
            state.ops.removes += 1;
        }
    }
}

//! Render Sink - the ordered collection of rendered winners.
//!
//! One sink per registry. It holds at most one item per group, in the order
//! groups first produced a winner, and forwards every change to the host
//! target as a single positional operation. A group whose winner did not
//! change produces no host call at all, so a winning node is never torn down
//! and rebuilt just because a loser came or went.
//!
//! # Mount state
//!
//! ```text
//! Pending ──(first register, host available)──► Mounted
//!    └─────(first register, no host)───────────► Detached
//! ```
//!
//! Neither end state can be left. A detached sink still tracks its items.

use std::cell::RefCell;

use spark_signals::{Signal, signal};
use tracing::debug;

use super::registry::RegistryEntry;
use crate::host::{HeadTarget, HostSource};
use crate::types::{EntryId, HeadNode};

/// Externally visible winner of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedWinner {
    /// Group the winner belongs to.
    pub group: String,
    /// Winning entry.
    pub id: EntryId,
    /// Winning resource.
    pub resource: HeadNode,
}

impl From<&RegistryEntry> for RenderedWinner {
    fn from(entry: &RegistryEntry) -> Self {
        Self {
            group: entry.group.clone(),
            id: entry.id,
            resource: entry.resource.clone(),
        }
    }
}

/// Mount state of a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStatus {
    /// Not mounted yet.
    Pending,
    /// Projecting into a host.
    Mounted,
    /// No host was available; never mounts.
    Detached,
}

/// What one `set_rendered_winner` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkChange {
    /// Same winner as before, or nothing to remove.
    Unchanged,
    /// First winner for the group, appended.
    Inserted,
    /// New winner replaced the old one in place.
    Replaced,
    /// Group emptied, item removed.
    Removed,
}

enum SinkState {
    Pending,
    Mounted(Box<dyn HeadTarget>),
    Detached,
}

/// Ordered collection kept in sync with a registry's winners.
pub struct RenderSink {
    items: RefCell<Vec<RenderedWinner>>,
    state: RefCell<SinkState>,
    published: Signal<Vec<RenderedWinner>>,
}

impl RenderSink {
    /// Unmounted, empty sink.
    pub fn new() -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            state: RefCell::new(SinkState::Pending),
            published: signal(Vec::new()),
        }
    }

    /// Current mount state.
    pub fn status(&self) -> SinkStatus {
        match *self.state.borrow() {
            SinkState::Pending => SinkStatus::Pending,
            SinkState::Mounted(_) => SinkStatus::Mounted,
            SinkState::Detached => SinkStatus::Detached,
        }
    }

    /// Mount into the host produced by `source`, at most once.
    ///
    /// Only the first call does anything. Without a source, or when the
    /// source yields no host, the sink becomes detached permanently.
    pub fn ensure_mounted(&self, source: Option<&HostSource>) -> SinkStatus {
        if !matches!(*self.state.borrow(), SinkState::Pending) {
            return self.status();
        }

        let target = source.and_then(|source| source());
        let mut state = self.state.borrow_mut();
        match target {
            Some(mut target) => {
                for (index, item) in self.items.borrow().iter().enumerate() {
                    target.insert(index, &item.resource);
                }
                *state = SinkState::Mounted(target);
                debug!("render sink mounted");
                SinkStatus::Mounted
            }
            None => {
                *state = SinkState::Detached;
                debug!("no head host available, render sink detached");
                SinkStatus::Detached
            }
        }
    }

    /// Upsert or remove the rendered item for `group`.
    ///
    /// `None` removes the item. A new winner replaces the existing item at
    /// its position, or is appended when the group has none yet.
    pub fn set_rendered_winner(&self, group: &str, winner: Option<&RegistryEntry>) -> SinkChange {
        let change = {
            let mut items = self.items.borrow_mut();
            let position = items.iter().position(|item| item.group == group);

            match (position, winner) {
                (None, None) => SinkChange::Unchanged,
                (Some(index), None) => {
                    items.remove(index);
                    self.project(|target| target.remove(index));
                    SinkChange::Removed
                }
                (Some(index), Some(winner)) if items[index].id == winner.id => SinkChange::Unchanged,
                (Some(index), Some(winner)) => {
                    items[index] = RenderedWinner::from(winner);
                    self.project(|target| target.replace(index, &winner.resource));
                    SinkChange::Replaced
                }
                (None, Some(winner)) => {
                    items.push(RenderedWinner::from(winner));
                    let index = items.len() - 1;
                    self.project(|target| target.insert(index, &winner.resource));
                    SinkChange::Inserted
                }
            }
        };

        if change != SinkChange::Unchanged {
            let snapshot = self.items.borrow().clone();
            self.published.set(snapshot);
        }
        change
    }

    fn project(&self, op: impl FnOnce(&mut dyn HeadTarget)) {
        if let SinkState::Mounted(target) = &mut *self.state.borrow_mut() {
            op(target.as_mut());
        }
    }

    /// Rendered items, read reactively (tracks a dependency inside effects).
    pub fn rendered(&self) -> Vec<RenderedWinner> {
        self.published.get()
    }

    /// Rendered items without tracking.
    pub fn items(&self) -> Vec<RenderedWinner> {
        self.items.borrow().clone()
    }

    /// Rendered item for `group`.
    pub fn get(&self, group: &str) -> Option<RenderedWinner> {
        self.items.borrow().iter().find(|item| item.group == group).cloned()
    }

    /// Number of rendered items.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// True when nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl Default for RenderSink {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostOps, MemoryHead, memory_host, no_host};
    use std::cell::Cell;
    use std::rc::Rc;

    fn entry(id: u64, group: &str, title: &str) -> RegistryEntry {
        RegistryEntry {
            id: EntryId(id),
            group: group.to_string(),
            resource: HeadNode::title(title),
            depth: 0,
            sequence: id,
        }
    }

    fn mounted() -> (RenderSink, MemoryHead) {
        let head = MemoryHead::new();
        let sink = RenderSink::new();
        assert_eq!(sink.ensure_mounted(Some(&memory_host(&head))), SinkStatus::Mounted);
        (sink, head)
    }

    #[test]
    fn test_insert_replace_remove() {
        let (sink, head) = mounted();
        let a = entry(0, "a", "A");
        let b = entry(1, "b", "B");
        let a2 = entry(2, "a", "A2");

        assert_eq!(sink.set_rendered_winner("a", Some(&a)), SinkChange::Inserted);
        assert_eq!(sink.set_rendered_winner("b", Some(&b)), SinkChange::Inserted);
        assert_eq!(sink.set_rendered_winner("a", Some(&a2)), SinkChange::Replaced);

        // Replacement keeps position.
        let groups: Vec<String> = sink.items().into_iter().map(|item| item.group).collect();
        assert_eq!(groups, vec!["a", "b"]);
        assert_eq!(head.nodes(), vec![a2.resource.clone(), b.resource.clone()]);

        assert_eq!(sink.set_rendered_winner("a", None), SinkChange::Removed);
        assert_eq!(head.nodes(), vec![b.resource.clone()]);
        assert_eq!(sink.set_rendered_winner("a", None), SinkChange::Unchanged);
    }

    #[test]
    fn test_same_winner_is_noop() {
        let (sink, head) = mounted();
        let a = entry(0, "a", "A");

        sink.set_rendered_winner("a", Some(&a));
        assert_eq!(sink.set_rendered_winner("a", Some(&a)), SinkChange::Unchanged);
        assert_eq!(
            head.ops(),
            HostOps {
                inserts: 1,
                replaces: 0,
                removes: 0
            },
            "host must not see a second operation"
        );
    }

    #[test]
    fn test_mount_once() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let head = MemoryHead::new();
        let head_clone = head.clone();
        let source: HostSource = Rc::new(move || {
            calls_clone.set(calls_clone.get() + 1);
            Some(Box::new(head_clone.clone()) as Box<dyn HeadTarget>)
        });

        let sink = RenderSink::new();
        assert_eq!(sink.status(), SinkStatus::Pending);
        sink.ensure_mounted(Some(&source));
        sink.ensure_mounted(Some(&source));

        assert_eq!(calls.get(), 1);
        assert_eq!(sink.status(), SinkStatus::Mounted);
    }

    #[test]
    fn test_detached_keeps_bookkeeping() {
        let sink = RenderSink::new();
        assert_eq!(sink.ensure_mounted(Some(&no_host())), SinkStatus::Detached);

        // A host showing up later is ignored.
        let head = MemoryHead::new();
        assert_eq!(sink.ensure_mounted(Some(&memory_host(&head))), SinkStatus::Detached);

        sink.set_rendered_winner("a", Some(&entry(0, "a", "A")));
        assert_eq!(sink.len(), 1);
        assert!(head.is_empty());
    }

    #[test]
    fn test_late_mount_projects_existing_items() {
        let sink = RenderSink::new();
        sink.set_rendered_winner("a", Some(&entry(0, "a", "A")));

        let head = MemoryHead::new();
        sink.ensure_mounted(Some(&memory_host(&head)));

        assert_eq!(head.title().as_deref(), Some("A"));
    }

    #[test]
    fn test_rendered_is_reactive() {
        use spark_signals::effect;

        let sink = Rc::new(RenderSink::new());
        let seen = Rc::new(Cell::new(usize::MAX));
        let sink_clone = sink.clone();
        let seen_clone = seen.clone();

        let _stop = effect(move || {
            seen_clone.set(sink_clone.rendered().len());
        });
        assert_eq!(seen.get(), 0);

        sink.set_rendered_winner("a", Some(&entry(0, "a", "A")));
        assert_eq!(seen.get(), 1);

        sink.set_rendered_winner("a", None);
        assert_eq!(seen.get(), 0);
    }
}

//! Group Registry - winner arbitration per resource group.
//!
//! Every contributor registers an entry under a group name. Per group, the
//! entry with the greatest depth wins; equal depths go to the most recent
//! registration (greatest sequence). The winner is recomputed synchronously
//! on every register and dispose, and pushed to the render sink.
//!
//! - Sequence numbers come from one counter per registry, bumped once per
//!   `register`, never reused.
//! - A group exists only while it has at least one live entry.
//! - Anonymous group names start with [`ANONYMOUS_MARKER`]; named
//!   registrations may not, so the two can never collide.
//! - Disposers are idempotent and outlive their group (and the registry).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::sink::{RenderSink, RenderedWinner, SinkChange, SinkStatus};
use crate::config::RegistryConfig;
use crate::error::{HeadError, HeadResult};
use crate::primitives::Cleanup;
use crate::types::{EntryId, HeadNode};

// =============================================================================
// Entries and Groups
// =============================================================================

/// One live contribution to a group. Immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    /// Unique token.
    pub id: EntryId,
    /// Group the entry competes in.
    pub group: String,
    /// Contributed resource.
    pub resource: HeadNode,
    /// Provider depth of the contributor.
    pub depth: i32,
    /// Registration order across the whole registry.
    pub sequence: u64,
}

/// A registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Target group.
    pub group: String,
    /// Resource to contribute. `None` is rejected.
    pub resource: Option<HeadNode>,
    /// Provider depth of the contributor.
    pub depth: i32,
}

impl Registration {
    /// Request contributing `resource` to `group` at `depth`.
    pub fn new(group: impl Into<String>, resource: HeadNode, depth: i32) -> Self {
        Self {
            group: group.into(),
            resource: Some(resource),
            depth,
        }
    }
}

/// First character of every synthesized anonymous group name.
pub const ANONYMOUS_MARKER: char = '#';

/// True for group names only the registry itself may hand out.
pub fn is_reserved_group(group: &str) -> bool {
    group.starts_with(ANONYMOUS_MARKER)
}

#[derive(Debug)]
struct GroupState {
    entries: HashMap<EntryId, RegistryEntry>,
    creation_order: u64,
}

impl GroupState {
    fn new(creation_order: u64) -> Self {
        Self {
            entries: HashMap::new(),
            creation_order,
        }
    }

    fn pick_winner(&self) -> Option<&RegistryEntry> {
        pick_winner(self.entries.values())
    }
}

/// Pick the winner among `entries`: greatest depth, then greatest sequence.
///
/// Independent of iteration order because sequences are unique.
pub fn pick_winner<'a>(entries: impl IntoIterator<Item = &'a RegistryEntry>) -> Option<&'a RegistryEntry> {
    let mut best: Option<&RegistryEntry> = None;
    for candidate in entries {
        best = match best {
            Some(current)
                if candidate.depth < current.depth
                    || (candidate.depth == current.depth && candidate.sequence <= current.sequence) =>
            {
                Some(current)
            }
            _ => Some(candidate),
        };
    }
    best
}

/// Diagnostic view of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSnapshot {
    /// Group name.
    pub group: String,
    /// Order in which the group was (re)created.
    pub creation_order: u64,
    /// Live entries.
    pub entries: usize,
    /// Current winner.
    pub winner: Option<EntryId>,
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug, Default)]
struct RegistryState {
    groups: HashMap<String, GroupState>,
    next_id: u64,
    next_sequence: u64,
    next_group_order: u64,
    next_anonymous: u64,
}

/// Arbitrates competing head resources and keeps a render sink in sync.
///
/// Always handled through `Rc`; disposers hold a weak reference back.
pub struct GroupRegistry {
    config: RegistryConfig,
    state: RefCell<RegistryState>,
    sink: RenderSink,
}

impl GroupRegistry {
    /// Registry with the given configuration.
    pub fn new(config: RegistryConfig) -> Rc<Self> {
        Rc::new(Self {
            config,
            state: RefCell::new(RegistryState::default()),
            sink: RenderSink::new(),
        })
    }

    /// Registry with no host.
    pub fn headless() -> Rc<Self> {
        Self::new(RegistryConfig::default())
    }

    /// Configuration in use.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The registry's render sink.
    pub fn sink(&self) -> &RenderSink {
        &self.sink
    }

    /// Register a contribution and recompute its group's winner.
    ///
    /// Fails with [`HeadError::MissingResource`] when the request carries no
    /// resource and with [`HeadError::ReservedGroup`] when the group name
    /// starts with [`ANONYMOUS_MARKER`]. The first call mounts the render
    /// sink.
    pub fn register(self: &Rc<Self>, registration: Registration) -> HeadResult<Disposer> {
        let Registration { group, resource, depth } = registration;
        if is_reserved_group(&group) {
            return Err(HeadError::ReservedGroup { group });
        }
        let Some(resource) = resource else {
            return Err(HeadError::MissingResource { group });
        };
        Ok(self.insert(group, resource, depth))
    }

    /// Register a contribution in a fresh group no other registration can
    /// ever name.
    pub fn register_anonymous(self: &Rc<Self>, resource: Option<HeadNode>, depth: i32) -> HeadResult<Disposer> {
        let Some(resource) = resource else {
            return Err(HeadError::MissingResource {
                group: format!("{ANONYMOUS_MARKER}{}", self.config.anonymous_prefix),
            });
        };
        let group = self.next_anonymous_group();
        Ok(self.insert(group, resource, depth))
    }

    fn insert(self: &Rc<Self>, group: String, resource: HeadNode, depth: i32) -> Disposer {
        self.sink.ensure_mounted(self.config.host.as_ref());

        let (id, sequence, winner) = {
            let mut state = self.state.borrow_mut();
            let id = EntryId(state.next_id);
            state.next_id += 1;
            let sequence = state.next_sequence;
            state.next_sequence += 1;

            let RegistryState {
                groups,
                next_group_order,
                ..
            } = &mut *state;
            let group_state = groups.entry(group.clone()).or_insert_with(|| {
                let order = *next_group_order;
                *next_group_order += 1;
                GroupState::new(order)
            });

            group_state.entries.insert(
                id,
                RegistryEntry {
                    id,
                    group: group.clone(),
                    resource,
                    depth,
                    sequence,
                },
            );
            (id, sequence, group_state.pick_winner().cloned())
        };

        trace!(%group, %id, depth, sequence, "head entry registered");
        self.publish(&group, winner.as_ref());

        Disposer::new(Rc::downgrade(self), group, id)
    }

    /// Remove an entry. Returns false if it was already gone.
    fn unregister(&self, group: &str, id: EntryId) -> bool {
        let winner = {
            let mut state = self.state.borrow_mut();
            let Some(group_state) = state.groups.get_mut(group) else {
                return false;
            };
            if group_state.entries.remove(&id).is_none() {
                return false;
            }

            let winner = group_state.pick_winner().cloned();
            if group_state.entries.is_empty() {
                state.groups.remove(group);
            }
            winner
        };

        trace!(group, %id, "head entry disposed");
        self.publish(group, winner.as_ref());
        true
    }

    fn publish(&self, group: &str, winner: Option<&RegistryEntry>) {
        let change = self.sink.set_rendered_winner(group, winner);
        if change != SinkChange::Unchanged {
            debug!(group, winner = ?winner.map(|entry| entry.id), ?change, "group winner changed");
        }
    }

    fn next_anonymous_group(&self) -> String {
        let mut state = self.state.borrow_mut();
        let n = state.next_anonymous;
        state.next_anonymous += 1;
        format!("{ANONYMOUS_MARKER}{}:{n}", self.config.anonymous_prefix)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Current winner of `group`.
    pub fn winner(&self, group: &str) -> Option<RegistryEntry> {
        self.state
            .borrow()
            .groups
            .get(group)
            .and_then(|state| state.pick_winner().cloned())
    }

    /// Live entries in `group`.
    pub fn entry_count(&self, group: &str) -> usize {
        self.state
            .borrow()
            .groups
            .get(group)
            .map(|state| state.entries.len())
            .unwrap_or(0)
    }

    /// Live entries of `group`, oldest first.
    pub fn entries(&self, group: &str) -> Vec<RegistryEntry> {
        let mut entries: Vec<RegistryEntry> = self
            .state
            .borrow()
            .groups
            .get(group)
            .map(|state| state.entries.values().cloned().collect())
            .unwrap_or_default();
        entries.sort_by_key(|entry| entry.sequence);
        entries
    }

    /// Number of groups with live entries.
    pub fn group_count(&self) -> usize {
        self.state.borrow().groups.len()
    }

    /// Snapshot of every live group, in creation order.
    pub fn groups(&self) -> Vec<GroupSnapshot> {
        let state = self.state.borrow();
        let mut groups: Vec<GroupSnapshot> = state
            .groups
            .iter()
            .map(|(group, group_state)| GroupSnapshot {
                group: group.clone(),
                creation_order: group_state.creation_order,
                entries: group_state.entries.len(),
                winner: group_state.pick_winner().map(|entry| entry.id),
            })
            .collect();
        groups.sort_by_key(|snapshot| snapshot.creation_order);
        groups
    }

    /// Rendered winners, read reactively.
    pub fn rendered(&self) -> Vec<RenderedWinner> {
        self.sink.rendered()
    }

    /// Render sink mount state.
    pub fn sink_status(&self) -> SinkStatus {
        self.sink.status()
    }
}

impl fmt::Debug for GroupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupRegistry")
            .field("config", &self.config)
            .field("groups", &self.group_count())
            .field("sink", &self.sink.status())
            .finish()
    }
}

// =============================================================================
// Disposer
// =============================================================================

struct DisposerInner {
    registry: Weak<GroupRegistry>,
    group: String,
    id: EntryId,
    disposed: Cell<bool>,
}

/// Removes one registration. Idempotent; clones share the same state.
#[derive(Clone)]
#[must_use = "dropping a Disposer leaves the entry registered"]
pub struct Disposer {
    inner: Rc<DisposerInner>,
}

impl Disposer {
    fn new(registry: Weak<GroupRegistry>, group: String, id: EntryId) -> Self {
        Self {
            inner: Rc::new(DisposerInner {
                registry,
                group,
                id,
                disposed: Cell::new(false),
            }),
        }
    }

    /// Entry this disposer removes.
    pub fn id(&self) -> EntryId {
        self.inner.id
    }

    /// Group of the entry.
    pub fn group(&self) -> &str {
        &self.inner.group
    }

    /// True once `dispose` has run.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Remove the entry and recompute its group's winner.
    ///
    /// Later calls, calls after the group vanished and calls after the
    /// registry was dropped do nothing.
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        if let Some(registry) = self.inner.registry.upgrade() {
            registry.unregister(&self.inner.group, self.inner.id);
        }
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("group", &self.inner.group)
            .field("id", &self.inner.id)
            .field("disposed", &self.inner.disposed.get())
            .finish()
    }
}

impl From<Disposer> for Cleanup {
    fn from(disposer: Disposer) -> Self {
        Box::new(move || disposer.dispose())
    }
}

// =============================================================================
// Tests
// =============================================================================

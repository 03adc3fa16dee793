//! Head Engine - group arbitration and the render sink.
//!
//! The engine owns the shared state behind head components:
//! - Registry: group map, sequence counter, winner selection, disposers
//! - Sink: the ordered list of winners and its projection into a host
//! - Global: the lazily created thread-wide default registry
//!
//! # Data Flow
//!
//! ```text
//! register(group, node, depth)
//!   → GroupState.entries += entry
//!   → pick_winner(group)
//!   → RenderSink::set_rendered_winner  (insert / replace / remove / nothing)
//!   → HeadTarget                        (only when mounted)
//! ```
//!
//! Everything runs synchronously to completion inside the call; there is
//! nothing to await and nothing to lock.

mod global;
mod registry;
mod sink;

pub use global::*;
pub use registry::*;
pub use sink::*;

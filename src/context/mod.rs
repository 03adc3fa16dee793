//! Context Store - tree-scoped values.
//!
//! A provider attaches a value to its subtree; any component mounted beneath
//! it can resolve the nearest provider's value. Each context carries a
//! transform that folds a provider's raw input into what its parent
//! resolved, so nested providers compose instead of simply shadowing.
//!
//! ```text
//! provide(raw=a) ──► frame{resolved = t(a, None)}
//!   provide(raw=b) ──► frame{resolved = t(b, Some(&outer))}
//!     consume(|v| ..)   v = inner resolved
//!   consume(|v| ..)     v = outer resolved
//! consume(|v| ..)       v = default
//! ```
//!
//! Lookup happens once, at mount time. A consumer that is already mounted
//! does not see providers that remount afterwards with different values;
//! only state that is itself reactive inside the resolved value keeps
//! flowing.

mod frame;
mod scope;
mod store;

pub use frame::{ContextFrame, ContextId, current_frame};
pub use scope::ContextScope;
pub use store::{Context, create_context};

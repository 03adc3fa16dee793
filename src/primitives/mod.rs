//! Head Primitives - Component building blocks.
//!
//! This module provides the components an application tree is made of:
//! - [`title`], [`meta`], [`script`], [`head_node`] - leaf head resources
//! - [`head_provider`] - nested provider, one level deeper
//! - [`Head`] - the same components bound to a specific head context
//! - [`show`], [`each`] - reactive control flow that keeps tree position
//!
//! # Architecture
//!
//! A component is a deferred mount: a boxed closure that, when called,
//! does its work against the context frame installed at that moment and
//! returns a cleanup. Each head leaf:
//! 1. Resolves the nearest head API at its mount position
//! 2. Registers its node under a group key derived from its attributes
//! 3. Returns the registration's disposer as its cleanup
//!
//! # Resolution
//!
//! Resolution happens once, at mount. Changing a provider's customization
//! later does not move components that are already registered:
//!
//! ```ignore
//! // Settings wins while mounted, App comes back when it unmounts
//! let app = mount(head_provider(ApiCustomization::Default, vec![
//!     title("App"),
//!     head_provider(ApiCustomization::Default, vec![title("Settings")]),
//! ]));
//! ```

mod types;
mod head;
pub mod control_flow;

pub use types::*;
pub(crate) use types::mount_all;
pub use head::{Head, head_node, head_provider, meta, script, title};
pub use control_flow::{each, show};

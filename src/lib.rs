//! # spark-head
//!
//! Tree-scoped context and head-resource arbitration for spark-tui.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! Components anywhere in a tree declare document-level resources (a title,
//! meta tags, scripts). Many of them may compete for the same slot; exactly
//! one wins per group: the deepest declaration, ties going to the most
//! recent one. Winners are projected incrementally into a host.
//!
//! ```text
//! Component Tree → Context Frames → HeadApi (depth) → GroupRegistry → RenderSink → HeadTarget
//! ```
//!
//! ## Modules
//!
//! - [`context`] - Tree-scoped context store (provide / consume)
//! - [`api`] - Depth-tracked head API and provider customization
//! - [`engine`] - Group registry, winner arbitration, render sink
//! - [`host`] - Host targets the sink writes to
//! - [`primitives`] - Components: title, meta, script, providers, control flow
//! - [`types`] - Head nodes and entry ids
//! - [`config`] - Registry configuration
//! - [`error`] - Error type

pub mod api;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod host;
pub mod primitives;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use api::{
    AddOptions, ApiCustomization, ApiOverride, HeadApi, HeadContext, ROOT_PARENT_DEPTH,
    create_api, customize_api, global_head_context, head_context,
};

pub use config::RegistryConfig;

pub use context::{Context, ContextScope, create_context, current_frame};

pub use engine::{
    ANONYMOUS_MARKER, Disposer, GroupRegistry, GroupSnapshot, Registration, RegistryEntry, RenderSink,
    RenderedWinner, SinkChange, SinkStatus, configure_global, global_registry, pick_winner,
    reset_global,
};

pub use error::{HeadError, HeadResult};

pub use host::{HeadTarget, HostSource, MemoryHead, TerminalHead, memory_host, no_host, terminal_host};

pub use primitives::{
    Cleanup, Component, Head, each, fragment, head_node, head_provider, meta, mount, noop_cleanup,
    script, show, title,
};

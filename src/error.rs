//! Error types for head registration.

use thiserror::Error;

/// Errors raised by the registry and the capability API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeadError {
    /// A registration carried no renderable resource.
    #[error("cannot register group '{group}' without a resource")]
    MissingResource {
        /// Group the empty registration targeted.
        group: String,
    },

    /// A named registration used a group reserved for anonymous entries.
    #[error("group '{group}' is reserved for anonymous registrations")]
    ReservedGroup {
        /// Rejected group name.
        group: String,
    },

    /// `add_unique` was called with an empty group key.
    #[error("add_unique requires a non-empty group key")]
    MissingGroupKey,

    /// The global registry was configured after it had been created.
    #[error("global head registry is already initialized")]
    AlreadyInitialized,
}

/// Result alias for head operations.
pub type HeadResult<T> = Result<T, HeadError>;

//! Thread-wide default registry.
//!
//! Components that don't carry a registry explicitly use this one. It is
//! created lazily on first use; [`configure_global`] may set its
//! configuration beforehand, [`reset_global`] discards it.

use std::cell::RefCell;
use std::rc::Rc;

use super::registry::GroupRegistry;
use crate::config::RegistryConfig;
use crate::error::{HeadError, HeadResult};

thread_local! {
    /// The default registry, once created.
    static GLOBAL_REGISTRY: RefCell<Option<Rc<GroupRegistry>>> = const { RefCell::new(None) };

    /// Configuration for the default registry, consumed on creation.
    static PENDING_CONFIG: RefCell<Option<RegistryConfig>> = const { RefCell::new(None) };
}

/// Set the default registry's configuration.
///
/// Fails with [`HeadError::AlreadyInitialized`] once the registry exists.
pub fn configure_global(config: RegistryConfig) -> HeadResult<()> {
    if GLOBAL_REGISTRY.with(|slot| slot.borrow().is_some()) {
        return Err(HeadError::AlreadyInitialized);
    }
    PENDING_CONFIG.with(|pending| *pending.borrow_mut() = Some(config));
    Ok(())
}

/// The default registry, created on first call.
pub fn global_registry() -> Rc<GroupRegistry> {
    GLOBAL_REGISTRY.with(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(|| {
                let config = PENDING_CONFIG.with(|pending| pending.borrow_mut().take()).unwrap_or_default();
                GroupRegistry::new(config)
            })
            .clone()
    })
}

/// Drop the default registry and any pending configuration (for testing).
///
/// Disposers handed out by the old registry become no-ops.
pub fn reset_global() {
    GLOBAL_REGISTRY.with(|slot| slot.borrow_mut().take());
    PENDING_CONFIG.with(|pending| pending.borrow_mut().take());
}

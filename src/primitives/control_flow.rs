//! Control Flow Primitives - Conditional and list mounting.
//!
//! This module provides control flow primitives for dynamic trees:
//! - [`show`] - Conditional mounting based on a reactive condition
//! - [`each`] - Keyed list mounting with fine-grained updates
//!
//! These are what drive head components in and out of the registry after
//! the first mount pass: a `show` around a `title` registers the title when
//! its condition turns true and disposes it when it turns false.
//!
//! # Pattern: EffectScope-based Cleanup
//!
//! Both primitives use spark-signals' EffectScope for cleanup:
//! 1. Create an EffectScope to manage the lifetime of child effects/components
//! 2. Run mounting logic inside `scope.run()`
//! 3. Register cleanup with `on_scope_dispose()`
//! 4. Return `Box::new(move || scope.stop())` as the Cleanup
//!
//! Children are mounted outside the tracking effect, each in a detached
//! scope of its own (`mount_owned`). An effect re-run destroys the
//! effects created during its previous run, so a child mounted inline would
//! lose its own effects the next time the list or condition is read again.
//!
//! # Pattern: Context Scope Restoration
//!
//! Children mounted by an effect run long after the mount pass that declared
//! them, when no provider frame is installed anymore. Both primitives
//! capture a [`ContextScope`] at creation and re-enter it before mounting
//! children, so a deferred `title` still registers at its provider's depth.
//!
//! ```ignore
//! head_provider(ApiCustomization::Default, vec![Box::new(move || {
//!     // show() called here - captures this provider's frame
//!     show(move || on_settings.get(), || title("Settings"), None::<fn() -> Cleanup>)
//! })])
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::rc::{Rc, Weak};

use spark_signals::{AnyReaction, Signal, effect, effect_scope, on_scope_dispose, signal, with_context};
use tracing::warn;

use crate::context::ContextScope;
use crate::primitives::Cleanup;

/// Conditionally mount children based on a reactive condition.
///
/// # Arguments
///
/// * `condition` - Getter that returns boolean (creates reactive dependency)
/// * `then_fn` - Mounts when condition is true (returns cleanup)
/// * `else_fn` - Optional, mounts when condition is false
///
/// # Returns
///
/// A cleanup function that unmounts the current branch and stops tracking.
pub fn show<ThenF, ElseF, ThenR, ElseR>(
    condition: impl Fn() -> bool + 'static,
    then_fn: ThenF,
    else_fn: Option<ElseF>,
) -> Cleanup
where
    ThenF: Fn() -> ThenR + 'static,
    ElseF: Fn() -> ElseR + 'static,
    ThenR: Into<Cleanup>,
    ElseR: Into<Cleanup>,
{
    // Capture tree position at creation time
    let context_scope = ContextScope::capture();

    let cleanup: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
    let was_true: Rc<Cell<Option<bool>>> = Rc::new(Cell::new(None));

    let scope = effect_scope(false);

    let cleanup_for_update = cleanup.clone();
    let cleanup_for_dispose = cleanup.clone();

    let update = move |new_condition: bool| {
        let previous = was_true.get();

        // Skip if condition unchanged
        if previous == Some(new_condition) {
            return;
        }
        was_true.set(Some(new_condition));

        // Unmount previous branch first so its registrations are gone
        // before the new branch registers
        if let Some(prev_cleanup) = cleanup_for_update.borrow_mut().take() {
            prev_cleanup();
        }

        let new_cleanup: Option<Cleanup> = context_scope.enter(|| {
            if new_condition {
                Some(mount_owned(|| then_fn().into()))
            } else {
                else_fn
                    .as_ref()
                    .map(|f| mount_owned(|| -> Cleanup { f().into() }))
            }
        });

        *cleanup_for_update.borrow_mut() = new_cleanup;
    };

    scope.run(move || {
        // Initial mount happens on the first effect run
        let _effect_cleanup = effect(move || {
            let current = condition();
            update(current);
        });

        on_scope_dispose(move || {
            if let Some(cleanup_fn) = cleanup_for_dispose.borrow_mut().take() {
                cleanup_fn();
            }
        });
    });

    Box::new(move || {
        scope.stop();
    })
}

// =============================================================================
// Child ownership
// =============================================================================

/// Restores the reaction context replaced by [`mount_owned`].
struct DetachGuard {
    reaction: Option<Weak<dyn AnyReaction>>,
    effect: Option<Weak<dyn AnyReaction>>,
}

impl Drop for DetachGuard {
    fn drop(&mut self) {
        let reaction = self.reaction.take();
        let effect = self.effect.take();
        with_context(|ctx| {
            ctx.set_active_reaction(reaction);
            ctx.set_active_effect(effect);
        });
    }
}

/// Mount a child in a detached scope, with no effect or reaction active.
///
/// The child's effects belong to that scope rather than to the effect that
/// happens to be running, and its reads are not tracked by it. The returned
/// cleanup unmounts the child, then stops the scope.
fn mount_owned(mount_child: impl FnOnce() -> Cleanup) -> Cleanup {
    let owner = effect_scope(true);
    let child = {
        let _guard = with_context(|ctx| DetachGuard {
            reaction: ctx.set_active_reaction(None),
            effect: ctx.set_active_effect(None),
        });
        owner.run(mount_child)
    };

    Box::new(move || {
        if let Some(cleanup) = child {
            cleanup();
        }
        owner.stop();
    })
}

// =============================================================================
// each() - Keyed list mounting
// =============================================================================

/// Mount one child per item, tracked by key.
///
/// When the list changes:
/// - New keys: create signal + mount child
/// - Existing keys: update signal only (child stays mounted)
/// - Removed keys: unmount child
///
/// Duplicate keys are logged and skipped; only the first occurrence is
/// tracked.
pub fn each<T, K, RenderF, R>(
    items_getter: impl Fn() -> Vec<T> + 'static,
    render_fn: RenderF,
    key_fn: impl Fn(&T) -> K + 'static,
) -> Cleanup
where
    T: Clone + PartialEq + 'static,
    K: Clone + Eq + Hash + std::fmt::Debug + 'static,
    RenderF: Fn(Rc<dyn Fn() -> T>, K) -> R + Clone + 'static,
    R: Into<Cleanup>,
{
    let context_scope = ContextScope::capture();

    let scope = effect_scope(false);

    // Key -> Cleanup for unmounting the child
    let cleanups: Rc<RefCell<HashMap<K, Cleanup>>> = Rc::new(RefCell::new(HashMap::new()));
    // Key -> Signal<T> for fine-grained updates
    let item_signals: Rc<RefCell<HashMap<K, Signal<T>>>> = Rc::new(RefCell::new(HashMap::new()));

    let cleanups_effect = cleanups.clone();
    let item_signals_effect = item_signals.clone();

    let cleanups_dispose = cleanups.clone();
    let item_signals_dispose = item_signals.clone();

    scope.run(move || {
        let _effect_cleanup = effect(move || {
            let items = items_getter();
            let mut current_keys = HashSet::new();

            // Unmount removed items before mounting new ones, so a key that
            // replaces another in the same group registers after the
            // disposal and is never shadowed by a stale entry
            {
                for item in items.iter() {
                    current_keys.insert(key_fn(item));
                }

                let keys_to_remove: Vec<K> = cleanups_effect
                    .borrow()
                    .keys()
                    .filter(|k| !current_keys.contains(*k))
                    .cloned()
                    .collect();

                for key in keys_to_remove {
                    let cleanup = cleanups_effect.borrow_mut().remove(&key);
                    if let Some(cleanup) = cleanup {
                        cleanup();
                    }
                    item_signals_effect.borrow_mut().remove(&key);
                }
            }

            let mut seen = HashSet::new();
            context_scope.enter(|| {
                for item in items.iter() {
                    let key = key_fn(item);

                    if !seen.insert(key.clone()) {
                        warn!(?key, "duplicate key in each(), keys must be unique");
                        continue;
                    }

                    let existing = item_signals_effect.borrow().get(&key).cloned();
                    match existing {
                        // EXISTING item - just update the signal
                        Some(sig) => {
                            sig.set(item.clone());
                        }
                        // NEW item - create signal and mount
                        None => {
                            let item_signal = signal(item.clone());
                            item_signals_effect
                                .borrow_mut()
                                .insert(key.clone(), item_signal.clone());

                            let getter: Rc<dyn Fn() -> T> = Rc::new(move || item_signal.get());
                            let render = render_fn.clone();
                            let child_key = key.clone();
                            let cleanup = mount_owned(move || render(getter, child_key).into());
                            cleanups_effect.borrow_mut().insert(key, cleanup);
                        }
                    }
                }
            });
        });

        on_scope_dispose(move || {
            let drained: Vec<Cleanup> = cleanups_dispose.borrow_mut().drain().map(|(_, c)| c).collect();
            for cleanup in drained {
                cleanup();
            }
            item_signals_dispose.borrow_mut().clear();
        });
    });

    Box::new(move || {
        scope.stop();
    })
}

// =============================================================================
// Tests
// =============================================================================

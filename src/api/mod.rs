//! Head API - depth-tracked registration capabilities.
//!
//! Head components never talk to the registry directly. They consume the
//! head context and get a [`HeadApi`]: a depth plus two registration
//! operations bound to a registry. Each nested head provider hands its
//! subtree an API one level deeper, which is what lets an inner page's
//! `<title>` beat the application-wide one.
//!
//! # Customization
//!
//! Providers take an [`ApiCustomization`]:
//!
//! ```text
//! Default            → fresh API at parent depth + 1
//! Override(fields)   → fresh API with the given fields swapped in
//! Computed(f)        → f(&fresh, parent) or the fresh API if f returns None
//! ```
//!
//! ```ignore
//! use spark_head::api::{ApiCustomization, ApiOverride, head_context};
//!
//! // Pin everything below to depth 10.
//! let pinned = ApiCustomization::Override(ApiOverride { depth: Some(10), ..Default::default() });
//! head_context(&registry).provide(pinned, children);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::context::{Context, create_context};
use crate::engine::{Disposer, GroupRegistry, Registration, global_registry};
use crate::error::{HeadError, HeadResult};
use crate::types::HeadNode;

/// Depth assigned to the (absent) parent of the outermost provider.
pub const ROOT_PARENT_DEPTH: i32 = -1;

/// Signature of [`HeadApi::add`].
pub type AddFn = Rc<dyn Fn(Option<HeadNode>, AddOptions) -> HeadResult<Disposer>>;

/// Signature of [`HeadApi::add_unique`].
pub type AddUniqueFn = Rc<dyn Fn(&str, Option<HeadNode>) -> HeadResult<Disposer>>;

/// Signature of a computed customization: `(own, parent) -> replacement`.
pub type ComputeFn = Rc<dyn Fn(&HeadApi, Option<&HeadApi>) -> Option<HeadApi>>;

/// The head context type.
pub type HeadContext = Context<ApiCustomization, HeadApi>;

// =============================================================================
// Head Api
// =============================================================================

/// Options for [`HeadApi::add`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Group to compete in. A fresh anonymous group when `None`.
    pub group: Option<String>,
}

impl AddOptions {
    /// Compete in `group`.
    pub fn group(group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
        }
    }
}

/// Registration capability handed to head components.
#[derive(Clone)]
pub struct HeadApi {
    /// Provider nesting level. Consumers may read it, never change it.
    pub depth: i32,
    /// Implementation of [`HeadApi::add`].
    pub add: AddFn,
    /// Implementation of [`HeadApi::add_unique`].
    pub add_unique: AddUniqueFn,
}

impl HeadApi {
    /// Contribute `resource`, deduplicated only if `options.group` is set.
    pub fn add(&self, resource: impl Into<Option<HeadNode>>, options: AddOptions) -> HeadResult<Disposer> {
        (self.add)(resource.into(), options)
    }

    /// Contribute `resource` to the singleton slot `group`.
    ///
    /// Fails with [`HeadError::MissingGroupKey`] when `group` is empty.
    pub fn add_unique(&self, group: &str, resource: impl Into<Option<HeadNode>>) -> HeadResult<Disposer> {
        (self.add_unique)(group, resource.into())
    }
}

impl fmt::Debug for HeadApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadApi").field("depth", &self.depth).finish_non_exhaustive()
    }
}

/// Build an API at `depth` registering into `registry`.
pub fn create_api(registry: &Rc<GroupRegistry>, depth: i32) -> HeadApi {
    let add_registry = registry.clone();
    let add: AddFn = Rc::new(move |resource: Option<HeadNode>, options: AddOptions| {
        match options.group {
            Some(group) if !group.is_empty() => add_registry.register(Registration { group, resource, depth }),
            _ => add_registry.register_anonymous(resource, depth),
        }
    });

    let unique_registry = registry.clone();
    let add_unique: AddUniqueFn = Rc::new(move |group: &str, resource: Option<HeadNode>| {
        if group.is_empty() {
            return Err(HeadError::MissingGroupKey);
        }
        unique_registry.register(Registration {
            group: group.to_string(),
            resource,
            depth,
        })
    });

    HeadApi { depth, add, add_unique }
}

// =============================================================================
// Customization
// =============================================================================

/// Fields a provider replaces on the API it hands down.
#[derive(Clone, Default)]
pub struct ApiOverride {
    /// Replacement depth.
    pub depth: Option<i32>,
    /// Replacement `add`.
    pub add: Option<AddFn>,
    /// Replacement `add_unique`.
    pub add_unique: Option<AddUniqueFn>,
}

impl ApiOverride {
    /// Shallow merge: every field set here wins over `api`'s.
    pub fn apply(&self, api: HeadApi) -> HeadApi {
        HeadApi {
            depth: self.depth.unwrap_or(api.depth),
            add: self.add.clone().unwrap_or(api.add),
            add_unique: self.add_unique.clone().unwrap_or(api.add_unique),
        }
    }
}

impl fmt::Debug for ApiOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiOverride")
            .field("depth", &self.depth)
            .field("add", &self.add.is_some())
            .field("add_unique", &self.add_unique.is_some())
            .finish()
    }
}

/// What a head provider does to the API it passes down.
#[derive(Clone, Default)]
pub enum ApiCustomization {
    /// Plain nested level.
    #[default]
    Default,
    /// Replace individual fields.
    Override(ApiOverride),
    /// Compute the API from the fresh one and the parent's.
    Computed(ComputeFn),
}

impl ApiCustomization {
    /// Wrap a closure as [`ApiCustomization::Computed`].
    pub fn computed(f: impl Fn(&HeadApi, Option<&HeadApi>) -> Option<HeadApi> + 'static) -> Self {
        Self::Computed(Rc::new(f))
    }
}

impl fmt::Debug for ApiCustomization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::Override(o) => f.debug_tuple("Override").field(o).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Head context transform: one level below `parent`, then customized.
pub fn customize_api(
    registry: &Rc<GroupRegistry>,
    raw: &ApiCustomization,
    parent: Option<&HeadApi>,
) -> HeadApi {
    let parent_depth = parent.map_or(ROOT_PARENT_DEPTH, |parent| parent.depth);
    let api = create_api(registry, parent_depth + 1);

    match raw {
        ApiCustomization::Default => api,
        ApiCustomization::Override(fields) => fields.apply(api),
        ApiCustomization::Computed(compute) => compute(&api, parent).unwrap_or(api),
    }
}

// =============================================================================
// Head Context
// =============================================================================

/// Head context bound to `registry`.
///
/// Consumers with no provider above them get a depth-0 API. Every call
/// creates a distinct context: the components in [`crate::primitives`]
/// resolve the global one unless built through a
/// [`Head`](crate::primitives::Head) bound to this context.
pub fn head_context(registry: &Rc<GroupRegistry>) -> HeadContext {
    let transform_registry = registry.clone();
    create_context(create_api(registry, 0), move |raw: &ApiCustomization, parent: Option<&HeadApi>| {
        customize_api(&transform_registry, raw, parent)
    })
}

thread_local! {
    /// Head context of the global registry, rebuilt if the registry is reset.
    static GLOBAL_HEAD: RefCell<Option<(Rc<GroupRegistry>, HeadContext)>> = const { RefCell::new(None) };
}

/// Head context bound to the global registry.
pub fn global_head_context() -> HeadContext {
    let registry = global_registry();
    GLOBAL_HEAD.with(|slot| {
        let mut slot = slot.borrow_mut();
        match &*slot {
            Some((cached, context)) if Rc::ptr_eq(cached, &registry) => context.clone(),
            _ => {
                let context = head_context(&registry);
                *slot = Some((registry, context.clone()));
                context
            }
        }
    })
}

// =============================================================================
// Tests
// =============================================================================

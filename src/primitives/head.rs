//! Head components - title, meta, script and nested head providers.
//!
//! Each leaf resolves the head API at its mount position, registers one
//! node under a group key derived from its attributes, and disposes the
//! registration when unmounted. A registration the registry rejects is
//! logged and the component mounts as a no-op.

use std::rc::Rc;

use tracing::warn;

use crate::api::{AddOptions, ApiCustomization, HeadApi, HeadContext, global_head_context, head_context};
use crate::engine::{Disposer, GroupRegistry};
use crate::error::HeadResult;
use crate::primitives::{Cleanup, Component, noop_cleanup};
use crate::types::{HeadNode, MetaProps, ScriptProps, TITLE_GROUP};

/// Turn a registration result into the component's cleanup.
fn registered(result: HeadResult<Disposer>) -> Cleanup {
    match result {
        Ok(disposer) => disposer.into(),
        Err(err) => {
            warn!(%err, "head registration failed");
            noop_cleanup()
        }
    }
}

// =============================================================================
// Head - components bound to a head context
// =============================================================================

/// Head components bound to one head context.
///
/// Leaves and providers only see providers of their own context, so a tree
/// built on a dedicated registry has to use the same `Head` throughout.
/// The free functions ([`title`], [`meta`], ...) use [`Head::global`].
///
/// ```ignore
/// let head = Head::for_registry(&registry);
/// mount(head.provider(ApiCustomization::Default, vec![head.title("App")]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Head {
    /// `None` resolves the global head context at mount.
    context: Option<HeadContext>,
}

impl Head {
    /// Components bound to the global registry's head context.
    pub fn global() -> Self {
        Self { context: None }
    }

    /// Components bound to `context`.
    pub fn new(context: HeadContext) -> Self {
        Self { context: Some(context) }
    }

    /// Components bound to a fresh head context over `registry`.
    pub fn for_registry(registry: &Rc<GroupRegistry>) -> Self {
        Self::new(head_context(registry))
    }

    fn context(&self) -> HeadContext {
        self.context.clone().unwrap_or_else(global_head_context)
    }

    /// Component that calls `register` with the head API resolved at mount.
    fn with_api(&self, register: impl FnOnce(HeadApi) -> HeadResult<Disposer> + 'static) -> Component {
        let head = self.clone();
        Box::new(move || {
            let consumer = head.context().consume(move |api| registered(register(api)));
            consumer()
        })
    }

    /// Document title.
    pub fn title(&self, text: impl Into<String>) -> Component {
        let node = HeadNode::title(text);
        self.with_api(move |api| api.add_unique(TITLE_GROUP, node))
    }

    /// Meta tag, deduplicated by charset, http-equiv, name or property.
    ///
    /// A meta tag with none of those is never deduplicated.
    pub fn meta(&self, props: MetaProps) -> Component {
        let group = props.group_key();
        let node = HeadNode::meta(props);
        self.with_api(move |api| match group {
            Some(group) => api.add_unique(&group, node),
            None => api.add(node, AddOptions::default()),
        })
    }

    /// Script tag, deduplicated by URL (external) or content type (inline).
    pub fn script(&self, props: ScriptProps) -> Component {
        let group = props.group_key();
        let node = HeadNode::script(props);
        self.with_api(move |api| api.add_unique(&group, node))
    }

    /// Arbitrary node, optionally deduplicated by `group`.
    pub fn node(&self, node: HeadNode, group: Option<String>) -> Component {
        self.with_api(move |api| api.add(node, AddOptions { group }))
    }

    /// Nested provider. Components below it register one level deeper,
    /// after `customization` is applied.
    pub fn provider(&self, customization: ApiCustomization, children: Vec<Component>) -> Component {
        let head = self.clone();
        Box::new(move || {
            let provider = head.context().provide(customization, children);
            provider()
        })
    }
}

/// Document title, on the global registry.
pub fn title(text: impl Into<String>) -> Component {
    Head::global().title(text)
}

/// Meta tag, on the global registry. See [`Head::meta`].
pub fn meta(props: MetaProps) -> Component {
    Head::global().meta(props)
}

/// Script tag, on the global registry. See [`Head::script`].
pub fn script(props: ScriptProps) -> Component {
    Head::global().script(props)
}

/// Register an arbitrary node on the global registry, optionally
/// deduplicated by `group`.
pub fn head_node(node: HeadNode, group: Option<String>) -> Component {
    Head::global().node(node, group)
}

/// Nested head provider on the global registry.
pub fn head_provider(customization: ApiCustomization, children: Vec<Component>) -> Component {
    Head::global().provider(customization, children)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::engine::{configure_global, global_registry, reset_global};
    use crate::host::{MemoryHead, memory_host};
    use crate::primitives::{fragment, mount};

    fn setup() -> MemoryHead {
        reset_global();
        let head = MemoryHead::new();
        configure_global(RegistryConfig::default().with_host(memory_host(&head))).expect("fresh global registry");
        head
    }

    #[test]
    fn test_title_nested_override() {
        let head = setup();

        let app = mount(head_provider(
            ApiCustomization::Default,
            vec![title("App"), head_provider(ApiCustomization::Default, vec![title("Settings")])],
        ));

        assert_eq!(head.title().as_deref(), Some("Settings"));
        assert_eq!(head.len(), 1, "one title at a time");

        app();
        assert!(head.is_empty());
        assert_eq!(global_registry().group_count(), 0);
    }

    #[test]
    fn test_inner_unmount_reverts() {
        let head = setup();

        let outer = mount(head_provider(ApiCustomization::Default, vec![title("App")]));
        let inner = mount(head_provider(
            ApiCustomization::Default,
            vec![head_provider(ApiCustomization::Default, vec![title("Page")])],
        ));
        assert_eq!(head.title().as_deref(), Some("Page"));

        inner();
        assert_eq!(head.title().as_deref(), Some("App"));
        outer();
    }

    #[test]
    fn test_meta_deduplication() {
        let head = setup();

        let _cleanup = mount(fragment(vec![
            meta(MetaProps::named("description", "first")),
            meta(MetaProps::named("description", "second")),
            meta(MetaProps::property("og:title", "og")),
            meta(MetaProps {
                content: Some("anonymous".into()),
                ..Default::default()
            }),
            meta(MetaProps {
                content: Some("anonymous".into()),
                ..Default::default()
            }),
        ]));

        // description (deduplicated) + og:title + two anonymous metas
        assert_eq!(head.len(), 4);
        let description = global_registry()
            .winner("meta:name:description")
            .expect("description registered");
        assert_eq!(
            description.resource.element(),
            &crate::types::HeadElement::Meta(MetaProps::named("description", "second"))
        );
    }

    #[test]
    fn test_scripts_by_url() {
        let head = setup();

        let _cleanup = mount(fragment(vec![
            script(ScriptProps::external("https://cdn/a.js")),
            script(ScriptProps::external("https://cdn/a.js")),
            script(ScriptProps::external("https://cdn/b.js")),
            script(ScriptProps::inline("application/ld+json", "{}")),
        ]));

        assert_eq!(head.len(), 3);
        assert_eq!(global_registry().entry_count("script:src:https://cdn/a.js"), 2);
    }

    #[test]
    fn test_head_node_with_group() {
        let head = setup();
        let node = HeadNode::title("raw");

        let cleanup = mount(head_node(node.clone(), Some("custom".into())));
        assert_eq!(head.nodes(), vec![node]);

        cleanup();
        assert!(head.is_empty());
    }

    #[test]
    fn test_rejected_registration_is_noop() {
        let head = setup();

        let empty_key = ApiCustomization::Override(crate::api::ApiOverride {
            add_unique: Some(std::rc::Rc::new(|_: &str, _: Option<HeadNode>| -> HeadResult<Disposer> {
                Err(crate::error::HeadError::MissingGroupKey)
            })),
            ..Default::default()
        });

        let cleanup = mount(head_provider(empty_key, vec![title("never")]));
        assert!(head.is_empty());
        cleanup();
    }

    #[test]
    fn test_head_bound_to_own_registry() {
        let head = setup();
        let own = MemoryHead::new();
        let registry = GroupRegistry::new(RegistryConfig::default().with_host(memory_host(&own)));
        let bound = Head::for_registry(&registry);

        let app = mount(bound.provider(
            ApiCustomization::Default,
            vec![
                bound.title("App"),
                bound.provider(ApiCustomization::Default, vec![bound.title("Settings")]),
            ],
        ));

        assert_eq!(own.title().as_deref(), Some("Settings"));
        assert_eq!(registry.winner(TITLE_GROUP).map(|entry| entry.depth), Some(1));
        assert!(head.is_empty(), "global registry untouched");
        assert_eq!(global_registry().group_count(), 0);

        app();
        assert!(own.is_empty());
    }
}

//! Property tests: per-group arbitration stays consistent with a plain model
//! under arbitrary register / dispose sequences, and the host mirrors the
//! sink after every step.

use std::rc::Rc;

use proptest::prelude::*;
use spark_head::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

const GROUPS: [&str; 3] = ["title", "meta:name:description", "script:src:app.js"];

#[derive(Debug, Clone)]
enum Op {
    Register { group: usize, depth: i32 },
    Dispose { pick: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..GROUPS.len(), 0i32..4).prop_map(|(group, depth)| Op::Register { group, depth }),
        2 => any::<usize>().prop_map(|pick| Op::Dispose { pick }),
    ]
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(arb_op(), 1..60)
}

/// A live registration as the model sees it.
struct Live {
    group: &'static str,
    depth: i32,
    order: usize,
    disposer: Disposer,
}

/// Expected winner of `group`: deepest, then most recent.
fn model_winner<'a>(live: &'a [Live], group: &str) -> Option<&'a Live> {
    live.iter()
        .filter(|entry| entry.group == group)
        .max_by_key(|entry| (entry.depth, entry.order))
}

fn setup() -> (Rc<GroupRegistry>, MemoryHead) {
    let head = MemoryHead::new();
    let registry = GroupRegistry::new(RegistryConfig::default().with_host(memory_host(&head)));
    (registry, head)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// After every step each group has exactly the model's winner, and the
    /// host holds one node per live group in sink order.
    #[test]
    fn winners_match_model(ops in arb_ops()) {
        let (registry, head) = setup();
        let mut live: Vec<Live> = Vec::new();

        for (order, op) in ops.into_iter().enumerate() {
            match op {
                Op::Register { group, depth } => {
                    let group = GROUPS[group];
                    let disposer = registry
                        .register(Registration::new(group, HeadNode::title(format!("{group}@{order}")), depth))
                        .expect("resource present");
                    live.push(Live { group, depth, order, disposer });
                }
                Op::Dispose { pick } => {
                    if live.is_empty() {
                        continue;
                    }
                    let removed = live.remove(pick % live.len());
                    removed.disposer.dispose();
                    prop_assert!(removed.disposer.is_disposed());
                }
            }

            for group in GROUPS {
                let expected = model_winner(&live, group).map(|entry| entry.disposer.id());
                let actual = registry.winner(group).map(|entry| entry.id);
                prop_assert_eq!(actual, expected, "winner of {}", group);
                prop_assert_eq!(registry.sink().get(group).map(|item| item.id), expected);
                prop_assert_eq!(
                    registry.entry_count(group),
                    live.iter().filter(|entry| entry.group == group).count()
                );
            }

            let rendered: Vec<HeadNode> = registry.rendered().into_iter().map(|item| item.resource).collect();
            prop_assert_eq!(head.nodes(), rendered);
            prop_assert_eq!(head.len(), registry.group_count());
        }
    }

    /// Disposing a non-winning entry never touches the host.
    #[test]
    fn non_winner_disposal_is_silent(depths in prop::collection::vec(0i32..5, 2..12)) {
        let (registry, head) = setup();
        let disposers: Vec<Disposer> = depths
            .iter()
            .enumerate()
            .map(|(i, depth)| {
                registry
                    .register(Registration::new("title", HeadNode::title(format!("t{i}")), *depth))
                    .expect("resource present")
            })
            .collect();

        let winner = registry.winner("title").expect("non-empty group").id;
        let ops_before = head.ops();

        for disposer in disposers.iter().filter(|disposer| disposer.id() != winner) {
            disposer.dispose();
        }

        prop_assert_eq!(head.ops(), ops_before);
        prop_assert_eq!(registry.winner("title").map(|entry| entry.id), Some(winner));
        prop_assert_eq!(registry.entry_count("title"), 1);
    }

    /// Disposal is idempotent however often it is repeated.
    #[test]
    fn repeated_disposal_is_noop(repeats in 1usize..5) {
        let (registry, head) = setup();
        let low = registry
            .register(Registration::new("title", HeadNode::title("low"), 0))
            .expect("resource present");
        let high = registry
            .register(Registration::new("title", HeadNode::title("high"), 1))
            .expect("resource present");

        for _ in 0..repeats {
            high.dispose();
        }

        prop_assert_eq!(registry.winner("title").map(|entry| entry.id), Some(low.id()));
        let title = head.title();
        prop_assert_eq!(title.as_deref(), Some("low"));
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_deeper_title_wins_then_reverts() {
    let (registry, head) = setup();
    let app = registry
        .register(Registration::new(TITLE_GROUP, HeadNode::title("App"), 0))
        .expect("registered");
    let page = registry
        .register(Registration::new(TITLE_GROUP, HeadNode::title("Page"), 1))
        .expect("registered");
    assert_eq!(head.title().as_deref(), Some("Page"));

    page.dispose();
    assert_eq!(head.title().as_deref(), Some("App"));

    app.dispose();
    assert!(head.is_empty());
    assert_eq!(registry.group_count(), 0);
}

#[test]
fn test_equal_depth_latest_wins() {
    let (registry, head) = setup();
    let _first = registry
        .register(Registration::new(TITLE_GROUP, HeadNode::title("First"), 2))
        .expect("registered");
    let second = registry
        .register(Registration::new(TITLE_GROUP, HeadNode::title("Second"), 2))
        .expect("registered");
    assert_eq!(head.title().as_deref(), Some("Second"));

    second.dispose();
    assert_eq!(head.title().as_deref(), Some("First"));
}

#[test]
fn test_shallow_late_registration_loses() {
    let (registry, head) = setup();
    let _deep = registry
        .register(Registration::new(TITLE_GROUP, HeadNode::title("Deep"), 3))
        .expect("registered");
    let ops = head.ops();
    let _late = registry
        .register(Registration::new(TITLE_GROUP, HeadNode::title("Late"), 0))
        .expect("registered");

    assert_eq!(head.title().as_deref(), Some("Deep"));
    assert_eq!(head.ops(), ops, "losing registration causes no host call");
}

#[test]
fn test_provider_tree_end_to_end() {
    reset_global();
    let head = MemoryHead::new();
    configure_global(RegistryConfig::default().with_host(memory_host(&head))).expect("fresh global registry");

    let app = mount(head_provider(
        ApiCustomization::Default,
        vec![
            title("App"),
            meta(MetaProps::named("description", "app")),
            head_provider(
                ApiCustomization::Default,
                vec![title("Settings"), meta(MetaProps::named("description", "settings"))],
            ),
        ],
    ));

    assert_eq!(head.title().as_deref(), Some("Settings"));
    assert_eq!(head.len(), 2);
    let description = global_registry()
        .winner("meta:name:description")
        .expect("description registered");
    assert_eq!(description.depth, 1);

    app();
    assert!(head.is_empty());
    reset_global();
}

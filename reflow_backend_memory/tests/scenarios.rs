// Copyright 2026 the Reflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end reconciliation scenarios against the in-memory backend.

use std::cell::Cell;
use std::rc::Rc;

use reflow_backend_memory::{MemoryHost, Op};
use reflow_core::{
    ChildValue, Element, HostHandle, Phase, PropValue, ReconcileError, Reconciler, UpdatePayload,
};

fn engine() -> Reconciler<MemoryHost> {
    // Surface engine trace output under RUST_LOG when a test fails.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Reconciler::new(MemoryHost::new())
}

fn sole_child(host: &MemoryHost, parent: HostHandle) -> HostHandle {
    let children = host.children_of(parent);
    assert_eq!(children.len(), 1, "expected exactly one child");
    children[0]
}

#[test]
fn mounting_attaches_children_before_parents() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    engine
        .request_update(pair, Some(Element::tag("div").child("Hi")))
        .unwrap();

    let host = engine.host();
    let div = sole_child(host, container);
    assert_eq!(host.tag_of(div), Some("div"));
    let text = sole_child(host, div);
    assert_eq!(host.text_of(text), Some("Hi"));

    // Creation is bottom-up and attachment follows the effect chain: the
    // text lands in the (still detached) div before the div lands in the
    // container.
    assert_eq!(
        host.ops(),
        &[
            Op::CreateText(text, "Hi".into()),
            Op::CreateElement(div, "div".into()),
            Op::AppendChild(div, text),
            Op::AppendChild(container, div),
        ]
    );
    assert_eq!(engine.phase(), Phase::Idle);
}

#[test]
fn rebuilding_an_unchanged_shape_touches_no_host_nodes() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    engine
        .request_update(pair, Some(Element::tag("div").child("Hi")))
        .unwrap();
    let nodes_before = engine.host().node_count();
    let div = sole_child(engine.host(), container);
    engine.host_mut().clear_ops();

    engine
        .request_update(pair, Some(Element::tag("div").child("Bye")))
        .unwrap();

    // The cloned generation reuses every host instance; since attributes
    // did not change, the rebuild issues no host mutations at all. Child
    // text is carried from the previous generation, not re-derived: the
    // description's "Bye" does not reach the existing text node.
    let host = engine.host();
    assert_eq!(host.node_count(), nodes_before);
    assert!(host.ops().is_empty());
    assert_eq!(host.children_of(container), &[div]);
    assert_eq!(host.text_of(sole_child(host, div)), Some("Hi"));
}

#[test]
fn null_description_deletes_all_placed_roots() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    engine
        .request_update(pair, Some(Element::tag("div").child("Hi")))
        .unwrap();
    let div = sole_child(engine.host(), container);
    engine.host_mut().clear_ops();

    engine.request_update(pair, None).unwrap();

    let host = engine.host();
    assert!(host.children_of(container).is_empty());
    assert_eq!(host.ops(), &[Op::RemoveChild(container, div)]);
}

#[test]
fn remounting_after_a_null_description_creates_fresh_instances() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    engine
        .request_update(pair, Some(Element::tag("div")))
        .unwrap();
    let first_div = sole_child(engine.host(), container);
    engine.request_update(pair, None).unwrap();

    engine
        .request_update(pair, Some(Element::tag("div")))
        .unwrap();

    let host = engine.host();
    let second_div = sole_child(host, container);
    assert_ne!(first_div, second_div);
    assert_eq!(host.tag_of(second_div), Some("div"));
}

#[test]
fn failed_build_leaves_the_committed_tree_untouched() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);
    let root_before = engine.current_root(pair);

    // A bare `true` nested two levels down fails mounting mid-traversal,
    // after the outer nodes have already joined the in-progress tree.
    let bad = Element::tag("div").child(Element::tag("span").child(ChildValue::Bool(true)));
    let err = engine.request_update(pair, Some(bad)).unwrap_err();
    assert!(matches!(err, ReconcileError::UnrecognizedNodeKind(_)));

    // Nothing was created or attached, the committed generation is still
    // current, and the engine is idle again.
    let host = engine.host();
    assert!(host.ops().is_empty());
    assert!(host.children_of(container).is_empty());
    assert_eq!(engine.current_root(pair), root_before);
    assert_eq!(engine.phase(), Phase::Idle);

    // A later well-formed request succeeds.
    engine
        .request_update(pair, Some(Element::tag("div").child("Hi")))
        .unwrap();
    let host = engine.host();
    let div = sole_child(host, container);
    assert_eq!(host.tag_of(div), Some("div"));
    assert_eq!(host.text_of(sole_child(host, div)), Some("Hi"));
}

#[test]
fn effect_masks_are_spent_after_commit() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    engine
        .request_update(pair, Some(Element::tag("div").child("Hi")))
        .unwrap();

    // Placement was applied; the committed nodes carry clean masks into
    // the next generation.
    let root = engine.current_root(pair);
    let arena = engine.arena();
    let div = arena.children(root).next().unwrap();
    assert!(arena.effects(div).is_empty());
    let text = arena.children(div).next().unwrap();
    assert!(arena.effects(text).is_empty());
}

#[test]
fn generation_pairing_is_symmetric_across_cycles() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    for _ in 0..3 {
        engine
            .request_update(pair, Some(Element::tag("div")))
            .unwrap();
        let root = engine.current_root(pair);
        let other = engine.arena().alternate(root);
        assert_eq!(engine.arena().alternate(other), root);
    }
}

#[test]
fn skipped_child_entries_keep_indices_contiguous() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    let list = Element::tag("div").children([
        ChildValue::Null,
        ChildValue::Text("a".into()),
        ChildValue::Bool(false),
        ChildValue::Text("b".into()),
        ChildValue::Num(3.0),
    ]);
    engine.request_update(pair, Some(list)).unwrap();

    let host = engine.host();
    let div = sole_child(host, container);
    let texts: Vec<_> = host
        .children_of(div)
        .iter()
        .map(|c| host.text_of(*c).unwrap().to_owned())
        .collect();
    assert_eq!(texts, vec!["a", "b", "3"]);

    let arena = engine.arena();
    let div_node = arena.children(engine.current_root(pair)).next().unwrap();
    let indices: Vec<_> = arena
        .children(div_node)
        .map(|c| arena.child_index(c))
        .collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn function_components_render_their_output() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    let component = Element::function(|props| {
        let greeting = match props.attrs.get("name") {
            Some(PropValue::Str(name)) => format!("Hello, {name}"),
            _ => "Hello".to_owned(),
        };
        Some(Element::tag("p").child(greeting))
    })
    .attr("name", "Ada");
    engine.request_update(pair, Some(component)).unwrap();

    let host = engine.host();
    let p = sole_child(host, container);
    assert_eq!(host.tag_of(p), Some("p"));
    assert_eq!(host.text_of(sole_child(host, p)), Some("Hello, Ada"));
}

#[test]
fn function_components_may_render_nothing() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    engine
        .request_update(pair, Some(Element::function(|_| None)))
        .unwrap();
    assert!(engine.host().children_of(container).is_empty());
}

#[test]
fn stateful_components_derive_children_structurally() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    let stateful = Element::stateful(|_| None).child(Element::tag("em").child("x"));
    engine.request_update(pair, Some(stateful)).unwrap();

    let host = engine.host();
    let em = sole_child(host, container);
    assert_eq!(host.tag_of(em), Some("em"));
    assert_eq!(host.text_of(sole_child(host, em)), Some("x"));
}

#[test]
fn listeners_register_once_and_dispatch() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    let hits = Rc::new(Cell::new(0));
    let h = Rc::clone(&hits);
    let button = Element::tag("button")
        .attr("id", "go")
        .on("click", move || h.set(h.get() + 1));
    engine.request_update(pair, Some(button.clone())).unwrap();

    let handle = sole_child(engine.host(), container);
    assert_eq!(engine.host().listener_events(handle), vec!["click"]);
    assert_eq!(
        engine.host().attr_of(handle, "id"),
        Some(&PropValue::Str("go".into()))
    );
    // The `onclick` key is a listener, never a plain attribute.
    assert!(engine.host().attr_of(handle, "onclick").is_none());

    engine.host().dispatch(handle, "click");
    assert_eq!(hits.get(), 1);

    // A rebuild reuses the instance; the listener is not re-registered.
    engine.request_update(pair, Some(button)).unwrap();
    engine.host().dispatch(handle, "click");
    assert_eq!(hits.get(), 2);
    assert_eq!(engine.host().listener_events(handle), vec!["click"]);
}

#[test]
fn completion_callback_fires_after_commit() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    let seen = Rc::new(Cell::new(false));
    let s = Rc::clone(&seen);
    engine
        .request_update_with(
            pair,
            Some(Element::tag("div")),
            Some(Box::new(move || s.set(true))),
        )
        .unwrap();

    assert!(seen.get());
    assert_eq!(engine.host().children_of(container).len(), 1);
}

#[test]
fn callback_of_a_failed_build_never_fires() {
    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    let seen = Rc::new(Cell::new(false));
    let s = Rc::clone(&seen);
    let bad = Element::tag("div").child(ChildValue::Bool(true));
    let result = engine.request_update_with(pair, Some(bad), Some(Box::new(move || s.set(true))));

    assert!(result.is_err());
    assert!(!seen.get());
}

#[test]
fn sibling_pairs_reconcile_independently() {
    let mut engine = engine();
    let left_container = engine.host().container();
    let right_container = {
        use reflow_core::HostTree as _;
        engine.host_mut().create_element_node("section")
    };
    let left = engine.create_tree_pair(left_container);
    let right = engine.create_tree_pair(right_container);

    engine
        .request_update(left, Some(Element::tag("div")))
        .unwrap();
    engine
        .request_update(right, Some(Element::tag("span")))
        .unwrap();

    let host = engine.host();
    assert_eq!(host.tag_of(sole_child(host, left_container)), Some("div"));
    assert_eq!(host.tag_of(sole_child(host, right_container)), Some("span"));

    engine.request_update(left, None).unwrap();
    let host = engine.host();
    assert!(host.children_of(left_container).is_empty());
    assert_eq!(host.children_of(right_container).len(), 1);
}

#[test]
fn general_enqueue_path_drives_a_rebuild() {
    use std::collections::BTreeMap;

    use reflow_core::UpdateEntry;

    let mut engine = engine();
    let container = engine.host().container();
    let pair = engine.create_tree_pair(container);

    engine
        .request_update(pair, Some(Element::tag("div")))
        .unwrap();
    assert_eq!(engine.host().children_of(container).len(), 1);

    // Merging onto the root's state replaces the description with a plain
    // map, so the rebuilt generation has no children to keep.
    let root = engine.current_root(pair);
    let merge = UpdatePayload::Merge(BTreeMap::from([(
        "flag".to_owned(),
        PropValue::Bool(true),
    )]));
    engine.enqueue_update(root, UpdateEntry::new(merge)).unwrap();

    assert!(engine.host().children_of(container).is_empty());
}

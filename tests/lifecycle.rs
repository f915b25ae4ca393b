//! End-to-end lifecycle scenarios through the public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_elements::engine::reset_definitions;
use spark_elements::{
    define, upgrade, view, DefaultValues, ElementDefinition, LifecycleState, MemoryElement,
    MountPoint, MountTarget, MountedNode, Node, PropValue, ReactiveMount, RenderError, Store,
    INTEGER_NAN,
};

// =============================================================================
// COUNTING MOUNT
// =============================================================================

/// Counts mount/unmount calls while delegating to the reactive mount.
#[derive(Clone, Default)]
struct CountingMount {
    mounts: Rc<Cell<usize>>,
    unmounts: Rc<Cell<usize>>,
}

impl MountPoint for CountingMount {
    fn mount(&self, target: MountTarget<'_>) -> Result<MountedNode, RenderError> {
        self.mounts.set(self.mounts.get() + 1);
        ReactiveMount.mount(target)
    }

    fn unmount(&self, node: MountedNode) {
        self.unmounts.set(self.unmounts.get() + 1);
        node.release();
    }
}

fn define_counter(counter_mount: &CountingMount) {
    reset_definitions();
    define(
        "x-counter",
        ElementDefinition::new(
            DefaultValues::new().with("count", 0).with("enabled", false),
            view(|ctx| {
                let count = ctx.prop("count").map(|v| v.to_string()).unwrap_or_default();
                let enabled = ctx.prop("enabled").map(|v| v.to_string()).unwrap_or_default();
                Ok(Node::element("div")
                    .child(Node::text(count))
                    .child(Node::text("/"))
                    .child(Node::text(enabled)))
            }),
        )
        .mount_point(counter_mount.clone()),
    )
    .unwrap();
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_counter_scenario() {
    let counter_mount = CountingMount::default();
    define_counter(&counter_mount);

    let el = upgrade(Rc::new(MemoryElement::new("x-counter"))).unwrap();
    el.connected_callback();

    el.attribute_changed_callback("count", None, Some("5"));
    assert_eq!(el.property("count"), Some(PropValue::Integer(5)));

    el.set_property("enabled", "yes").unwrap();
    assert_eq!(el.property("enabled"), Some(PropValue::Boolean(true)));
    assert_eq!(el.root().text_content(), "5/true");

    el.disconnected_callback();
    el.attribute_changed_callback("count", Some("5"), Some("6"));
    assert_eq!(counter_mount.mounts.get(), 1);
    assert_eq!(counter_mount.unmounts.get(), 1);
    assert_eq!(el.root().child_count(), 0);
}

#[test]
fn test_integer_properties_parse_or_store_sentinel() {
    let counter_mount = CountingMount::default();
    define_counter(&counter_mount);
    let el = upgrade(Rc::new(MemoryElement::new("x-counter"))).unwrap();

    for (input, expected) in [("0", 0), ("17", 17), ("-4", -4), ("  8 items", 8)] {
        el.set_property("count", input).unwrap();
        assert_eq!(el.property("count"), Some(PropValue::Integer(expected)), "input {input:?}");
    }

    for input in ["", "abc", "NaN", "--1"] {
        el.set_property("count", input).unwrap();
        assert_eq!(
            el.property("count"),
            Some(PropValue::Integer(INTEGER_NAN)),
            "input {input:?}"
        );
    }
}

#[test]
fn test_attribute_map_holds_last_value_per_name() {
    let counter_mount = CountingMount::default();
    define_counter(&counter_mount);
    let el = upgrade(Rc::new(MemoryElement::new("x-counter"))).unwrap();

    el.attribute_changed_callback("count", None, Some("1"));
    el.set_property("count", 40).unwrap();
    el.attribute_changed_callback("enabled", None, Some("no"));
    el.attribute_changed_callback("count", Some("1"), Some("2"));
    el.set_property("enabled", true).unwrap();
    el.attribute_changed_callback("count", Some("2"), Some("3"));

    let attrs = el.attrs().get();
    assert_eq!(attrs.get("count"), Some("3"));
    assert_eq!(attrs.get("enabled"), Some("no"));
    assert_eq!(attrs.len(), 2);
}

#[test]
fn test_disconnect_twice_unmounts_once() {
    let counter_mount = CountingMount::default();
    define_counter(&counter_mount);
    let el = upgrade(Rc::new(MemoryElement::new("x-counter"))).unwrap();
    el.connected_callback();

    el.disconnected_callback();
    el.disconnected_callback();

    assert_eq!(el.state(), LifecycleState::Disconnected);
    assert_eq!(counter_mount.unmounts.get(), 1);
}

#[test]
fn test_never_connected_disconnect_unmounts_construct_time_mount() {
    let counter_mount = CountingMount::default();
    define_counter(&counter_mount);

    // Mount happens at construction for every instance
    let instances: Vec<_> = (0..3)
        .map(|_| upgrade(Rc::new(MemoryElement::new("x-counter"))).unwrap())
        .collect();
    assert_eq!(counter_mount.mounts.get(), 3);

    for el in &instances {
        assert_eq!(el.state(), LifecycleState::Constructed);
        el.disconnected_callback();
        el.disconnected_callback();
    }
    assert_eq!(counter_mount.unmounts.get(), 3);
}

// =============================================================================
// STORE
// =============================================================================

#[test]
fn test_subscribe_replays_before_updates() {
    let store = Store::new(PropValue::Integer(1));
    let seen = Rc::new(RefCell::new(Vec::new()));

    let seen_clone = seen.clone();
    let sub = store.subscribe(move |v| seen_clone.borrow_mut().push(v.clone()));
    assert_eq!(*seen.borrow(), vec![PropValue::Integer(1)]);

    store.set(PropValue::Integer(2));
    assert_eq!(
        *seen.borrow(),
        vec![PropValue::Integer(1), PropValue::Integer(2)]
    );
    sub.unsubscribe();
}

#[test]
fn test_markup_attributes_seed_properties() {
    let counter_mount = CountingMount::default();
    define_counter(&counter_mount);

    let host = MemoryElement::new("x-counter")
        .with_attribute("count", "11")
        .with_attribute("enabled", "TRUE");
    let el = upgrade(Rc::new(host)).unwrap();

    assert_eq!(el.property("count"), Some(PropValue::Integer(11)));
    assert_eq!(el.property("enabled"), Some(PropValue::Boolean(true)));
    assert_eq!(el.root().text_content(), "11/true");
}

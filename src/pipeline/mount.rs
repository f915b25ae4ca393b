//! Mount API - Render Mount Point contract and the reactive implementation.
//!
//! A mount point takes a view function, the element's two stores, the host
//! and a root node, renders the view into the root and keeps it up to date.
//! `unmount` releases every node and subscription created by `mount`.
//!
//! # Example
//!
//! ```ignore
//! use spark_elements::pipeline::mount;
//!
//! let node = mount::mount(&view, &props, &attrs, &host, &root)?;
//! props.update(|m| m.with("count", 5.into())); // view re-renders
//! mount::unmount(node);                        // root is empty again
//! ```
//!
//! # ReactiveMount
//!
//! Both stores are bridged into spark-signals signals. The view renders once
//! synchronously (so errors reach the caller), then an effect inside an
//! `EffectScope` re-renders whenever either signal changes. Unmounting:
//! 1. Releases the store subscriptions
//! 2. Stops the scope (disposes the effect)
//! 3. Detaches the rendered node

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use spark_signals::{effect, effect_scope, on_scope_dispose, signal};

use crate::error::RenderError;
use crate::host::{HostElement, Node};
use crate::store::Store;
use crate::types::{AttributeMap, Cleanup, PropValue, PropertyModel};

// =============================================================================
// View
// =============================================================================

/// Everything a view sees when it renders.
pub struct ViewContext {
    pub props: PropertyModel,
    pub attrs: AttributeMap,
    pub host: Rc<dyn HostElement>,
}

impl ViewContext {
    pub fn prop(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name)
    }
}

/// View-producing function.
pub type ViewFn = Rc<dyn Fn(&ViewContext) -> Result<Node, RenderError>>;

/// Wrap a closure as a [`ViewFn`].
pub fn view(f: impl Fn(&ViewContext) -> Result<Node, RenderError> + 'static) -> ViewFn {
    Rc::new(f)
}

// =============================================================================
// Mount Point
// =============================================================================

/// Arguments of [`MountPoint::mount`].
///
/// The stores are borrowed: a mount point may subscribe to them but must not
/// keep a strong handle past `unmount`.
pub struct MountTarget<'a> {
    pub view: &'a ViewFn,
    pub props: &'a Store<PropertyModel>,
    pub attrs: &'a Store<AttributeMap>,
    pub host: &'a Rc<dyn HostElement>,
    pub root: &'a Node,
}

/// Renders views into roots.
pub trait MountPoint {
    fn mount(&self, target: MountTarget<'_>) -> Result<MountedNode, RenderError>;

    /// Release everything `mount` created.
    fn unmount(&self, node: MountedNode) {
        node.release();
    }
}

/// Result of a successful mount.
pub struct MountedNode {
    current: Rc<RefCell<Node>>,
    cleanups: Vec<Cleanup>,
}

impl MountedNode {
    pub fn new(node: Node) -> Self {
        Self {
            current: Rc::new(RefCell::new(node)),
            cleanups: Vec::new(),
        }
    }

    /// Register a cleanup to run on release, in registration order.
    pub fn on_release(mut self, cleanup: Cleanup) -> Self {
        self.cleanups.push(cleanup);
        self
    }

    /// The node currently rendered.
    pub fn node(&self) -> Node {
        self.current.borrow().clone()
    }

    /// Run all cleanups, then detach the rendered node.
    pub fn release(self) {
        for cleanup in self.cleanups {
            cleanup();
        }
        self.current.borrow().detach();
    }
}

impl fmt::Debug for MountedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedNode")
            .field("node", &*self.current.borrow())
            .field("cleanups", &self.cleanups.len())
            .finish()
    }
}

// =============================================================================
// Reactive Mount
// =============================================================================

/// Mount point that re-renders the whole view on every store change.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReactiveMount;

impl MountPoint for ReactiveMount {
    fn mount(&self, target: MountTarget<'_>) -> Result<MountedNode, RenderError> {
        let props_signal = signal(target.props.get());
        let attrs_signal = signal(target.attrs.get());

        // First render outside the effect so failures propagate
        let initial = (target.view)(&ViewContext {
            props: props_signal.get(),
            attrs: attrs_signal.get(),
            host: target.host.clone(),
        })?;
        target.root.append_child(initial.clone());
        let mounted = MountedNode::new(initial);

        let props_sub = {
            let props_signal = props_signal.clone();
            target.props.subscribe(move |props| { props_signal.set(props.clone()); })
        };
        let attrs_sub = {
            let attrs_signal = attrs_signal.clone();
            target.attrs.subscribe(move |attrs| { attrs_signal.set(attrs.clone()); })
        };

        let scope = effect_scope(false);
        let view = target.view.clone();
        let host = target.host.clone();
        let root = target.root.clone();
        let current = mounted.current.clone();
        let current_for_dispose = mounted.current.clone();
        let first_run = Rc::new(Cell::new(true));

        scope.run(move || {
            // Tracks both signals; the first run only establishes dependencies
            let _effect_cleanup = effect(move || {
                let ctx = ViewContext {
                    props: props_signal.get(),
                    attrs: attrs_signal.get(),
                    host: host.clone(),
                };
                if first_run.replace(false) {
                    return;
                }
                match view(&ctx) {
                    Ok(node) => {
                        let previous = current.replace(node.clone());
                        previous.detach();
                        root.append_child(node);
                    }
                    Err(err) => {
                        tracing::error!(
                            tag = %ctx.host.tag_name(),
                            error = %err,
                            "re-render failed, keeping previous view"
                        );
                    }
                }
            });

            on_scope_dispose(move || {
                current_for_dispose.borrow().detach();
            });
        });

        Ok(mounted
            .on_release(props_sub.into_cleanup())
            .on_release(attrs_sub.into_cleanup())
            .on_release(Box::new(move || scope.stop())))
    }
}

/// Mount `view` into `root` with [`ReactiveMount`].
pub fn mount(
    view: &ViewFn,
    props: &Store<PropertyModel>,
    attrs: &Store<AttributeMap>,
    host: &Rc<dyn HostElement>,
    root: &Node,
) -> Result<MountedNode, RenderError> {
    ReactiveMount.mount(MountTarget {
        view,
        props,
        attrs,
        host,
        root,
    })
}

/// Unmount a node produced by [`mount`].
pub fn unmount(node: MountedNode) {
    ReactiveMount.unmount(node);
}

// =============================================================================
// Tests
// =============================================================================

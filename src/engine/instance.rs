//! Element Instance - Native lifecycle callbacks mapped onto stores and mounts.
//!
//! # States
//!
//! ```text
//! Unattached ──construct──▶ Constructed ──connected──▶ Connected
//!                               │                          │
//!                               └──────disconnected────────┴──▶ Disconnected (terminal)
//! ```
//!
//! - **construct**: allocate the root, snapshot attributes, seed the property
//!   model, mount the view, install accessors. A mount failure is returned
//!   to the caller and no instance exists afterwards.
//! - **attribute changed**: update the attribute store, then (with
//!   `REFLECT_ATTRIBUTES`) write the new value through the property bridge.
//!   Every call writes, so the latest attribute or property write wins.
//! - **connected**: informational; runs the `on_connected` hook when
//!   `RUN_ON_CONNECT` is set.
//! - **disconnected**: unmount exactly once, unregister from devtools. Repeat calls are no-ops.
//!
//! Property writes always mutate the model until the instance is
//! disconnected; after that they are dropped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::config::AdapterOptions;
use crate::devtools::{self, MountPointId, StoreSource};
use crate::engine::adapter::CustomElementAdapter;
use crate::engine::definition::{ElementDefinition, Hook};
use crate::engine::reflect::PropertyBridge;
use crate::error::{ElementError, Result};
use crate::host::{HostElement, Node};
use crate::pipeline::{MountPoint, MountTarget, MountedNode, ViewFn};
use crate::store::Store;
use crate::types::{AttributeMap, LifecycleState, PropValue, PropertyModel};

/// Outcome of a property write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Applied,
    /// The instance is disconnected; the model was left alone.
    Dropped,
}

/// One live custom element.
pub struct ElementInstance {
    tag: String,
    host: Rc<dyn HostElement>,
    root: Node,
    view: ViewFn,
    adapter: Rc<dyn CustomElementAdapter>,
    mount_point: Rc<dyn MountPoint>,
    options: AdapterOptions,
    on_connected: Option<Hook>,
    on_disconnected: Option<Hook>,

    attrs: Store<AttributeMap>,
    props: Store<PropertyModel>,
    bridge: Option<PropertyBridge>,

    state: Cell<LifecycleState>,
    mounted: RefCell<Option<MountedNode>>,
    devtools_id: Cell<Option<MountPointId>>,
}

impl ElementInstance {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Construct an instance of `definition` bound to `host`.
    pub fn construct(definition: &ElementDefinition, host: Rc<dyn HostElement>) -> Result<Rc<Self>> {
        let tag = host.tag_name().to_string();
        let adapter = definition.adapter.clone();
        let options = definition.config.options();

        let root = host.attach_root(definition.config.root);
        let attributes = adapter.snapshot_attributes(host.as_ref());
        let bridge = adapter.property_bridge();

        let mut model = PropertyModel::seed(host.own_properties(), adapter.defaults().iter());
        if let Some(bridge) = &bridge {
            if options.contains(AdapterOptions::REFLECT_ATTRIBUTES) {
                model = bridge.apply_attributes(model, &attributes);
            }
        }

        let instance = Self {
            tag,
            host,
            root,
            view: definition.view.clone(),
            adapter,
            mount_point: definition.mount_point.clone(),
            options,
            on_connected: definition.on_connected.clone(),
            on_disconnected: definition.on_disconnected.clone(),
            attrs: Store::new(attributes),
            props: Store::new(model),
            bridge,
            state: Cell::new(LifecycleState::Unattached),
            mounted: RefCell::new(None),
            devtools_id: Cell::new(None),
        };

        let mounted = instance
            .mount_point
            .mount(instance.target())
            .map_err(|source| ElementError::Mount {
                tag: instance.tag.clone(),
                source,
            })?;
        *instance.mounted.borrow_mut() = Some(mounted);
        instance.state.set(LifecycleState::Constructed);

        let instance = Rc::new(instance);
        if options.contains(AdapterOptions::DEVTOOLS) {
            instance.register_devtools();
        }

        tracing::debug!(tag = %instance.tag, "constructed");
        Ok(instance)
    }

    fn target(&self) -> MountTarget<'_> {
        MountTarget {
            view: &self.view,
            props: &self.props,
            attrs: &self.attrs,
            host: &self.host,
            root: &self.root,
        }
    }

    fn register_devtools(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        let stores = vec![
            StoreSource::new(self.props.id(), self.props.inspector()),
            StoreSource::new(self.attrs.id(), self.attrs.inspector()),
        ];
        let id = devtools::register_mount_point(
            &self.tag,
            stores,
            Rc::new(move || match weak.upgrade() {
                Some(instance) => instance.remount(),
                None => Ok(()),
            }),
        );
        self.devtools_id.set(Some(id));
    }

    // =========================================================================
    // Native Callbacks
    // =========================================================================

    /// Observed attribute `name` changed from `old` to `new` (`None` = removed).
    pub fn attribute_changed_callback(&self, name: &str, old: Option<&str>, new: Option<&str>) {
        match self.state.get() {
            LifecycleState::Constructed | LifecycleState::Connected => {}
            state => {
                tracing::debug!(tag = %self.tag, name, ?state, "attribute change ignored");
                return;
            }
        }
        if !self.adapter.is_observed(name) {
            tracing::debug!(tag = %self.tag, name, "unobserved attribute ignored");
            return;
        }

        tracing::debug!(tag = %self.tag, name, ?old, ?new, "attribute changed");
        self.attrs.update(|map| map.with(name, new));

        if let Some(bridge) = &self.bridge {
            if self.options.contains(AdapterOptions::REFLECT_ATTRIBUTES) {
                bridge.reflect_attribute(&self.props, name, new);
            }
        }
    }

    /// The element was inserted into a document.
    pub fn connected_callback(&self) {
        match self.state.get() {
            LifecycleState::Constructed => {
                self.state.set(LifecycleState::Connected);
                tracing::debug!(tag = %self.tag, "connected");
                if self.options.contains(AdapterOptions::RUN_ON_CONNECT) {
                    if let Some(hook) = &self.on_connected {
                        hook(self);
                    }
                }
            }
            LifecycleState::Connected => {
                tracing::debug!(tag = %self.tag, "already connected");
            }
            LifecycleState::Disconnected => {
                tracing::warn!(tag = %self.tag, "connect after disconnect ignored");
            }
            LifecycleState::Unattached => {}
        }
    }

    /// The element was removed from its document. Idempotent.
    pub fn disconnected_callback(&self) {
        if self.state.get() == LifecycleState::Disconnected {
            tracing::debug!(tag = %self.tag, "already disconnected");
            return;
        }
        self.state.set(LifecycleState::Disconnected);
        self.dispose();
        tracing::debug!(tag = %self.tag, "disconnected");

        if let Some(hook) = &self.on_disconnected {
            hook(self);
        }
    }

    fn dispose(&self) {
        let mounted = self.mounted.borrow_mut().take();
        if let Some(node) = mounted {
            self.mount_point.unmount(node);
        }
        if let Some(id) = self.devtools_id.take() {
            devtools::unregister_mount_point(id);
        }
    }

    /// Unmount and mount the view again. No-op once disconnected.
    ///
    /// If mounting fails the instance stays without a mounted tree.
    pub fn remount(&self) -> Result<()> {
        if self.state.get() == LifecycleState::Disconnected {
            return Ok(());
        }
        let previous = self.mounted.borrow_mut().take();
        if let Some(node) = previous {
            self.mount_point.unmount(node);
        }
        let node = self
            .mount_point
            .mount(self.target())
            .map_err(|source| ElementError::Mount {
                tag: self.tag.clone(),
                source,
            })?;
        *self.mounted.borrow_mut() = Some(node);
        tracing::debug!(tag = %self.tag, "remounted");
        Ok(())
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Current value of property `key`, as stored.
    pub fn property(&self, key: &str) -> Option<PropValue> {
        self.bridge.as_ref()?.get(&self.props, key)
    }

    /// Write property `key`, coercing `value` into the key's type.
    pub fn set_property(&self, key: &str, value: impl Into<PropValue>) -> Result<WriteOutcome> {
        let Some(bridge) = self.bridge.as_ref().filter(|b| b.accessor(key).is_some()) else {
            return Err(ElementError::UnknownProperty {
                tag: self.tag.clone(),
                key: key.to_string(),
            });
        };
        if self.state.get() == LifecycleState::Disconnected {
            tracing::debug!(tag = %self.tag, key, "property write after disconnect dropped");
            return Ok(WriteOutcome::Dropped);
        }
        bridge.set(&self.props, key, value.into());
        Ok(WriteOutcome::Applied)
    }

    /// Names of the installed property accessors, in declaration order.
    pub fn property_names(&self) -> Vec<String> {
        self.bridge
            .as_ref()
            .map(|b| b.names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn host(&self) -> &Rc<dyn HostElement> {
        &self.host
    }

    /// Root the view renders into.
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn props(&self) -> &Store<PropertyModel> {
        &self.props
    }

    pub fn attrs(&self) -> &Store<AttributeMap> {
        &self.attrs
    }

    pub fn observed_attributes(&self) -> &[String] {
        self.adapter.observed_attributes()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.borrow().is_some()
    }

    pub fn devtools_id(&self) -> Option<MountPointId> {
        self.devtools_id.get()
    }
}

impl Drop for ElementInstance {
    fn drop(&mut self) {
        // Dropped without a disconnect: still release what mount created
        self.dispose();
    }
}

impl fmt::Debug for ElementInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementInstance")
            .field("tag", &self.tag)
            .field("state", &self.state.get())
            .field("props", &self.props)
            .field("attrs", &self.attrs)
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

//! Element Definition - What a tag name is bound to.
//!
//! ```ignore
//! use spark_elements::{DefaultValues, ElementDefinition, Node, view};
//!
//! let counter = ElementDefinition::new(
//!     DefaultValues::new().with("count", 0),
//!     view(|ctx| Ok(Node::text(format!("{}", ctx.prop("count").unwrap())))),
//! )
//! .on_connected(|el| tracing::info!(tag = el.tag(), "ready"));
//! ```

use std::fmt;
use std::rc::Rc;

use crate::config::{AdapterOptions, ElementConfig};
use crate::engine::adapter::{CustomElementAdapter, PlainAdapter, ReflectingAdapter};
use crate::engine::instance::ElementInstance;
use crate::error::Result;
use crate::host::HostElement;
use crate::pipeline::{MountPoint, ReactiveMount, ViewFn};
use crate::types::{DefaultValues, RootMode};

/// Lifecycle hook.
pub type Hook = Rc<dyn Fn(&ElementInstance)>;

/// Adapter variant, view, mount point, configuration and hooks for one tag.
///
/// Cloning shares everything.
#[derive(Clone)]
pub struct ElementDefinition {
    pub(crate) adapter: Rc<dyn CustomElementAdapter>,
    pub(crate) view: ViewFn,
    pub(crate) mount_point: Rc<dyn MountPoint>,
    pub(crate) config: ElementConfig,
    pub(crate) on_connected: Option<Hook>,
    pub(crate) on_disconnected: Option<Hook>,
}

impl ElementDefinition {
    /// Element with typed properties seeded from `defaults`.
    pub fn new(defaults: DefaultValues, view: ViewFn) -> Self {
        Self::with_adapter(ReflectingAdapter::new(defaults), view)
    }

    /// Element without properties; the view sees the attributes present at
    /// construction.
    pub fn without_properties(view: ViewFn) -> Self {
        Self::with_adapter(PlainAdapter::new(), view)
    }

    pub fn with_adapter(adapter: impl CustomElementAdapter + 'static, view: ViewFn) -> Self {
        Self {
            adapter: Rc::new(adapter),
            view,
            mount_point: Rc::new(ReactiveMount),
            config: ElementConfig::default(),
            on_connected: None,
            on_disconnected: None,
        }
    }

    pub fn root_mode(mut self, root: RootMode) -> Self {
        self.config.root = root;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ElementConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the option flags, keeping the root mode.
    pub fn options(mut self, options: AdapterOptions) -> Self {
        let root = self.config.root;
        self.config = ElementConfig::from(options);
        self.config.root = root;
        self
    }

    pub fn mount_point(mut self, mount_point: impl MountPoint + 'static) -> Self {
        self.mount_point = Rc::new(mount_point);
        self
    }

    /// Hook run on connect when `RUN_ON_CONNECT` is set.
    pub fn on_connected(mut self, hook: impl Fn(&ElementInstance) + 'static) -> Self {
        self.on_connected = Some(Rc::new(hook));
        self
    }

    /// Hook run once, after the instance is disposed.
    pub fn on_disconnected(mut self, hook: impl Fn(&ElementInstance) + 'static) -> Self {
        self.on_disconnected = Some(Rc::new(hook));
        self
    }

    pub fn observed_attributes(&self) -> &[String] {
        self.adapter.observed_attributes()
    }

    pub fn defaults(&self) -> &DefaultValues {
        self.adapter.defaults()
    }

    pub fn element_config(&self) -> &ElementConfig {
        &self.config
    }

    /// Construct an instance bound to `host`.
    pub fn construct(&self, host: Rc<dyn HostElement>) -> Result<Rc<ElementInstance>> {
        ElementInstance::construct(self, host)
    }
}

impl fmt::Debug for ElementDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementDefinition")
            .field("observed_attributes", &self.adapter.observed_attributes())
            .field("config", &self.config)
            .field("on_connected", &self.on_connected.is_some())
            .field("on_disconnected", &self.on_disconnected.is_some())
            .finish_non_exhaustive()
    }
}

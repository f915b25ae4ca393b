//! # spark-elements
//!
//! Reactive Custom Element adapter for Rust.
//!
//! Binds a view function and two reactive stores to the native custom-element
//! lifecycle: attributes land in an attribute store, typed properties live in
//! a property store, and a mount point keeps the rendered nodes in step with
//! both.
//!
//! ## Architecture
//!
//! ```text
//! construct / attributeChanged / connected / disconnected
//!        ↓
//! ElementInstance ──→ Store<AttributeMap> ──→ PropertyBridge ──→ Store<PropertyModel>
//!        ↓                    ↓                                        ↓
//!   MountPoint  ←──────────── signals ←────────────────────────────────┘
//!        ↓
//!   root (shadow or light)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use spark_elements::{define, upgrade, view, DefaultValues, ElementDefinition, MemoryElement, Node};
//!
//! define("x-counter", ElementDefinition::new(
//!     DefaultValues::new().with("count", 0).with("enabled", false),
//!     view(|ctx| Ok(Node::text(format!("{}", ctx.prop("count").unwrap())))),
//! ))?;
//!
//! let el = upgrade(Rc::new(MemoryElement::new("x-counter")))?;
//! el.attribute_changed_callback("count", None, Some("5"));
//! assert_eq!(el.root().text_content(), "5");
//! el.disconnected_callback();
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Prop values, coercion kinds, attribute map, property model
//! - [`store`] - Reactive store with replay-on-subscribe
//! - [`host`] - Host element trait, in-memory element and node tree
//! - [`engine`] - Definitions, registry, lifecycle adapter, property bridge
//! - [`pipeline`] - Render mount point contract and reactive implementation
//! - [`devtools`] - Control block for the devtools panel
//! - [`config`] - Element configuration and option flags
//! - [`error`] - Error types

pub mod config;
pub mod devtools;
pub mod engine;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod store;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{AdapterOptions, ElementConfig};

pub use error::{ElementError, RenderError, Result};

pub use store::{Store, StoreId, Unsubscribe};

pub use host::{HostElement, MemoryElement, Node, NodeKind};

pub use engine::{
    define, is_defined, upgrade, CustomElementAdapter, ElementDefinition, ElementInstance,
    PlainAdapter, PropertyAccessor, PropertyBridge, ReflectingAdapter, WriteOutcome,
};

pub use pipeline::{
    mount, unmount, view, MountPoint, MountTarget, MountedNode, ReactiveMount, ViewContext,
    ViewFn,
};

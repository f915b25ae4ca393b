//! Element Engine - Definitions, instances and the lifecycle adapter.
//!
//! The engine turns native custom-element callbacks into store operations:
//! - Registry: Tag name ↔ definition, name validation, upgrade
//! - Definition: Adapter variant + view + mount point + config + hooks
//! - Instance: Lifecycle state machine, owns the two stores and the mount
//! - Adapter: Variant policy (reflecting vs plain)
//! - Reflect: Typed property accessors and attribute reflection
//!
//! # Control Flow
//!
//! ```text
//! native callback → ElementInstance → Store<AttributeMap>
//!                                   ↘ PropertyBridge → Store<PropertyModel>
//!                                                         ↓
//!                                            MountPoint re-renders root
//! ```

mod adapter;
mod definition;
mod instance;
mod reflect;
mod registry;

pub use adapter::{CustomElementAdapter, PlainAdapter, ReflectingAdapter};
pub use definition::{ElementDefinition, Hook};
pub use instance::{ElementInstance, WriteOutcome};
pub use reflect::{PropertyAccessor, PropertyBridge};
pub use registry::{
    define, defined_names, get_definition, is_defined, is_valid_name, observed_attributes,
    reset_definitions, upgrade,
};

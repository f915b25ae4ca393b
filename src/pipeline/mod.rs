//! Render Pipeline
//!
//! Connects an element's stores to the nodes under its root.
//!
//! ```text
//! Store<PropertyModel> ┐
//!                      ├→ signals → render effect → view(ctx) → root
//! Store<AttributeMap>  ┘
//! ```
//!
//! The [`MountPoint`] trait is the contract the lifecycle adapter consumes;
//! [`ReactiveMount`] is the implementation used unless a definition supplies
//! its own.

pub mod mount;

pub use mount::{
    mount, unmount, view, MountPoint, MountTarget, MountedNode, ReactiveMount, ViewContext,
    ViewFn,
};

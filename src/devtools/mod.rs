//! Devtools Control Block - What the devtools panel can see and poke.
//!
//! A thread-wide registry of live elements and their stores:
//! - Created when the first element registers (first mount)
//! - Torn down when the last element unregisters (last unmount)
//! - Reached only through the functions in this module
//!
//! The panel asks for store snapshots and mount point listings, can force a
//! remount, reads and writes [`DevtoolsOptions`] and log category switches,
//! and receives [`BridgeMessage`]s from the outbox ([`take_messages`]). The
//! outbox keeps at most [`OUTBOX_CAPACITY`] messages; older ones are dropped.
//!
//! # Log categories
//!
//! Each category names one `tracing` target of this crate. The switches do
//! nothing on their own: install [`log_target_enabled`] as a subscriber
//! filter to honour them.
//!
//! ```ignore
//! use tracing_subscriber::{filter::filter_fn, prelude::*};
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(filter_fn(|meta| spark_elements::devtools::log_target_enabled(meta.target())))
//!     .init();
//! ```
//!
//! Only definitions with [`AdapterOptions::DEVTOOLS`](crate::config::AdapterOptions)
//! register their instances.

mod protocol;

pub use protocol::{
    BridgeMessage, DevtoolsOptions, MountPointInfo, StoreEntry, StoreSnapshot, CONTENT_PORT,
    DEVTOOLS_PORT,
};

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{ElementError, Result};
use crate::store::StoreId;

/// Crate version reported to the panel.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Layout version of the control block API.
pub const CONTROL_BLOCK_VERSION: u32 = 1;

/// Maximum number of undelivered panel messages.
pub const OUTBOX_CAPACITY: usize = 256;

/// Log categories and the `tracing` target each one covers.
pub const LOG_CATEGORIES: [(&str, &str); 5] = [
    ("element", "spark_elements::engine::instance"),
    ("bridge", "spark_elements::engine::reflect"),
    ("registry", "spark_elements::engine::registry"),
    ("mount", "spark_elements::pipeline::mount"),
    ("devtools", "spark_elements::devtools"),
];

// =============================================================================
// Types
// =============================================================================

/// Identifier of a registered element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MountPointId(pub u64);

impl fmt::Display for MountPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A store exposed to the panel.
#[derive(Clone)]
pub struct StoreSource {
    pub id: StoreId,
    pub inspect: Rc<dyn Fn() -> serde_json::Value>,
}

impl StoreSource {
    pub fn new(id: StoreId, inspect: impl Fn() -> serde_json::Value + 'static) -> Self {
        Self {
            id,
            inspect: Rc::new(inspect),
        }
    }
}

/// Remount callback of a registered element.
pub type RemountFn = Rc<dyn Fn() -> Result<()>>;

struct MountPointEntry {
    tag: String,
    stores: Vec<StoreSource>,
    remount: RemountFn,
}

struct ControlBlock {
    mount_points: IndexMap<MountPointId, MountPointEntry>,
    outbox: VecDeque<BridgeMessage>,
    options: DevtoolsOptions,
    log_categories: IndexMap<&'static str, bool>,
}

impl ControlBlock {
    fn new() -> Self {
        let mut block = Self {
            mount_points: IndexMap::new(),
            outbox: VecDeque::new(),
            options: DevtoolsOptions::default(),
            log_categories: LOG_CATEGORIES.iter().map(|(name, _)| (*name, true)).collect(),
        };
        block.post(BridgeMessage::ContentPageConnected);
        block
    }

    fn post(&mut self, message: BridgeMessage) {
        if self.outbox.len() == OUTBOX_CAPACITY {
            let dropped = self.outbox.pop_front();
            tracing::debug!(?dropped, "devtools outbox full, dropping oldest message");
        }
        self.outbox.push_back(message);
    }
}

// =============================================================================
// State
// =============================================================================

thread_local! {
    static CONTROL_BLOCK: RefCell<Option<ControlBlock>> = const { RefCell::new(None) };

    static NEXT_MOUNT_POINT_ID: Cell<u64> = const { Cell::new(1) };
}

fn with_control_block<R>(f: impl FnOnce(&mut ControlBlock) -> R) -> Option<R> {
    CONTROL_BLOCK.with(|cb| cb.borrow_mut().as_mut().map(f))
}

/// Whether the control block currently exists.
pub fn is_active() -> bool {
    CONTROL_BLOCK.with(|cb| cb.borrow().is_some())
}

pub fn version() -> &'static str {
    VERSION
}

pub fn control_block_version() -> u32 {
    CONTROL_BLOCK_VERSION
}

// =============================================================================
// Registration
// =============================================================================

/// Register an element. Creates the control block on first use.
///
/// Queues a `sutil-new-store` message per store.
pub fn register_mount_point(
    tag: &str,
    stores: Vec<StoreSource>,
    remount: RemountFn,
) -> MountPointId {
    let id = NEXT_MOUNT_POINT_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        MountPointId(id)
    });

    CONTROL_BLOCK.with(|cb| {
        let mut cb = cb.borrow_mut();
        let block = cb.get_or_insert_with(|| {
            tracing::debug!("devtools control block created");
            ControlBlock::new()
        });
        for store in &stores {
            block.post(BridgeMessage::NewStore { id: store.id });
        }
        block.mount_points.insert(
            id,
            MountPointEntry {
                tag: tag.to_string(),
                stores,
                remount,
            },
        );
    });

    id
}

/// Unregister an element. Drops the control block when it was the last one.
pub fn unregister_mount_point(id: MountPointId) {
    CONTROL_BLOCK.with(|cb| {
        let mut cb = cb.borrow_mut();
        let Some(block) = cb.as_mut() else { return };
        block.mount_points.shift_remove(&id);

        // AUTO-CLEANUP: last element gone, tear down (pending messages included)
        if block.mount_points.is_empty() {
            *cb = None;
            tracing::debug!("devtools control block released");
        }
    });
}

// =============================================================================
// Panel Requests
// =============================================================================

/// Current value of every registered store.
pub fn store_snapshot() -> Result<StoreSnapshot> {
    // Collect first: inspectors run without the control block borrowed
    let sources: Vec<StoreSource> = with_control_block(|block| {
        block
            .mount_points
            .values()
            .flat_map(|entry| entry.stores.iter().cloned())
            .collect()
    })
    .ok_or(ElementError::DevtoolsInactive)?;

    Ok(StoreSnapshot {
        data: sources
            .into_iter()
            .map(|source| StoreEntry {
                id: source.id,
                val: (source.inspect)(),
            })
            .collect(),
    })
}

/// Registered elements, in registration order.
pub fn mount_points() -> Result<Vec<MountPointInfo>> {
    with_control_block(|block| {
        block
            .mount_points
            .iter()
            .map(|(id, entry)| MountPointInfo {
                id: id.0,
                tag: entry.tag.clone(),
                stores: entry.stores.iter().map(|s| s.id).collect(),
            })
            .collect()
    })
    .ok_or(ElementError::DevtoolsInactive)
}

/// Unmount and mount the element registered as `id` again.
pub fn remount(id: MountPointId) -> Result<()> {
    let remount = with_control_block(|block| block.mount_points.get(&id).map(|e| e.remount.clone()))
        .ok_or(ElementError::DevtoolsInactive)?
        .ok_or(ElementError::UnknownMountPoint(id.0))?;
    remount()
}

/// Drain queued messages for the panel, oldest first.
pub fn take_messages() -> Vec<BridgeMessage> {
    with_control_block(|block| block.outbox.drain(..).collect()).unwrap_or_default()
}

pub fn get_options() -> Result<DevtoolsOptions> {
    with_control_block(|block| block.options).ok_or(ElementError::DevtoolsInactive)
}

pub fn set_options(options: DevtoolsOptions) -> Result<()> {
    with_control_block(|block| block.options = options).ok_or(ElementError::DevtoolsInactive)
}

// =============================================================================
// Log Categories
// =============================================================================

/// Every log category with its on/off state, in [`LOG_CATEGORIES`] order.
pub fn get_log_categories() -> Result<Vec<(String, bool)>> {
    with_control_block(|block| {
        block
            .log_categories
            .iter()
            .map(|(name, enabled)| (name.to_string(), *enabled))
            .collect()
    })
    .ok_or(ElementError::DevtoolsInactive)
}

/// Switch categories on or off. Unknown names are ignored.
pub fn set_log_categories<S: AsRef<str>>(states: &[(S, bool)]) -> Result<()> {
    with_control_block(|block| {
        for (name, enabled) in states {
            match block.log_categories.get_mut(name.as_ref()) {
                Some(slot) => *slot = *enabled,
                None => tracing::warn!(category = name.as_ref(), "unknown log category ignored"),
            }
        }
    })
    .ok_or(ElementError::DevtoolsInactive)
}

/// Whether events with `target` pass the panel's log switches.
///
/// Targets outside this crate always pass, as does everything while the
/// control block is inactive.
pub fn log_target_enabled(target: &str) -> bool {
    if !target.starts_with("spark_elements") {
        return true;
    }
    // try_with: filters may run while the thread-local is being torn down
    CONTROL_BLOCK
        .try_with(|cb| {
            // Events raised while the block itself is being mutated pass
            let Ok(cb) = cb.try_borrow() else {
                return true;
            };
            let Some(block) = cb.as_ref() else {
                return true;
            };
            if !block.options.logging_enabled {
                return false;
            }
            LOG_CATEGORIES
                .iter()
                .find(|(_, prefix)| target.starts_with(prefix))
                .and_then(|(name, _)| block.log_categories.get(name).copied())
                .unwrap_or(true)
        })
        .unwrap_or(true)
}

/// Drop the control block (for testing).
pub fn reset_control_block() {
    CONTROL_BLOCK.with(|cb| *cb.borrow_mut() = None);
}

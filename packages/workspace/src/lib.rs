//! # Trellis Workspace
//!
//! The serving side of the site: a client-state cache mirroring the last
//! resolved views for the UI layer, and the metadata snapshot: the
//! persisted representation used for fast read-only serving, refreshed from
//! the live stores whenever the author's edit session saves.
//!
//! The stores remain the source of truth; the snapshot is a projection.

pub mod snapshot;
pub mod state;

pub use snapshot::{Snapshot, SnapshotError, SnapshotView};
pub use state::{CachedView, ClientCache};

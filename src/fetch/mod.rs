// src/fetch/mod.rs

pub mod catalog;
pub mod loader;

pub use catalog::{acquire_snapshot, fetch_catalog, load_snapshot, ErddapResponse, ErddapTable};
pub use loader::{mount, MountGuard, SnapshotSlot};

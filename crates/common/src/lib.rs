//! Shared types: stable instance identifiers, node handles, transforms.
//!
//! # Invariants
//! - An `InstanceId` never changes after creation and survives serialization.
//! - A transform's resolved parent is a handle, never an owning pointer.

pub mod types;

pub use types::{InstanceId, NO_PARENT, NodeIndex, Transform};

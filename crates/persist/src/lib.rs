//! Persistence: the scene path registry and per-scene JSON documents.
//!
//! # Invariants
//! - The registry document is always rewritten whole from the in-memory map.
//! - A registry document that exists but does not parse is fatal at load.
//! - Scene documents that fail to load never yield a partial scene.

pub mod document;
pub mod registry;

pub use document::{DocumentError, JsonSceneSerializer, SceneSerializer};
pub use registry::{REGISTRY_FILE, RegistryError, ScenePathRegistry};

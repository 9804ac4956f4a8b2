//! Scene kernel: scenes own nodes, nodes own transforms, parent links are
//! rebuilt from persisted identifiers.
//!
//! # Invariants
//! - Every `instanceID` within a scene is unique.
//! - A resolved parent is a `NodeIndex` into the same scene, never ownership.
//! - Reconciliation never fails: unresolvable parents degrade to "no parent".

pub mod component;
pub mod hierarchy;
pub mod scene;

pub use component::{Collider, Component, MaterialHandle, MeshHandle, Renderable, RigidBody};
pub use hierarchy::{IdentifierIndex, ReconcileReport, reconcile};
pub use scene::{Node, Scene, SceneError, UNNAMED_SCENE};

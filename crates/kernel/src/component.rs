//! Facets a node can carry besides its transform.
//!
//! The scene core never interprets these; they ride along through
//! serialization so render and physics collaborators find them on load.

use serde::{Deserialize, Serialize};

/// A handle referencing a mesh asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshHandle(pub u64);

/// A handle referencing a material asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialHandle(pub u64);

/// Renderable facet: references mesh and material assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Renderable {
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
}

/// Rigid body facet for physics collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub mass: f32,
    pub is_kinematic: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            is_kinematic: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    Box { half_extents: [f32; 3] },
    Sphere { radius: f32 },
}

impl Default for Collider {
    fn default() -> Self {
        Self::Box {
            half_extents: [0.5, 0.5, 0.5],
        }
    }
}

/// Any facet attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Component {
    Renderable(Renderable),
    RigidBody(RigidBody),
    Collider(Collider),
}

impl Component {
    /// Short type label, used by tooling.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Renderable(_) => "Renderable",
            Self::RigidBody(_) => "RigidBody",
            Self::Collider(_) => "Collider",
        }
    }
}

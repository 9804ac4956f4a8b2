use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

/// Literal stored in `parentID` when a transform has no parent.
pub const NO_PARENT: &str = "null";

/// Stable identifier of a transform.
///
/// Assigned once at creation and carried verbatim through every save/load
/// cycle, so persisted parent links can name their target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    /// Generate a fresh, process-wide unique id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for InstanceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for InstanceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a node inside its owning scene's node sequence.
///
/// Used as the resolved-parent handle: the scene owns every node, a
/// `NodeIndex` only names one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hierarchical and spatial facet of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(rename = "instanceID", default)]
    instance_id: InstanceId,
    #[serde(rename = "parentID", default, with = "parent_id")]
    parent_id: Option<InstanceId>,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    /// Resolved parent. Only reconciliation writes this; never persisted.
    #[serde(skip)]
    parent: Option<NodeIndex>,
}

impl Transform {
    /// Identity transform with a fresh instance id and no parent.
    pub fn new() -> Self {
        Self::with_id(InstanceId::new())
    }

    /// Identity transform carrying a specific instance id.
    pub fn with_id(instance_id: impl Into<InstanceId>) -> Self {
        Self {
            instance_id: instance_id.into(),
            parent_id: None,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            parent: None,
        }
    }

    /// Builder form of [`Transform::set_parent_id`].
    pub fn with_parent_id(mut self, parent_id: impl Into<InstanceId>) -> Self {
        self.set_parent_id(Some(parent_id.into()));
        self
    }

    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    /// Declared parent, `None` for the no-parent sentinel.
    pub fn parent_id(&self) -> Option<&InstanceId> {
        self.parent_id.as_ref()
    }

    /// Change the declared parent. The resolved parent is cleared until the
    /// owning scene is reconciled again.
    pub fn set_parent_id(&mut self, parent_id: Option<InstanceId>) {
        self.parent_id = parent_id;
        self.parent = None;
    }

    /// Resolved parent handle, set by reconciliation.
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Write the resolved parent handle. Reserved for reconciliation and for
    /// scene edits that invalidate handles.
    #[doc(hidden)]
    pub fn set_parent(&mut self, parent: Option<NodeIndex>) {
        self.parent = parent;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

/// `parentID` is written as the `"null"` literal when absent. On read, the
/// literal, JSON `null` and a missing field all mean "no parent".
mod parent_id {
    use super::{InstanceId, NO_PARENT};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<InstanceId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => serializer.serialize_str(id.as_str()),
            None => serializer.serialize_str(NO_PARENT),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<InstanceId>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|s| s != NO_PARENT).map(InstanceId::from))
    }
}

use crate::component::Component;
use serde::{Deserialize, Serialize};
use stagehand_common::{InstanceId, NodeIndex, Transform};
use std::collections::HashSet;

/// Name given to a scene built without one.
pub const UNNAMED_SCENE: &str = "UnNamed";

/// Errors from scene construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("duplicate instance id {0}")]
    DuplicateInstanceId(InstanceId),
}

/// A game object: exactly one transform plus optional facets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    transform: Transform,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
    #[serde(skip)]
    initialized: bool,
}

impl Node {
    /// Node with a fresh identity transform.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_transform(name, Transform::new())
    }

    pub fn with_transform(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            components: Vec::new(),
            initialized: false,
        }
    }

    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn instance_id(&self) -> &InstanceId {
        self.transform.instance_id()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable transform access. The instance id itself stays immutable.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Whether [`Scene::init`] has run over this node.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn init(&mut self) {
        // Hand-edited documents may carry denormalized rotations.
        if self.transform.rotation.length_squared() > 0.0 {
            self.transform.rotation = self.transform.rotation.normalize();
        }
        self.initialized = true;
    }
}

/// A named collection of nodes forming one loadable level.
///
/// The scene owns every node. Parent links between nodes are `NodeIndex`
/// handles held by transforms and are only meaningful after
/// [`crate::reconcile`] has run over the current node sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SceneDocument")]
pub struct Scene {
    name: String,
    #[serde(rename = "gameObjects")]
    nodes: Vec<Node>,
}

/// Unvalidated document form of a scene.
#[derive(Deserialize)]
struct SceneDocument {
    #[serde(default = "unnamed")]
    name: String,
    #[serde(rename = "gameObjects", default)]
    nodes: Vec<Node>,
}

fn unnamed() -> String {
    UNNAMED_SCENE.to_owned()
}

impl TryFrom<SceneDocument> for Scene {
    type Error = SceneError;

    fn try_from(doc: SceneDocument) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(doc.nodes.len());
        if let Some(dup) = doc.nodes.iter().find(|n| !seen.insert(n.instance_id())) {
            return Err(SceneError::DuplicateInstanceId(dup.instance_id().clone()));
        }
        Ok(Self {
            name: doc.name,
            nodes: doc.nodes,
        })
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(UNNAMED_SCENE)
    }
}

impl Scene {
    /// Empty scene with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in sequence order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0)
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(index.0)
    }

    /// Append a node. Fails if its instance id is already present.
    pub fn add_node(&mut self, node: Node) -> Result<NodeIndex, SceneError> {
        self.ensure_unique(node.instance_id())?;
        self.nodes.push(node);
        Ok(NodeIndex(self.nodes.len() - 1))
    }

    /// Insert a node at `index` (clamped to the sequence length).
    ///
    /// Shifts later nodes, so every resolved parent is cleared; reconcile
    /// before reading links again.
    pub fn insert_node(&mut self, index: usize, node: Node) -> Result<NodeIndex, SceneError> {
        self.ensure_unique(node.instance_id())?;
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
        self.unlink_all();
        Ok(NodeIndex(index))
    }

    /// Remove the node with the given instance id, returning its former
    /// position and the node itself.
    ///
    /// Every resolved parent is cleared, as with [`Scene::insert_node`].
    pub fn remove_node(&mut self, id: &str) -> Option<(NodeIndex, Node)> {
        let index = self.position_of(id)?;
        let mut node = self.nodes.remove(index.0);
        node.transform.set_parent(None);
        self.unlink_all();
        Some((index, node))
    }

    /// Linear scan for the node owning `id`.
    pub fn position_of(&self, id: &str) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .position(|n| n.instance_id().as_str() == id)
            .map(NodeIndex)
    }

    pub fn find_node(&self, id: &str) -> Option<&Node> {
        self.position_of(id).and_then(|i| self.node(i))
    }

    /// First transform in node order whose instance id equals `id`.
    pub fn find_transform_by_instance_id(&self, id: &str) -> Option<&Transform> {
        self.nodes
            .iter()
            .map(|n| &n.transform)
            .find(|t| t.instance_id().as_str() == id)
    }

    /// Resolved parent of the node at `index`.
    pub fn parent_of(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.node(index).and_then(|n| n.transform.parent())
    }

    /// Nodes whose resolved parent is `index`, in sequence order.
    pub fn children_of(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.transform.parent() == Some(index))
            .map(|(i, _)| NodeIndex(i))
            .collect()
    }

    /// Nodes without a resolved parent, in sequence order.
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.transform.parent().is_none())
            .map(|(i, _)| NodeIndex(i))
            .collect()
    }

    /// Number of resolved ancestors above `index`.
    ///
    /// The walk stops after `len()` steps, so a cycle in persisted parent
    /// ids yields a finite depth.
    pub fn depth_of(&self, index: NodeIndex) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent_of(index);
        while let Some(parent) = cursor {
            if depth >= self.nodes.len() {
                break;
            }
            depth += 1;
            cursor = self.parent_of(parent);
        }
        depth
    }

    /// Run per-node initialization over every node.
    pub fn init(&mut self) {
        self.init_with(|_| {});
    }

    /// Run per-node initialization, then `hook`, over every node in order.
    pub fn init_with(&mut self, mut hook: impl FnMut(&mut Node)) {
        for node in &mut self.nodes {
            node.init();
            hook(node);
        }
    }

    pub(crate) fn unlink_all(&mut self) {
        for node in &mut self.nodes {
            node.transform.set_parent(None);
        }
    }

    fn ensure_unique(&self, id: &InstanceId) -> Result<(), SceneError> {
        if self.position_of(id.as_str()).is_some() {
            return Err(SceneError::DuplicateInstanceId(id.clone()));
        }
        Ok(())
    }

    /// True when no two nodes share an instance id.
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        self.nodes.iter().all(|n| seen.insert(n.instance_id()))
    }
}

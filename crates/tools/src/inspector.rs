use stagehand_common::{InstanceId, NodeIndex};
use stagehand_kernel::Scene;
use std::fmt::{self, Write as _};

/// Scene inspector for developer tooling.
///
/// Read-only queries over a scene's resolved hierarchy; run after
/// reconciliation for meaningful parent data.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let nodes = scene.nodes();
        let linked = nodes
            .iter()
            .filter(|n| n.transform().parent().is_some())
            .count();
        let unresolved = nodes
            .iter()
            .filter(|n| n.transform().parent_id().is_some() && n.transform().parent().is_none())
            .count();
        let max_depth = (0..nodes.len())
            .map(|i| scene.depth_of(NodeIndex(i)))
            .max()
            .unwrap_or(0);
        SceneSummary {
            name: scene.name().to_owned(),
            node_count: nodes.len(),
            root_count: nodes.len() - linked,
            linked,
            unresolved,
            max_depth,
        }
    }

    /// Details of the node owning `id`.
    pub fn inspect_node(scene: &Scene, id: &str) -> Option<NodeInfo> {
        let index = scene.position_of(id)?;
        let node = scene.node(index)?;
        let t = node.transform();
        Some(NodeInfo {
            id: node.instance_id().clone(),
            name: node.name.clone(),
            declared_parent: t.parent_id().cloned(),
            resolved_parent: t
                .parent()
                .and_then(|p| scene.node(p))
                .map(|p| p.instance_id().clone()),
            depth: scene.depth_of(index),
            child_count: scene.children_of(index).len(),
            position: t.position.to_array(),
            rotation: t.rotation.to_array(),
            scale: t.scale.to_array(),
            components: node.components.iter().map(|c| c.kind()).collect(),
        })
    }

    /// Indented hierarchy, roots and siblings in node order.
    ///
    /// Nodes that no root reaches (members of a persisted parent cycle) are
    /// listed flat at the end.
    pub fn render_tree(scene: &Scene) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} ({} nodes)", scene.name(), scene.len());

        let mut visited = vec![false; scene.len()];
        let mut stack: Vec<(NodeIndex, usize)> =
            scene.roots().into_iter().rev().map(|r| (r, 0)).collect();
        while let Some((index, depth)) = stack.pop() {
            if std::mem::replace(&mut visited[index.0], true) {
                continue;
            }
            let _ = writeln!(out, "{}- {}", "  ".repeat(depth + 1), label(scene, index));
            for child in scene.children_of(index).into_iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        let unreachable: Vec<usize> = (0..scene.len()).filter(|&i| !visited[i]).collect();
        if !unreachable.is_empty() {
            let _ = writeln!(out, "  (unreachable)");
            for i in unreachable {
                let _ = writeln!(out, "    - {}", label(scene, NodeIndex(i)));
            }
        }
        out
    }
}

fn label(scene: &Scene, index: NodeIndex) -> String {
    match scene.node(index) {
        Some(node) if node.name.is_empty() => node.instance_id().to_string(),
        Some(node) => format!("{} [{}]", node.name, node.instance_id()),
        None => index.to_string(),
    }
}

/// Summary of a scene for the inspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSummary {
    pub name: String,
    pub node_count: usize,
    pub root_count: usize,
    pub linked: usize,
    pub unresolved: usize,
    pub max_depth: usize,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scene: {} nodes={} roots={} linked={} unresolved={} depth={}",
            self.name, self.node_count, self.root_count, self.linked, self.unresolved, self.max_depth
        )
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: InstanceId,
    pub name: String,
    pub declared_parent: Option<InstanceId>,
    pub resolved_parent: Option<InstanceId>,
    pub depth: usize,
    pub child_count: usize,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    pub components: Vec<&'static str>,
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node [{}] parent={} depth={} children={} pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
            self.id,
            self.resolved_parent
                .as_ref()
                .map(InstanceId::as_str)
                .unwrap_or("-"),
            self.depth,
            self.child_count,
            self.position[0],
            self.position[1],
            self.position[2],
            self.scale[0],
            self.scale[1],
            self.scale[2],
        )
    }
}

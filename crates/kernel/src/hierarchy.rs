//! Rebuilding parent links from persisted identifiers.
//!
//! Documents cannot encode in-memory references, so each transform names its
//! parent by `instanceID`. Loading is two-phase: every node is materialized
//! with no links, then [`reconcile`] resolves each `parentID` through an
//! [`IdentifierIndex`] built once per pass.

use crate::scene::Scene;
use stagehand_common::NodeIndex;
use std::collections::HashMap;
use tracing::debug;

/// Map from instance id to node position, borrowed from one scene.
#[derive(Debug)]
pub struct IdentifierIndex<'a> {
    slots: HashMap<&'a str, NodeIndex>,
}

impl<'a> IdentifierIndex<'a> {
    /// Index every node of `scene`. On a repeated id the earliest node wins,
    /// matching [`Scene::find_transform_by_instance_id`].
    pub fn build(scene: &'a Scene) -> Self {
        let mut slots = HashMap::with_capacity(scene.len());
        for (i, node) in scene.nodes().iter().enumerate() {
            slots
                .entry(node.instance_id().as_str())
                .or_insert(NodeIndex(i));
        }
        Self { slots }
    }

    pub fn lookup(&self, id: &str) -> Option<NodeIndex> {
        self.slots.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Nodes whose declared parent was found.
    pub linked: usize,
    /// Nodes left without a resolved parent (sentinel or unresolved).
    pub roots: usize,
    /// Nodes that declared a parent which could not be found.
    pub unresolved: usize,
}

/// Resolve every node's `parentID` into a parent handle.
///
/// The no-parent sentinel clears the link. A parent id that names no node
/// in the scene, or names the node itself, also leaves the link empty; this
/// is expected for partially authored scenes and is not an error.
pub fn reconcile(scene: &mut Scene) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    let resolved: Vec<Option<NodeIndex>> = {
        let index = IdentifierIndex::build(scene);
        scene
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let parent_id = node.transform().parent_id()?;
                let parent = index.lookup(parent_id.as_str()).filter(|p| p.0 != i);
                if parent.is_none() {
                    report.unresolved += 1;
                }
                parent
            })
            .collect()
    };

    for (node, parent) in scene.nodes_mut().zip(resolved) {
        match parent {
            Some(_) => report.linked += 1,
            None => report.roots += 1,
        }
        node.transform_mut().set_parent(parent);
    }

    debug!(
        scene = scene.name(),
        linked = report.linked,
        roots = report.roots,
        unresolved = report.unresolved,
        "hierarchy reconciled"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;
    use stagehand_common::Transform;

    fn node(id: &str, parent: Option<&str>) -> Node {
        let mut t = Transform::with_id(id);
        if let Some(p) = parent {
            t = t.with_parent_id(p);
        }
        Node::with_transform(id, t)
    }

    fn scene_of(nodes: Vec<Node>) -> Scene {
        let mut s = Scene::new("test");
        for n in nodes {
            s.add_node(n).unwrap();
        }
        s
    }

    fn parent_name(scene: &Scene, id: &str) -> Option<String> {
        let index = scene.position_of(id)?;
        let parent = scene.parent_of(index)?;
        Some(scene.node(parent)?.instance_id().to_string())
    }

    fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head.clone());
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn index_lookup() {
        let s = scene_of(vec![node("a", None), node("b", Some("a"))]);
        let index = IdentifierIndex::build(&s);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("b"), Some(NodeIndex(1)));
        assert_eq!(index.lookup("missing"), None);
    }

    #[test]
    fn two_node_example() {
        let mut s = scene_of(vec![node("n1", None), node("n2", Some("n1"))]);
        let report = reconcile(&mut s);
        assert_eq!(parent_name(&s, "n2").as_deref(), Some("n1"));
        assert_eq!(parent_name(&s, "n1"), None);
        assert_eq!(
            report,
            ReconcileReport {
                linked: 1,
                roots: 1,
                unresolved: 0
            }
        );
    }

    #[test]
    fn chain_resolves_in_every_order() {
        let nodes = vec![node("1", None), node("2", Some("1")), node("3", Some("2"))];
        let orders = permutations(&nodes);
        assert_eq!(orders.len(), 6);
        for order in orders {
            let mut s = scene_of(order);
            reconcile(&mut s);
            assert_eq!(parent_name(&s, "1"), None);
            assert_eq!(parent_name(&s, "2").as_deref(), Some("1"));
            assert_eq!(parent_name(&s, "3").as_deref(), Some("2"));
            assert_eq!(s.depth_of(s.position_of("3").unwrap()), 2);
        }
    }

    #[test]
    fn unresolved_parent_is_tolerated() {
        let mut s = scene_of(vec![node("a", Some("ghost")), node("b", Some("a"))]);
        let report = reconcile(&mut s);
        assert_eq!(parent_name(&s, "a"), None);
        assert_eq!(parent_name(&s, "b").as_deref(), Some("a"));
        assert_eq!(report.unresolved, 1);
        assert_eq!(report.roots, 1);
    }

    #[test]
    fn self_parent_is_left_unlinked() {
        let mut s = scene_of(vec![node("a", Some("a"))]);
        let report = reconcile(&mut s);
        assert_eq!(parent_name(&s, "a"), None);
        assert_eq!(report.unresolved, 1);
    }

    #[test]
    fn reconcile_overwrites_stale_links() {
        let mut s = scene_of(vec![node("a", None), node("b", Some("a"))]);
        reconcile(&mut s);
        let b = s.position_of("b").unwrap();
        s.node_mut(b).unwrap().transform_mut().set_parent_id(None);
        reconcile(&mut s);
        assert_eq!(s.parent_of(b), None);
        assert_eq!(s.roots().len(), 2);
    }

    #[test]
    fn children_and_roots() {
        let mut s = scene_of(vec![
            node("root", None),
            node("left", Some("root")),
            node("right", Some("root")),
            node("leaf", Some("left")),
        ]);
        reconcile(&mut s);
        let root = s.position_of("root").unwrap();
        assert_eq!(s.roots(), vec![root]);
        assert_eq!(s.children_of(root), vec![NodeIndex(1), NodeIndex(2)]);
    }

    #[test]
    fn persisted_cycle_has_bounded_depth() {
        let mut s = scene_of(vec![node("a", Some("b")), node("b", Some("a"))]);
        reconcile(&mut s);
        assert!(s.roots().is_empty());
        assert!(s.depth_of(NodeIndex(0)) <= s.len());
    }

    /// Removing chain members in any order never leaves a handle pointing
    /// at the wrong node, and dropping the scene afterwards is clean.
    #[test]
    fn chain_teardown_in_any_order() {
        for order in [["1", "2", "3"], ["3", "2", "1"], ["2", "1", "3"]] {
            let mut s = scene_of(vec![node("1", None), node("2", Some("1")), node("3", Some("2"))]);
            reconcile(&mut s);
            for id in order {
                let (_, removed) = s.remove_node(id).unwrap();
                assert!(removed.transform().parent().is_none());
                reconcile(&mut s);
                for (i, n) in s.nodes().iter().enumerate() {
                    if let Some(p) = n.transform().parent() {
                        assert!(p.0 < s.len());
                        assert_ne!(p.0, i);
                        assert_eq!(
                            Some(s.node(p).unwrap().instance_id()),
                            n.transform().parent_id()
                        );
                    }
                }
            }
            assert!(s.is_empty());
            drop(s);
        }
    }
}

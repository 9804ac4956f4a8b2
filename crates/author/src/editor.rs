use stagehand_common::{InstanceId, NodeIndex, Transform};
use stagehand_kernel::{Node, Scene, SceneError, reconcile};

/// An editing command that can be applied to a scene and reversed.
///
/// Each command carries enough context to undo itself.
#[derive(Debug, Clone)]
pub enum EditCommand {
    /// Insert `node` at `index`, then point every `adopted` node at it.
    /// Undo = despawn it.
    Spawn {
        index: NodeIndex,
        node: Node,
        adopted: Vec<InstanceId>,
    },
    /// Remove `node` from `index`, detaching every `orphaned` child.
    /// Undo = re-spawn it and re-adopt the children.
    Despawn {
        index: NodeIndex,
        node: Node,
        orphaned: Vec<InstanceId>,
    },
    /// Change a node's declared parent. Undo = restore the old parent.
    Reparent {
        id: InstanceId,
        old: Option<InstanceId>,
        new: Option<InstanceId>,
    },
}

impl EditCommand {
    /// Produce the inverse command (for undo).
    pub fn inverse(&self) -> Self {
        match self {
            Self::Spawn {
                index,
                node,
                adopted,
            } => Self::Despawn {
                index: *index,
                node: node.clone(),
                orphaned: adopted.clone(),
            },
            Self::Despawn {
                index,
                node,
                orphaned,
            } => Self::Spawn {
                index: *index,
                node: node.clone(),
                adopted: orphaned.clone(),
            },
            Self::Reparent { id, old, new } => Self::Reparent {
                id: id.clone(),
                old: new.clone(),
                new: old.clone(),
            },
        }
    }
}

/// Errors from edit operations.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("node {0} not found")]
    NodeNotFound(InstanceId),
    #[error("parenting {child} under {parent} would create a cycle")]
    WouldCycle {
        child: InstanceId,
        parent: InstanceId,
    },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Editor with undo/redo support for authoring scene hierarchies.
///
/// Edits change declared parent ids; after every edit the scene is
/// reconciled so resolved links always match the current node sequence.
pub struct Editor {
    undo_stack: Vec<EditCommand>,
    redo_stack: Vec<EditCommand>,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Append a new node, optionally under `parent`, and push to undo stack.
    pub fn spawn(
        &mut self,
        scene: &mut Scene,
        name: &str,
        parent: Option<&str>,
    ) -> Result<InstanceId, EditError> {
        let mut transform = Transform::new();
        if let Some(parent) = parent {
            let parent_id = existing(scene, parent)?;
            transform.set_parent_id(Some(parent_id));
        }
        let node = Node::with_transform(name, transform);
        let id = node.instance_id().clone();
        let index = scene.add_node(node.clone())?;
        reconcile(scene);
        self.push(EditCommand::Spawn {
            index,
            node,
            adopted: Vec::new(),
        });
        Ok(id)
    }

    /// Remove a node and push to undo stack. Its children become roots.
    pub fn despawn(&mut self, scene: &mut Scene, id: &str) -> Result<(), EditError> {
        let id = existing(scene, id)?;
        let orphaned: Vec<InstanceId> = scene
            .nodes()
            .iter()
            .filter(|n| n.transform().parent_id() == Some(&id))
            .map(|n| n.instance_id().clone())
            .collect();
        let (index, node) = scene
            .remove_node(id.as_str())
            .ok_or_else(|| EditError::NodeNotFound(id.clone()))?;
        for child in &orphaned {
            set_parent_id(scene, child, None);
        }
        reconcile(scene);
        self.push(EditCommand::Despawn {
            index,
            node,
            orphaned,
        });
        Ok(())
    }

    /// Move a node under `parent` (or to the root with `None`) and push to
    /// undo stack.
    pub fn reparent(
        &mut self,
        scene: &mut Scene,
        id: &str,
        parent: Option<&str>,
    ) -> Result<(), EditError> {
        let id = existing(scene, id)?;
        let new = match parent {
            Some(p) => {
                let parent_id = existing(scene, p)?;
                if is_descendant_or_self(scene, &parent_id, &id) {
                    return Err(EditError::WouldCycle {
                        child: id,
                        parent: parent_id,
                    });
                }
                Some(parent_id)
            }
            None => None,
        };
        let old = scene
            .find_node(id.as_str())
            .and_then(|n| n.transform().parent_id().cloned());
        set_parent_id(scene, &id, new.clone());
        reconcile(scene);
        self.push(EditCommand::Reparent { id, old, new });
        Ok(())
    }

    /// Undo the last edit. Returns true if an operation was undone.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        let Some(cmd) = self.undo_stack.pop() else {
            return false;
        };
        apply_command(scene, &cmd.inverse());
        self.redo_stack.push(cmd);
        true
    }

    /// Redo the last undone edit. Returns true if an operation was redone.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(cmd) = self.redo_stack.pop() else {
            return false;
        };
        apply_command(scene, &cmd);
        self.undo_stack.push(cmd);
        true
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn push(&mut self, cmd: EditCommand) {
        self.undo_stack.push(cmd);
        self.redo_stack.clear();
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

fn existing(scene: &Scene, id: &str) -> Result<InstanceId, EditError> {
    scene
        .find_node(id)
        .map(|n| n.instance_id().clone())
        .ok_or_else(|| EditError::NodeNotFound(id.into()))
}

fn set_parent_id(scene: &mut Scene, id: &InstanceId, parent: Option<InstanceId>) {
    if let Some(index) = scene.position_of(id.as_str()) {
        if let Some(node) = scene.node_mut(index) {
            node.transform_mut().set_parent_id(parent);
        }
    }
}

/// Whether `candidate` is `ancestor` or sits below it, following declared
/// parent ids.
fn is_descendant_or_self(scene: &Scene, candidate: &InstanceId, ancestor: &InstanceId) -> bool {
    let mut cursor = Some(candidate.clone());
    for _ in 0..=scene.len() {
        let Some(current) = cursor else {
            return false;
        };
        if &current == ancestor {
            return true;
        }
        cursor = scene
            .find_node(current.as_str())
            .and_then(|n| n.transform().parent_id().cloned());
    }
    false
}

fn apply_command(scene: &mut Scene, cmd: &EditCommand) {
    match cmd {
        EditCommand::Spawn {
            index,
            node,
            adopted,
        } => {
            // Undo/redo replays onto the state the command was recorded
            // against, so the id is free.
            match scene.insert_node(index.0, node.clone()) {
                Ok(_) => {
                    for child in adopted {
                        set_parent_id(scene, child, Some(node.instance_id().clone()));
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "spawn replay out of sync with scene");
                    debug_assert!(false, "spawn replay out of sync: {err}");
                }
            }
        }
        EditCommand::Despawn { node, orphaned, .. } => {
            scene.remove_node(node.instance_id().as_str());
            for child in orphaned {
                set_parent_id(scene, child, None);
            }
        }
        EditCommand::Reparent { id, new, .. } => {
            set_parent_id(scene, id, new.clone());
        }
    }
    reconcile(scene);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent_of(scene: &Scene, id: &InstanceId) -> Option<InstanceId> {
        let parent = scene.parent_of(scene.position_of(id.as_str())?)?;
        Some(scene.node(parent)?.instance_id().clone())
    }

    #[test]
    #[should_panic(expected = "spawn replay out of sync")]
    fn redo_onto_diverged_scene_is_reported() {
        let mut scene = Scene::new("edit");
        let mut editor = Editor::new();
        let id = editor.spawn(&mut scene, "a", None).unwrap();
        assert!(editor.undo(&mut scene));

        scene
            .add_node(Node::with_transform("other", Transform::with_id(id)))
            .unwrap();
        editor.redo(&mut scene);
    }

    #[test]
    fn spawn_links_immediately() {
        let mut scene = Scene::new("edit");
        let mut editor = Editor::new();

        let root = editor.spawn(&mut scene, "root", None).unwrap();
        let child = editor.spawn(&mut scene, "child", Some(root.as_str())).unwrap();
        assert_eq!(parent_of(&scene, &child), Some(root.clone()));
        assert_eq!(parent_of(&scene, &root), None);
    }

    #[test]
    fn spawn_and_undo() {
        let mut scene = Scene::new("edit");
        let mut editor = Editor::new();

        let id = editor.spawn(&mut scene, "a", None).unwrap();
        assert_eq!(scene.len(), 1);

        assert!(editor.undo(&mut scene));
        assert!(scene.is_empty());
        assert!(scene.find_node(id.as_str()).is_none());
    }

    #[test]
    fn spawn_undo_redo_keeps_identity() {
        let mut scene = Scene::new("edit");
        let mut editor = Editor::new();

        let id = editor.spawn(&mut scene, "a", None).unwrap();
        editor.undo(&mut scene);
        editor.redo(&mut scene);
        assert_eq!(scene.len(), 1);
        assert!(scene.find_node(id.as_str()).is_some());
    }

    #[test]
    fn spawn_under_missing_parent_is_error() {
        let mut scene = Scene::new("edit");
        let mut editor = Editor::new();
        let err = editor.spawn(&mut scene, "a", Some("ghost")).unwrap_err();
        assert!(matches!(err, EditError::NodeNotFound(ref id) if id.as_str() == "ghost"));
        assert!(!editor.can_undo());
    }

    #[test]
    fn despawn_orphans_children_and_undo_restores() {
        let mut scene = Scene::new("edit");
        let mut editor = Editor::new();
        let root = editor.spawn(&mut scene, "root", None).unwrap();
        let mid = editor.spawn(&mut scene, "mid", Some(root.as_str())).unwrap();
        let leaf = editor.spawn(&mut scene, "leaf", Some(mid.as_str())).unwrap();

        editor.despawn(&mut scene, mid.as_str()).unwrap();
        assert_eq!(scene.len(), 2);
        assert_eq!(parent_of(&scene, &leaf), None);

        editor.undo(&mut scene);
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.position_of(mid.as_str()), Some(NodeIndex(1)));
        assert_eq!(parent_of(&scene, &mid), Some(root.clone()));
        assert_eq!(parent_of(&scene, &leaf), Some(mid.clone()));

        editor.redo(&mut scene);
        assert_eq!(scene.len(), 2);
        assert_eq!(parent_of(&scene, &leaf), None);
    }

    #[test]
    fn reparent_and_undo() {
        let mut scene = Scene::new("edit");
        let mut editor = Editor::new();
        let a = editor.spawn(&mut scene, "a", None).unwrap();
        let b = editor.spawn(&mut scene, "b", None).unwrap();

        editor.reparent(&mut scene, b.as_str(), Some(a.as_str())).unwrap();
        assert_eq!(parent_of(&scene, &b), Some(a.clone()));

        editor.undo(&mut scene);
        assert_eq!(parent_of(&scene, &b), None);
        editor.redo(&mut scene);
        assert_eq!(parent_of(&scene, &b), Some(a));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut scene = Scene::new("edit");
        let mut editor = Editor::new();
        let a = editor.spawn(&mut scene, "a", None).unwrap();
        let b = editor.spawn(&mut scene, "b", Some(a.as_str())).unwrap();

        assert!(matches!(
            editor.reparent(&mut scene, a.as_str(), Some(b.as_str())),
            Err(EditError::WouldCycle { .. })
        ));
        assert!(matches!(
            editor.reparent(&mut scene, a.as_str(), Some(a.as_str())),
            Err(EditError::WouldCycle { .. })
        ));
        assert_eq!(editor.undo_count(), 2);
    }

    #[test]
    fn redo_cleared_on_new_edit() {
        let mut scene = Scene::new("edit");
        let mut editor = Editor::new();

        editor.spawn(&mut scene, "a", None).unwrap();
        editor.undo(&mut scene);
        assert!(editor.can_redo());

        editor.spawn(&mut scene, "b", None).unwrap();
        assert!(!editor.can_redo());
    }

    #[test]
    fn undo_redo_empty_return_false() {
        let mut scene = Scene::new("edit");
        let mut editor = Editor::new();
        assert!(!editor.undo(&mut scene));
        assert!(!editor.redo(&mut scene));
    }

    #[test]
    fn despawn_nonexistent_returns_error() {
        let mut scene = Scene::new("edit");
        let mut editor = Editor::new();
        assert!(editor.despawn(&mut scene, "missing").is_err());
    }
}

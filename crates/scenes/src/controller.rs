//! Scene activation controller.
//!
//! Every load runs as one blocking sequence on the caller's thread:
//!
//! ```text
//! Idle -> ResettingCollaborators -> Deserializing -> Initializing -> Reconciling -> Published -> Idle
//!                     |                   |
//!                     |                   +-> Failed -> Idle
//!                     +-> Initializing (load_object)
//! ```
//!
//! Loads take `&mut self`, so two activations can never overlap.

use crate::bus::{MessageBus, ResetSignal};
use crate::config::SceneManagerConfig;
use crate::console::{Console, TracingConsole};
use stagehand_common::Transform;
use stagehand_kernel::{Node, ReconcileReport, Scene, reconcile};
use stagehand_persist::{RegistryError, SceneSerializer, ScenePathRegistry};
use std::path::Path;
use tracing::{debug, info};

/// Step of the activation sequence the controller is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationPhase {
    Idle,
    ResettingCollaborators,
    Deserializing,
    Initializing,
    Reconciling,
    Published,
    Failed,
}

/// Result of a load request.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The scene is now active.
    Published {
        scene: String,
        report: ReconcileReport,
    },
    /// Nothing is active; a warning was emitted.
    Failed { requested: String, reason: String },
}

impl LoadOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Errors that stop the scene subsystem from starting.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("scene registry unavailable: {0}")]
    Registry(#[from] RegistryError),
}

/// Holder of the single active scene.
///
/// Only the controller's publish and failure steps write to it. The
/// generation counter moves on every write so collaborators can tell a
/// replaced scene from the one they last saw.
#[derive(Debug, Default)]
pub struct SceneSlot {
    scene: Option<Scene>,
    generation: u64,
}

impl SceneSlot {
    pub fn get(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.scene.is_none()
    }

    fn publish(&mut self, scene: Scene) -> Option<Scene> {
        self.generation += 1;
        self.scene.replace(scene)
    }

    fn clear(&mut self) -> Option<Scene> {
        self.generation += 1;
        self.scene.take()
    }
}

type NodeHook = Box<dyn FnMut(&mut Node)>;

/// Loads scenes by name or by value and owns the active one.
pub struct SceneManager<S, B, C = TracingConsole> {
    registry: ScenePathRegistry,
    serializer: S,
    bus: B,
    console: C,
    slot: SceneSlot,
    phase: ActivationPhase,
    init_hook: Option<NodeHook>,
}

impl<S, B, C> SceneManager<S, B, C>
where
    S: SceneSerializer,
    B: MessageBus,
    C: Console,
{
    /// Start the subsystem: load the registry named by `config`.
    ///
    /// A registry document that exists but does not parse is fatal.
    pub fn init(
        config: &SceneManagerConfig,
        serializer: S,
        bus: B,
        console: C,
    ) -> Result<Self, InitError> {
        let registry = ScenePathRegistry::load(config.registry_path())?;
        info!(
            root = %config.project_root.display(),
            scenes = registry.len(),
            "scene manager started"
        );
        Ok(Self::with_registry(registry, serializer, bus, console))
    }

    /// Build around an already loaded registry. The active scene starts as an
    /// empty unnamed scene.
    pub fn with_registry(registry: ScenePathRegistry, serializer: S, bus: B, console: C) -> Self {
        let mut slot = SceneSlot::default();
        slot.publish(Scene::default());
        Self {
            registry,
            serializer,
            bus,
            console,
            slot,
            phase: ActivationPhase::Idle,
            init_hook: None,
        }
    }

    /// Extra per-node setup run during initialization, before parents are
    /// linked.
    pub fn with_init_hook(mut self, hook: impl FnMut(&mut Node) + 'static) -> Self {
        self.init_hook = Some(Box::new(hook));
        self
    }

    /// Load and activate the scene registered under `name`.
    ///
    /// An unknown name resolves to an empty path and fails like any other
    /// unreadable document.
    pub fn load_by_name(&mut self, name: &str) -> LoadOutcome {
        self.reset_collaborators();

        self.enter(ActivationPhase::Deserializing);
        let path = self.registry.get(name);
        debug!(scene = name, path, "resolving scene document");
        match self.serializer.deserialize(Path::new(path)) {
            Ok(scene) => self.activate(scene),
            Err(err) => self.fail(name, err.to_string()),
        }
    }

    /// Load the first registered scene in lexicographic name order.
    pub fn load_default(&mut self) -> LoadOutcome {
        match self.registry.first().map(|(name, _)| name.to_owned()) {
            Some(name) => self.load_by_name(&name),
            None => {
                self.reset_collaborators();
                self.fail("<default>", "no scenes are registered".to_owned())
            }
        }
    }

    /// Activate an already constructed scene, skipping deserialization.
    pub fn load_object(&mut self, scene: Scene) -> LoadOutcome {
        self.reset_collaborators();
        self.activate(scene)
    }

    /// Transform with the given id in the active scene.
    pub fn find_transform_by_instance_id(&self, id: &str) -> Option<&Transform> {
        self.slot.get()?.find_transform_by_instance_id(id)
    }

    /// Register (or re-point) a scene name and persist the registry.
    pub fn register_scene_path(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.registry.add(name, path)
    }

    pub fn active(&self) -> Option<&Scene> {
        self.slot.get()
    }

    pub fn slot(&self) -> &SceneSlot {
        &self.slot
    }

    pub fn phase(&self) -> ActivationPhase {
        self.phase
    }

    pub fn registry(&self) -> &ScenePathRegistry {
        &self.registry
    }

    pub fn serializer(&self) -> &S {
        &self.serializer
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Tear down the subsystem, handing back the last active scene.
    pub fn shutdown(mut self) -> Option<Scene> {
        info!("scene manager shutting down");
        self.slot.clear()
    }

    fn reset_collaborators(&mut self) {
        self.enter(ActivationPhase::ResettingCollaborators);
        let signal = ResetSignal {
            outgoing: self.slot.get().map(|s| s.name().to_owned()),
        };
        self.bus.broadcast(&signal);
    }

    fn activate(&mut self, mut scene: Scene) -> LoadOutcome {
        self.enter(ActivationPhase::Initializing);
        match self.init_hook.as_mut() {
            Some(hook) => scene.init_with(|node| hook(node)),
            None => scene.init(),
        }

        self.enter(ActivationPhase::Reconciling);
        let report = reconcile(&mut scene);

        self.enter(ActivationPhase::Published);
        let name = scene.name().to_owned();
        info!(scene = %name, nodes = scene.len(), "scene published");
        drop(self.slot.publish(scene));

        self.enter(ActivationPhase::Idle);
        LoadOutcome::Published {
            scene: name,
            report,
        }
    }

    fn fail(&mut self, requested: &str, reason: String) -> LoadOutcome {
        self.enter(ActivationPhase::Failed);
        self.console.warn(&format!("Couldn't load scene {requested}: {reason}"));
        drop(self.slot.clear());

        self.enter(ActivationPhase::Idle);
        LoadOutcome::Failed {
            requested: requested.to_owned(),
            reason,
        }
    }

    fn enter(&mut self, phase: ActivationPhase) {
        debug!(from = ?self.phase, to = ?phase, "activation phase");
        self.phase = phase;
    }
}

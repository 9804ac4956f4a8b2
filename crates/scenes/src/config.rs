use stagehand_persist::REGISTRY_FILE;
use std::path::PathBuf;

/// Where the scene subsystem finds its project data.
#[derive(Debug, Clone)]
pub struct SceneManagerConfig {
    /// Directory holding the registry document; relative scene paths resolve
    /// against it.
    pub project_root: PathBuf,
    /// Registry document name inside `project_root`.
    pub registry_file: String,
}

impl Default for SceneManagerConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            registry_file: REGISTRY_FILE.to_owned(),
        }
    }
}

impl SceneManagerConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Default::default()
        }
    }

    pub fn registry_path(&self) -> PathBuf {
        self.project_root.join(&self.registry_file)
    }
}

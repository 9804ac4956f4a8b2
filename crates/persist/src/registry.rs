//! Scene name to document path mapping.
//!
//! Stored as one flat JSON object:
//! ```text
//! { "Level1": "scenes/level1.scene", "Menu": "scenes/menu.scene" }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the registry document inside a project root.
pub const REGISTRY_FILE: &str = "Scenes.ProjectSettings";

/// Errors from registry persistence.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("registry {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent map from scene name to scene document path.
///
/// Iteration is lexicographic by scene name; [`ScenePathRegistry::first`]
/// is the scene loaded when no name is given.
#[derive(Debug, Clone)]
pub struct ScenePathRegistry {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ScenePathRegistry {
    /// Open the registry document at `path`, creating an empty one if it does
    /// not exist. A blank document is an empty registry; anything else that is
    /// not a JSON object of strings is [`RegistryError::Corrupt`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            let registry = Self {
                path,
                entries: BTreeMap::new(),
            };
            registry.save()?;
            info!(path = %registry.path.display(), "created empty scene registry");
            return Ok(registry);
        }

        let text = std::fs::read_to_string(&path)?;
        let entries = if text.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&text).map_err(|source| RegistryError::Corrupt {
                path: path.clone(),
                source,
            })?
        };

        let registry = Self { path, entries };
        debug!(
            path = %registry.path.display(),
            scenes = registry.len(),
            "scene registry loaded"
        );
        Ok(registry)
    }

    /// Registered path for `name`, or the empty string when unknown.
    pub fn get(&self, name: &str) -> &str {
        self.entries.get(name).map(String::as_str).unwrap_or("")
    }

    /// Insert or overwrite a mapping, then rewrite the whole document.
    ///
    /// The in-memory entry is kept even when the write fails.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        scene_path: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let scene_path = scene_path.into();
        info!(scene = %name, path = %scene_path, "registering scene path");
        self.entries.insert(name, scene_path);
        self.save()
    }

    /// Write the full mapping to the backing document.
    pub fn save(&self) -> Result<(), RegistryError> {
        let file = std::fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(file, &self.entries)?;
        Ok(())
    }

    /// The lexicographically first registered scene.
    pub fn first(&self) -> Option<(&str, &str)> {
        self.entries
            .iter()
            .next()
            .map(|(name, path)| (name.as_str(), path.as_str()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered scene names in iteration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

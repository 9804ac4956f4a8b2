//! Scene documents on disk.

use stagehand_kernel::Scene;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors from reading or writing a scene document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("no document path given")]
    EmptyPath,
    #[error("scene document {} not found", .0.display())]
    NotFound(PathBuf),
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed scene document {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Converts scenes to and from their persisted documents.
pub trait SceneSerializer {
    /// Produce a scene from the document at `path`. Ownership of the scene
    /// passes to the caller.
    fn deserialize(&self, path: &Path) -> Result<Scene, DocumentError>;

    /// Write `scene` to the document at `path`, replacing it.
    fn serialize(&self, path: &Path, scene: &Scene) -> Result<(), DocumentError>;
}

/// JSON scene documents, with relative paths resolved against a project root.
#[derive(Debug, Clone)]
pub struct JsonSceneSerializer {
    root: PathBuf,
}

impl JsonSceneSerializer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute paths are kept; relative ones are joined onto the root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl SceneSerializer for JsonSceneSerializer {
    fn deserialize(&self, path: &Path) -> Result<Scene, DocumentError> {
        if path.as_os_str().is_empty() {
            return Err(DocumentError::EmptyPath);
        }
        let full = self.resolve(path);
        let text = std::fs::read_to_string(&full).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                DocumentError::NotFound(full.clone())
            } else {
                DocumentError::Io {
                    path: full.clone(),
                    source,
                }
            }
        })?;
        let scene: Scene = serde_json::from_str(&text).map_err(|source| {
            DocumentError::Malformed {
                path: full.clone(),
                source,
            }
        })?;
        debug!(path = %full.display(), nodes = scene.len(), "scene document read");
        Ok(scene)
    }

    fn serialize(&self, path: &Path, scene: &Scene) -> Result<(), DocumentError> {
        if path.as_os_str().is_empty() {
            return Err(DocumentError::EmptyPath);
        }
        let full = self.resolve(path);
        let io_err = |source: std::io::Error| DocumentError::Io {
            path: full.clone(),
            source,
        };
        if let Some(dir) = full.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let file = std::fs::File::create(&full).map_err(io_err)?;
        serde_json::to_writer_pretty(file, scene).map_err(|source| DocumentError::Malformed {
            path: full.clone(),
            source,
        })?;
        debug!(path = %full.display(), nodes = scene.len(), "scene document written");
        Ok(())
    }
}

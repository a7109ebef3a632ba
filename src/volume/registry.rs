//! Volume registry
//!
//! Built once from configuration and shared read-only for the lifetime of
//! the process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::ServerConfig;
use crate::error::ExplorerError;

/// A named storage area backed by one root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    id: String,
    root: PathBuf,
}

impl Volume {
    pub fn new(id: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            root: root.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the root directory is currently present on the host
    pub fn is_mounted(&self) -> bool {
        self.root.is_dir()
    }
}

/// Registry for looking up volumes by id
#[derive(Debug, Default)]
pub struct VolumeRegistry {
    volumes: BTreeMap<String, Volume>,
}

impl VolumeRegistry {
    pub fn new(volumes: impl IntoIterator<Item = Volume>) -> Self {
        Self {
            volumes: volumes
                .into_iter()
                .map(|volume| (volume.id.clone(), volume))
                .collect(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config
                .volumes
                .iter()
                .map(|(id, root)| Volume::new(id.clone(), root.clone())),
        )
    }

    /// Looks up a volume. Unknown ids are rejected before any disk access.
    pub fn resolve_volume(&self, id: &str) -> Result<&Volume, ExplorerError> {
        self.volumes
            .get(id)
            .ok_or_else(|| ExplorerError::InvalidVolume(id.to_string()))
    }

    /// Volumes in id order
    pub fn iter(&self) -> impl Iterator<Item = &Volume> {
        self.volumes.values()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.volumes.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> VolumeRegistry {
        VolumeRegistry::new([
            Volume::new("storage_2", "/mnt/storage_2"),
            Volume::new("storage_1", "/mnt/storage_1"),
        ])
    }

    #[test]
    fn test_resolve_known_volume() {
        let registry = registry();
        let volume = registry.resolve_volume("storage_1").unwrap();
        assert_eq!(volume.root(), Path::new("/mnt/storage_1"));
    }

    #[test]
    fn test_unknown_volume_is_invalid() {
        let err = registry().resolve_volume("../storage_1").unwrap_err();
        assert_eq!(err.kind(), "InvalidVolume");
    }

    #[test]
    fn test_ids_are_sorted() {
        assert_eq!(registry().ids(), vec!["storage_1", "storage_2"]);
    }

    #[test]
    fn test_from_config() {
        let mut config = ServerConfig::default();
        config.volumes.insert("docs".into(), "/srv/docs".into());
        let registry = VolumeRegistry::from_config(&config);
        assert_eq!(registry.len(), 1);
        assert!(registry.resolve_volume("docs").is_ok());
    }
}

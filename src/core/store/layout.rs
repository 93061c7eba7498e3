// ─── Game Layout ───
// Fixed on-disk layout every component resolves paths against.

use std::path::{Path, PathBuf};

use crate::core::error::{LauncherError, LauncherResult};

pub const LOADER_ENTRY_FILE: &str = "loader_entry.txt";
pub const LOADER_PROFILE_FILE: &str = "loader_profile.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLayout {
    root: PathBuf,
}

impl GameLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn version_dir(&self, id: &str) -> PathBuf {
        self.versions_dir().join(id)
    }

    pub fn descriptor_path(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{}.json", id))
    }

    pub fn client_jar(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{}.jar", id))
    }

    pub fn loader_entry_marker(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(LOADER_ENTRY_FILE)
    }

    pub fn loader_profile(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(LOADER_PROFILE_FILE)
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    /// `relative` uses forward slashes, as published in descriptors.
    pub fn library_path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.libraries_dir(), |path, segment| path.join(segment))
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn asset_index(&self, index_id: &str) -> PathBuf {
        self.assets_dir()
            .join("indexes")
            .join(format!("{}.json", index_id))
    }

    /// Content-addressed location: a pure function of the hash.
    pub fn asset_object(&self, hash: &str) -> PathBuf {
        let prefix = hash.get(..2).unwrap_or(hash);
        self.assets_dir().join("objects").join(prefix).join(hash)
    }

    pub fn natives_dir(&self, id: &str) -> PathBuf {
        self.root.join("natives").join(id)
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.root.join("mods")
    }

    /// Create the fixed top-level directories.
    pub fn prepare(&self) -> LauncherResult<()> {
        let dirs = [
            self.versions_dir(),
            self.libraries_dir(),
            self.assets_dir().join("indexes"),
            self.assets_dir().join("objects"),
            self.root.join("natives"),
            self.mods_dir(),
            self.root.join("logs"),
        ];
        for dir in dirs {
            std::fs::create_dir_all(&dir).map_err(|e| LauncherError::io(&dir, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_paths() {
        let layout = GameLayout::new("/games/mc");
        assert_eq!(
            layout.descriptor_path("1.20.1"),
            PathBuf::from("/games/mc/versions/1.20.1/1.20.1.json")
        );
        assert_eq!(
            layout.client_jar("1.20.1"),
            PathBuf::from("/games/mc/versions/1.20.1/1.20.1.jar")
        );
        assert_eq!(
            layout.loader_entry_marker("1.20.1"),
            PathBuf::from("/games/mc/versions/1.20.1/loader_entry.txt")
        );
        assert_eq!(
            layout.natives_dir("1.20.1"),
            PathBuf::from("/games/mc/natives/1.20.1")
        );
    }

    #[test]
    fn asset_object_path_is_derived_from_hash() {
        let layout = GameLayout::new("/games/mc");
        let hash = "bdf48ef6b5d0d23bbb02e17d04865216179f510a";
        assert_eq!(
            layout.asset_object(hash),
            PathBuf::from("/games/mc/assets/objects/bd").join(hash)
        );
        assert_eq!(layout.asset_object(hash), layout.asset_object(hash));
    }

    #[test]
    fn library_path_follows_descriptor_segments() {
        let layout = GameLayout::new("/games/mc");
        assert_eq!(
            layout.library_path("com/mojang/brigadier/1.1.8/brigadier-1.1.8.jar"),
            PathBuf::from("/games/mc/libraries/com/mojang/brigadier/1.1.8/brigadier-1.1.8.jar")
        );
    }

    #[test]
    fn prepare_creates_fixed_directories() {
        let temp = tempfile::tempdir().unwrap();
        let layout = GameLayout::new(temp.path());
        layout.prepare().unwrap();

        assert!(temp.path().join("versions").is_dir());
        assert!(temp.path().join("assets/indexes").is_dir());
        assert!(temp.path().join("assets/objects").is_dir());
        assert!(temp.path().join("natives").is_dir());
    }
}

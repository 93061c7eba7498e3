// ─── Configuration ───
// Options consumed by the core, plus the remote endpoints. Both are passed
// explicitly into every component instead of living in process globals.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};

pub const DEFAULT_USERNAME: &str = "Player";
pub const DEFAULT_RAM_MB: u32 = 2048;
pub const MIN_RAM_MB: u32 = 512;

const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";
const RESOURCES_URL: &str = "https://resources.download.minecraft.net/";
const FABRIC_META_URL: &str = "https://meta.fabricmc.net/v2";
pub const FABRIC_MAVEN: &str = "https://maven.fabricmc.net/";
pub const FABRIC_INSTALL_HINT: &str = "https://fabricmc.net/use/installer/";
pub const OPTIMIZED_MODPACK_URL: &str = "https://modrinth.com/modpack/fabulously-optimized";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LauncherConfig {
    /// Explicit interpreter; `None` means the platform default.
    pub java_path: Option<PathBuf>,
    pub ram_megabytes: u32,
    pub username: String,
    pub loader_enabled: bool,
    /// Point the user at the Fabulously Optimized pack; needs the loader.
    pub optimized_modpack: bool,
    pub show_snapshots: bool,
    pub fullscreen: bool,
    pub game_directory: PathBuf,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            java_path: None,
            ram_megabytes: DEFAULT_RAM_MB,
            username: DEFAULT_USERNAME.into(),
            loader_enabled: false,
            optimized_modpack: false,
            show_snapshots: false,
            fullscreen: false,
            game_directory: default_game_dir(),
        }
    }
}

impl LauncherConfig {
    /// Load from a JSON file. Missing keys fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> LauncherResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| LauncherError::io(path, e))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> LauncherResult<Self> {
        let config: LauncherConfig = serde_json::from_str(raw)?;
        Ok(config.sanitized())
    }

    /// Normalize user-supplied values so the composer never sees an empty
    /// identity or an unusable heap size.
    pub fn sanitized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        if self.username.is_empty() {
            self.username = DEFAULT_USERNAME.into();
        }
        if self.ram_megabytes < MIN_RAM_MB {
            warn!(
                "Heap of {} MB is below the minimum, using {} MB",
                self.ram_megabytes, MIN_RAM_MB
            );
            self.ram_megabytes = MIN_RAM_MB;
        }
        if let Some(java) = &self.java_path {
            if java.as_os_str().is_empty() {
                self.java_path = None;
            }
        }
        self
    }
}

/// Remote services consumed by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub version_manifest: String,
    /// Asset CDN base; objects live at `<base><hash[0:2]>/<hash>`.
    pub resources: String,
    pub loader_meta: String,
    pub loader_maven: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            version_manifest: VERSION_MANIFEST_URL.into(),
            resources: RESOURCES_URL.into(),
            loader_meta: FABRIC_META_URL.into(),
            loader_maven: FABRIC_MAVEN.into(),
        }
    }
}

impl Endpoints {
    pub fn asset_object_url(&self, hash: &str) -> String {
        let base = self.resources.trim_end_matches('/');
        let prefix = hash.get(..2).unwrap_or(hash);
        format!("{}/{}/{}", base, prefix, hash)
    }

    pub fn loader_builds_url(&self, game_version: &str) -> String {
        format!(
            "{}/versions/loader/{}",
            self.loader_meta.trim_end_matches('/'),
            game_version
        )
    }

    pub fn loader_profile_url(&self, game_version: &str, loader_version: &str) -> String {
        format!(
            "{}/versions/loader/{}/{}/profile/json",
            self.loader_meta.trim_end_matches('/'),
            game_version,
            loader_version
        )
    }
}

/// Platform-conventional game directory.
pub fn default_game_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("minecraft")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    }
}

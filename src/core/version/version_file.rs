// ─── Version File ───
// Typed version descriptor and OS rule evaluation for its libraries.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::platform::Platform;

pub const FALLBACK_MAIN_CLASS: &str = "net.minecraft.client.main.Main";
pub const LEGACY_ASSET_INDEX: &str = "legacy";

/// A fully parsed version descriptor (`versions/<id>/<id>.json`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDetail {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub downloads: Option<VersionDownloads>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexRef>,
    /// Pre-1.7 descriptors only name the asset set.
    #[serde(default)]
    pub assets: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VersionDownloads {
    #[serde(default)]
    pub client: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadArtifact {
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexRef {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

// ─── Library Entry with Rules ───

#[derive(Debug, Deserialize)]
pub struct LibraryEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<LibraryRule>>,
    #[serde(default)]
    pub natives: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibDownloadArtifact>,
    #[serde(default)]
    pub classifiers: Option<BTreeMap<String, LibDownloadArtifact>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibDownloadArtifact {
    pub path: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct LibraryRule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
}

/// One downloadable library file, flattened out of a [`LibraryEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryArtifact {
    /// Forward-slash path below `libraries/`.
    pub relative_path: String,
    pub download_url: String,
    /// Set for native bundles only.
    pub platform_classifier: Option<String>,
}

impl LibraryEntry {
    /// Rules logic:
    /// - No rules → allowed.
    /// - Otherwise start disallowed; each rule whose OS matches (or that has
    ///   no OS) sets the state. The last matching rule wins.
    pub fn is_allowed_for(&self, platform: Platform) -> bool {
        let rules = match &self.rules {
            Some(r) => r,
            None => return true,
        };

        let mut allowed = false;
        for rule in rules {
            let os_matches = match rule.os.as_ref().and_then(|os| os.name.as_deref()) {
                None => true,
                Some(name) => name == platform.os_rule_name(),
            };

            if os_matches {
                allowed = rule.action == RuleAction::Allow;
            }
        }

        allowed
    }

    /// The classifier key of this library's native bundle for `platform`.
    /// Legacy descriptors name it in the `natives` map; otherwise the fixed
    /// per-platform key is used.
    pub fn native_classifier_for(&self, platform: Platform) -> String {
        self.natives
            .as_ref()
            .and_then(|natives| natives.get(platform.os_rule_name()))
            .map(|key| {
                let arch = if cfg!(target_pointer_width = "64") {
                    "64"
                } else {
                    "32"
                };
                key.replace("${arch}", arch)
            })
            .unwrap_or_else(|| platform.native_classifier().to_string())
    }
}

impl VersionDetail {
    pub fn parse(raw: &str) -> LauncherResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Mandatory whenever the client jar is not cached yet.
    pub fn client_url(&self) -> LauncherResult<String> {
        self.downloads
            .as_ref()
            .and_then(|d| d.client.as_ref())
            .map(|client| client.url.clone())
            .filter(|url| !url.is_empty())
            .ok_or(LauncherError::MissingDescriptorField("downloads.client.url"))
    }

    pub fn declared_main_class(&self) -> Option<&str> {
        self.main_class.as_deref().filter(|m| !m.trim().is_empty())
    }

    pub fn asset_index_id(&self) -> String {
        self.asset_index
            .as_ref()
            .map(|ai| ai.id.clone())
            .or_else(|| self.assets.clone())
            .unwrap_or_else(|| LEGACY_ASSET_INDEX.to_string())
    }

    /// Every rule-allowed `downloads.artifact`, in descriptor order.
    pub fn plain_libraries(&self, platform: Platform) -> Vec<LibraryArtifact> {
        self.libraries
            .iter()
            .filter(|lib| lib.is_allowed_for(platform))
            .filter_map(|lib| lib.downloads.as_ref()?.artifact.as_ref())
            .map(|artifact| LibraryArtifact {
                relative_path: artifact.path.clone(),
                download_url: artifact.url.clone(),
                platform_classifier: None,
            })
            .collect()
    }

    /// Classifier artifacts matching the platform key, in descriptor order.
    pub fn native_bundles(&self, platform: Platform) -> Vec<LibraryArtifact> {
        self.libraries
            .iter()
            .filter(|lib| lib.is_allowed_for(platform))
            .filter_map(|lib| {
                let classifiers = lib.downloads.as_ref()?.classifiers.as_ref()?;
                let key = lib.native_classifier_for(platform);
                let artifact = classifiers.get(&key)?;
                Some(LibraryArtifact {
                    relative_path: artifact.path.clone(),
                    download_url: artifact.url.clone(),
                    platform_classifier: Some(key),
                })
            })
            .collect()
    }
}

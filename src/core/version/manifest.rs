// ─── Version Manifest ───
// Remote version list and the records the catalog keeps.

use serde::Deserialize;

/// Top-level version manifest.
#[derive(Debug, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionEntry>,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    pub url: String,
    #[serde(default)]
    pub release_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKind {
    Release,
    /// Every non-release manifest type (snapshot, old_beta, old_alpha).
    Snapshot,
    /// Found on disk during an offline refresh.
    Local,
}

impl VersionKind {
    pub fn from_manifest_type(raw: &str) -> Self {
        if raw == "release" {
            VersionKind::Release
        } else {
            VersionKind::Snapshot
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VersionKind::Release => "release",
            VersionKind::Snapshot => "snapshot",
            VersionKind::Local => "local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub id: String,
    pub kind: VersionKind,
    /// `None` for local records; their descriptor is already on disk.
    pub descriptor_url: Option<String>,
}

impl VersionRecord {
    pub fn local(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: VersionKind::Local,
            descriptor_url: None,
        }
    }

    pub fn is_visible(&self, include_snapshots: bool) -> bool {
        include_snapshots || self.kind != VersionKind::Snapshot
    }
}

impl From<VersionEntry> for VersionRecord {
    fn from(entry: VersionEntry) -> Self {
        Self {
            kind: VersionKind::from_manifest_type(&entry.version_type),
            id: entry.id,
            descriptor_url: Some(entry.url),
        }
    }
}

impl VersionManifest {
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn into_records(self) -> Vec<VersionRecord> {
        self.versions.into_iter().map(VersionRecord::from).collect()
    }
}

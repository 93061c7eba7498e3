pub mod catalog;
pub mod manifest;
pub mod version_file;

pub use catalog::{CatalogSource, RefreshOutcome, VersionCatalog};
pub use manifest::{VersionKind, VersionRecord};
pub use version_file::{LibraryArtifact, VersionDetail, FALLBACK_MAIN_CLASS};

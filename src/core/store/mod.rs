mod artifact_store;
mod layout;

pub use artifact_store::{ArtifactKind, ArtifactStore, Ensured};
pub use layout::{GameLayout, LOADER_ENTRY_FILE, LOADER_PROFILE_FILE};

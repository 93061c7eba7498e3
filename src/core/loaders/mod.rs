pub mod fabric;

pub use fabric::{read_entry_point, FabricInstaller, FabricProfile, LoaderOutcome};

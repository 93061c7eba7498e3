pub mod classpath;
pub mod natives;
pub mod pipeline;
pub mod plan;
pub mod process;

pub use classpath::{Classpath, DependencyResolver, LibraryReport};
pub use natives::{NativeExtractor, NativeReport};
pub use pipeline::{AttemptReport, LaunchPipeline, PreparedLaunch};
pub use plan::{LaunchComposer, LaunchInputs, LaunchPlan};
pub use process::ProcessSupervisor;

// ─── Bootstrap Core ───
// Resolves, caches and launches a game version against a local game
// directory.
//
// Architecture:
//   core/
//     version/   : Manifest catalog + typed descriptor + OS rules
//     downloader/: Single-resource fetcher behind the `Fetcher` seam
//     store/     : On-disk layout + download-if-absent
//     assets/    : Asset index + content-addressed objects
//     maven/     : Coordinate parsing for loader libraries
//     loaders/   : Fabric installation
//     launch/    : Classpath, natives, plan, process, pipeline
//     java/      : Interpreter location and version probing
//     auth/      : Offline identity
//     state/     : Attempt state machine + launcher state

pub mod assets;
pub mod auth;
pub mod config;
pub mod downloader;
pub mod error;
pub mod events;
pub mod http;
pub mod java;
pub mod launch;
pub mod loaders;
pub mod maven;
pub mod platform;
pub mod state;
pub mod store;
pub mod version;

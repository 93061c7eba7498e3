mod client;
#[cfg(test)]
pub(crate) mod testing;

pub use client::{part_path, Downloader, FetchMode, Fetcher, ProgressFn};

mod asset_index;

pub use asset_index::{is_valid_hash, AssetIndex, AssetReport, AssetSynchronizer};

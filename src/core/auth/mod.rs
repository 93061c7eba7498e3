use md5::{Digest, Md5};
use serde::Serialize;
use uuid::Builder;

pub const OFFLINE_ACCESS_TOKEN: &str = "0";
pub const OFFLINE_USER_TYPE: &str = "legacy";

/// The identity handed to the game in offline mode. Nothing is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfflineIdentity {
    pub username: String,
    /// 32 lowercase hex characters, no separators.
    pub uuid: String,
    pub access_token: String,
    pub user_type: String,
}

impl OfflineIdentity {
    /// Name-based UUID over `"OfflinePlayer:" + username`, the form servers in
    /// offline mode derive for the same name.
    pub fn derive(username: &str) -> Self {
        Self {
            username: username.to_string(),
            uuid: offline_uuid(username),
            access_token: OFFLINE_ACCESS_TOKEN.into(),
            user_type: OFFLINE_USER_TYPE.into(),
        }
    }
}

pub fn offline_uuid(username: &str) -> String {
    let digest = Md5::digest(format!("OfflinePlayer:{}", username).as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    Builder::from_md5_bytes(bytes)
        .into_uuid()
        .simple()
        .to_string()
}

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;

pub const APP_NAME: &str = "CTBootstrap";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared client builder. The connect timeout is per client, so callers that
/// need different connect budgets build separate clients.
pub fn build_http_client(connect_timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

    Client::builder()
        .user_agent(format!("{APP_NAME}/{APP_VERSION}"))
        .default_headers(default_headers)
        .connect_timeout(connect_timeout)
        .build()
}

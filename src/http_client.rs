use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;

const DOWNLOAD_TIMEOUT_SECS: u64 = 180;
const PROXY_TIMEOUT_SECS: u64 = 30;

pub const PROXY_USER_AGENT: &str = "Mozilla/5.0";

static DOWNLOAD_CLIENT: OnceCell<reqwest::blocking::Client> = OnceCell::new();
static PROXY_CLIENT: OnceCell<reqwest::Client> = OnceCell::new();

/// Blocking client for season file downloads.
pub fn download_client() -> Result<&'static reqwest::blocking::Client> {
    DOWNLOAD_CLIENT.get_or_try_init(|| {
        reqwest::blocking::Client::builder()
            .user_agent(concat!("nfl_probability/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()
            .context("failed to build download client")
    })
}

/// Async client shared by every request the forwarder relays.
pub fn proxy_client() -> Result<&'static reqwest::Client> {
    PROXY_CLIENT.get_or_try_init(|| {
        reqwest::Client::builder()
            .user_agent(PROXY_USER_AGENT)
            .timeout(Duration::from_secs(PROXY_TIMEOUT_SECS))
            .build()
            .context("failed to build proxy client")
    })
}

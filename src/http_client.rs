use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; pl_predictor/0.1)";

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The timeout only applies to the first call, which
/// builds the client.
pub fn http_client(timeout: Duration) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build http client")
    })
}

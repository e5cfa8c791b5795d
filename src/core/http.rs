use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;

use crate::core::state::HttpSettings;

const APP_USER_AGENT: &str = concat!("mod-deploy/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client used by every hosting API component.
///
/// Unlike a bare `Client::new()`, this always sets a connect timeout and a
/// total request timeout so an unresponsive host cannot block a deploy forever.
pub fn build_http_client(settings: &HttpSettings) -> Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .user_agent(APP_USER_AGENT)
        .default_headers(default_headers)
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .timeout(Duration::from_secs(settings.timeout_secs))
        .danger_accept_invalid_certs(!settings.enable_ssl)
        .build()
}

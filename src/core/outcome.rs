// ─── API Outcome ───
// Result shape shared by both hosting clients. HTTP failures and undecodable
// bodies are values, not errors: callers must branch on the variant.

use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::core::error::{DeployError, DeployResult};

/// What a hosting API call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    /// 2xx response whose body decoded into `T`.
    Parsed(T),
    /// Non-2xx response. `body` is the server's raw text.
    HttpError {
        url: String,
        status: u16,
        body: String,
    },
    /// 2xx response whose body could not be decoded.
    Undecodable {
        url: String,
        status: u16,
        body: String,
    },
}

impl<T> ApiOutcome<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            ApiOutcome::Parsed(value) => Some(value),
            _ => None,
        }
    }

    /// Raw server body for the failure variants.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            ApiOutcome::Parsed(_) => None,
            ApiOutcome::HttpError { body, .. } | ApiOutcome::Undecodable { body, .. } => {
                Some(body)
            }
        }
    }

    /// Collapse the failure variants into [`DeployError::Api`].
    pub fn into_result(self) -> DeployResult<T> {
        match self {
            ApiOutcome::Parsed(value) => Ok(value),
            ApiOutcome::HttpError { url, status, body }
            | ApiOutcome::Undecodable { url, status, body } => {
                Err(DeployError::Api { url, status, body })
            }
        }
    }
}

impl<T: DeserializeOwned> ApiOutcome<T> {
    /// Classify a response and decode its JSON body.
    ///
    /// Transport errors while reading the body still propagate as `Err`.
    pub(crate) async fn from_json(resp: Response) -> DeployResult<Self> {
        let (url, status, body) = read_body(resp).await?;
        if !(200..300).contains(&status) {
            return Ok(http_error(url, status, body));
        }

        match serde_json::from_str::<T>(&body) {
            Ok(value) => Ok(ApiOutcome::Parsed(value)),
            Err(err) => {
                error!("Could not decode response: {}", err);
                error!("{} returned {}", url, body);
                Ok(ApiOutcome::Undecodable { url, status, body })
            }
        }
    }
}

impl ApiOutcome<String> {
    /// Classify a response, keeping a successful body as plain text.
    pub(crate) async fn from_text(resp: Response) -> DeployResult<Self> {
        let (url, status, body) = read_body(resp).await?;
        if !(200..300).contains(&status) {
            return Ok(http_error(url, status, body));
        }
        tracing::info!("{} returned {}", url, body);
        Ok(ApiOutcome::Parsed(body))
    }
}

async fn read_body(resp: Response) -> DeployResult<(String, u16, String)> {
    let url = resp.url().to_string();
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    Ok((url, status, body))
}

fn http_error<T>(url: String, status: u16, body: String) -> ApiOutcome<T> {
    error!("HTTP ERROR: {} for url {}", status, url);
    error!("{} returned {}", url, body);
    ApiOutcome::HttpError { url, status, body }
}

//! Blocking HTTP client for the forecast backend

use forecast_controls::requests::HttpMethod;
use forecast_controls::ResourceKind;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{kind} returned status {status}")]
    Status { kind: ResourceKind, status: u16 },
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Client for one backend base URL
#[derive(Debug, Clone)]
pub struct Backend {
    client: Client,
    base_url: String,
}

impl Backend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        log::info!("Backend at {} (timeout {:?})", base_url, timeout);
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, kind: ResourceKind) -> String {
        format!("{}{}", self.base_url, kind.path())
    }

    fn request(&self, kind: ResourceKind, body: Option<&Value>) -> RequestBuilder {
        let url = self.url(kind);
        let builder = match kind.method() {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        match body {
            Some(body) => builder.json(body),
            None => builder,
        }
    }

    /// Send a request and decode the JSON answer
    ///
    /// Returns `None` when there is nothing to resume. Bodies that are not
    /// JSON come back as a string value, empty bodies as `null`.
    pub fn call(&self, kind: ResourceKind, body: Option<&Value>) -> Result<Option<Value>> {
        log::debug!("{:?} {}", kind.method(), self.url(kind));
        let response = self.request(kind, body).send()?;
        let status = response.status();
        if kind == ResourceKind::ResumeSession && status == StatusCode::NOT_FOUND {
            log::info!("No previous session to resume");
            return Ok(None);
        }
        if !status.is_success() {
            log::error!("{} failed with status {}", kind, status);
            return Err(BackendError::Status {
                kind,
                status: status.as_u16(),
            });
        }
        let text = response.text()?;
        Ok(Some(decode_body(text)))
    }

    /// Fetch a forecast file as raw bytes
    pub fn download(&self, body: &Value) -> Result<Vec<u8>> {
        let kind = ResourceKind::Download;
        let response = self.request(kind, Some(body)).send()?;
        let status = response.status();
        if !status.is_success() {
            log::error!("{} failed with status {}", kind, status);
            return Err(BackendError::Status {
                kind,
                status: status.as_u16(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}

fn decode_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => Value::String(text),
    }
}

//src/api.rs
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config;

pub const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network request failed: {0}")]
    Network(String),
    #[error("Server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Session expired: access token rejected and refresh failed")]
    SessionExpired,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON. A malformed body collapses to an empty
    /// object; callers branch on `ok()` rather than on parse success.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::Object(Default::default()))
    }

    /// The server's `error` field when present.
    pub fn error_message(&self) -> String {
        self.json()
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string()
    }
}

/// The transport seam: everything above it (token handling, the one-shot
/// refresh-and-retry) is plain logic that tests drive with a scripted fake.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// Real transport over HTTP. The cookie store carries the long-lived refresh
/// credential between calls, mirroring same-origin cookie transmission.
/// No request timeout is configured; a hung request simply hangs.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(token) = &request.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(ApiResponse { status, body })
    }
}

/// Issues requests with the bearer token attached, recovering from token
/// expiry exactly once per logical call.
pub struct ApiClient<T: Transport> {
    transport: T,
    token: Option<String>,
    session_path: Option<PathBuf>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, token: Option<String>, session_path: Option<PathBuf>) -> Self {
        Self {
            transport,
            token,
            session_path,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Sets the token and writes it to the session file.
    pub fn store_token(&mut self, token: &str) -> Result<(), config::ConfigError> {
        self.token = Some(token.to_string());
        if let Some(path) = &self.session_path {
            config::save_token(path, token)?;
        }
        Ok(())
    }

    /// Drops the in-memory token and deletes the session file.
    pub fn clear_session(&mut self) {
        self.token = None;
        if let Some(path) = &self.session_path {
            if let Err(err) = config::clear_token(path) {
                warn!("Failed to remove session file: {err}");
            }
        }
    }

    /// Sends a request with the current token. On a 401, performs a single
    /// refresh call and re-issues the original request once with the token
    /// the refresh returned. A 401 on the re-issued request is returned
    /// as-is; so is the original 401 when the refresh itself fails.
    pub fn request(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        let first = self.transport.send(&ApiRequest {
            method,
            path: path.to_string(),
            body: body.clone(),
            token: self.token.clone(),
        })?;
        if first.status != 401 {
            return Ok(first);
        }

        debug!("Access token rejected for {path}, attempting refresh");
        let refreshed = self.transport.send(&ApiRequest {
            method: Method::Post,
            path: REFRESH_PATH.to_string(),
            body: None,
            token: None,
        })?;
        if !refreshed.ok() {
            debug!("Refresh failed with status {}", refreshed.status);
            return Ok(first);
        }

        let new_token = refreshed
            .json()
            .get("token")
            .and_then(Value::as_str)
            .map(String::from);
        if let Some(token) = &new_token {
            if let Err(err) = self.store_token(token) {
                warn!("Refreshed token could not be persisted: {err}");
            }
        }

        self.transport.send(&ApiRequest {
            method,
            path: path.to_string(),
            body,
            token: new_token,
        })
    }

    /// Sends a request without the refresh-and-retry behavior. Used for the
    /// auth endpoints themselves, where a 401 means bad credentials rather
    /// than an expired token.
    pub fn request_no_retry(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, ApiError> {
        self.transport.send(&ApiRequest {
            method,
            path: path.to_string(),
            body,
            token: None,
        })
    }
}

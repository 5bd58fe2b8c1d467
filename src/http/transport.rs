//! Transport seam between the executor and the network.
//!
//! The executor only ever talks to a [`Transport`]; [`crate::http::Client`]
//! is the reqwest-backed implementation, tests plug in their own.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::http::types::Method;

/// A request as handed to the transport.
///
/// `body` is `None` for GET and DELETE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub params: HashMap<String, String>,
    pub body: Option<String>,
}

impl TransportRequest {
    pub fn without_body(
        method: Method,
        url: &str,
        headers: HashMap<String, String>,
        params: HashMap<String, String>,
    ) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers,
            params,
            body: None,
        }
    }

    pub fn with_body(
        method: Method,
        url: &str,
        headers: HashMap<String, String>,
        params: HashMap<String, String>,
        body: &str,
    ) -> Self {
        Self {
            body: Some(body.to_string()),
            ..Self::without_body(method, url, headers, params)
        }
    }
}

/// Full response metadata on success.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    /// `None` when the transport cannot enumerate headers.
    pub headers: Option<HeaderMap>,
    pub body: Value,
}

/// Whatever the transport could determine about a failed call.
#[derive(Debug, Clone, Default)]
pub struct TransportError {
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub headers: Option<HeaderMap>,
    /// Structured error payload, e.g. the body of a 4xx response.
    pub payload: Option<Value>,
    pub message: Option<String>,
}

impl TransportError {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, &self.message) {
            (Some(status), Some(msg)) => write!(f, "HTTP {status}: {msg}"),
            (Some(status), None) => write!(f, "HTTP {status}"),
            (None, Some(msg)) => f.write_str(msg),
            (None, None) => f.write_str("transport failure"),
        }
    }
}

impl std::error::Error for TransportError {}

pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// Flatten a header collection into a plain name → value map.
///
/// Values that are not valid UTF-8 become empty strings. A repeated header
/// keeps its first value, same as `HeaderMap::get`.
pub fn flatten_headers(headers: Option<&HeaderMap>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Some(headers) = headers {
        for (k, v) in headers.iter() {
            map.entry(k.as_str().to_string())
                .or_insert_with(|| v.to_str().unwrap_or("").to_string());
        }
    }
    map
}

use std::time::Duration;

use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::Result;
use crate::config::ClientConfig;
use crate::http::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// reqwest 实现的传输层
#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
    base_url: Option<Url>,
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::from_config(&ClientConfig::default())
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let base_url = config.base_url.as_deref().map(Url::parse).transpose()?;
        Ok(Self { inner, base_url })
    }

    /// 解析 URL 并合并查询参数，相对路径基于 base_url
    fn resolve_url(&self, request: &TransportRequest) -> std::result::Result<Url, TransportError> {
        let invalid = |e: url::ParseError| {
            TransportError::message(format!("Invalid URL {}: {}", request.url, e))
        };

        let resolved = match (Url::parse(&request.url), &self.base_url) {
            (Ok(url), _) => url,
            (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => {
                base.join(&request.url).map_err(invalid)?
            }
            (Err(e), _) => return Err(invalid(e)),
        };

        if request.params.is_empty() {
            return Ok(resolved);
        }
        Url::parse_with_params(resolved.as_str(), &request.params).map_err(invalid)
    }

    fn header_map(request: &TransportRequest) -> std::result::Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &request.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| TransportError::message(format!("Invalid header name {key}: {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                TransportError::message(format!("Invalid value for header {key}: {e}"))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

/// JSON 优先，否则保留原始文本；空响应体为 null
fn parse_body(text: String) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

impl Transport for Client {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let url = self.resolve_url(&request)?;
        let headers = Self::header_map(&request)?;

        debug!(method = %request.method, %url, "dispatching request");

        let mut req = self
            .inner
            .request(request.method.into(), url.clone())
            .headers(headers);
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| TransportError::message(e.to_string()))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::message(e.to_string()))?;
        let body = parse_body(text);

        if status.is_success() {
            Ok(TransportResponse {
                status: status.as_u16(),
                status_text,
                headers: Some(headers),
                body,
            })
        } else {
            Err(TransportError {
                status: Some(status.as_u16()),
                message: Some(format!(
                    "Http failure response for {}: {} {}",
                    url,
                    status.as_u16(),
                    status_text
                )),
                status_text: Some(status_text),
                headers: Some(headers),
                payload: Some(body),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::types::Method;
    use std::collections::HashMap;

    fn request(url: &str) -> TransportRequest {
        TransportRequest::without_body(Method::Get, url, HashMap::new(), HashMap::new())
    }

    #[test]
    fn test_resolve_absolute_url_with_params() {
        let client = Client::new().unwrap();
        let mut req = request("https://example.com/search");
        req.params.insert("q".to_string(), "rust lang".to_string());

        let url = client.resolve_url(&req).unwrap();
        assert_eq!(url.as_str(), "https://example.com/search?q=rust+lang");
    }

    #[test]
    fn test_resolve_without_params_keeps_url() {
        let client = Client::new().unwrap();
        let url = client.resolve_url(&request("https://example.com/a")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/a");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_resolve_appends_to_existing_query() {
        let client = Client::new().unwrap();
        let mut req = request("https://example.com/a?x=1");
        req.params.insert("y".to_string(), "2".to_string());

        let url = client.resolve_url(&req).unwrap();
        assert_eq!(url.as_str(), "https://example.com/a?x=1&y=2");
    }

    #[test]
    fn test_resolve_relative_url_against_base() {
        let config = ClientConfig {
            base_url: Some("http://localhost:8080/api/".to_string()),
            ..Default::default()
        };
        let client = Client::from_config(&config).unwrap();
        let url = client.resolve_url(&request("users/1")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/users/1");
    }

    #[test]
    fn test_relative_url_without_base_fails() {
        let client = Client::new().unwrap();
        let err = client.resolve_url(&request("/users")).unwrap_err();
        assert!(err.status.is_none());
        assert!(err.message.unwrap().starts_with("Invalid URL /users"));
    }

    #[test]
    fn test_invalid_header_name() {
        let mut req = request("https://example.com");
        req.headers.insert("bad header".to_string(), "v".to_string());
        assert!(Client::header_map(&req).is_err());
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(String::new()), Value::Null);
        assert_eq!(parse_body("{\"a\":1}".to_string()), serde_json::json!({"a": 1}));
        assert_eq!(parse_body("plain".to_string()), Value::String("plain".into()));
    }
}

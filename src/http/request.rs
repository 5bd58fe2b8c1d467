use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::http::types::{AuthType, Authorization, Method};

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const API_KEY_HEADER: &str = "X-API-Key";

/// 规范化后的请求描述，即将发送的请求
///
/// `method` 保留原始字符串，不支持的方法由执行器转换为失败响应。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<Authorization>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl RequestDescriptor {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            headers: HashMap::new(),
            params: HashMap::new(),
            body: String::new(),
            authorization: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_owned();
        self
    }

    pub fn with_authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = Some(authorization);
        self
    }

    pub fn parsed_method(&self) -> Result<Method> {
        self.method.parse()
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    /// 由授权信息推导出的请求头
    ///
    /// 凭据为空或同名请求头已显式存在时返回 None。
    pub fn authorization_header(&self) -> Option<(&'static str, String)> {
        let auth = self.authorization.as_ref()?;

        match auth.kind {
            AuthType::Bearer => {
                let token = non_empty(&auth.token)?;
                if self.has_header(AUTHORIZATION_HEADER) {
                    return None;
                }
                Some((AUTHORIZATION_HEADER, format!("Bearer {}", token)))
            }
            AuthType::Basic => {
                let username = non_empty(&auth.username)?;
                if self.has_header(AUTHORIZATION_HEADER) {
                    return None;
                }
                let password = auth.password.as_deref().unwrap_or_default();
                let encoded = STANDARD.encode(format!("{}:{}", username, password));
                Some((AUTHORIZATION_HEADER, format!("Basic {}", encoded)))
            }
            AuthType::ApiKey => {
                let key = non_empty(&auth.token)?;
                if self.has_header(API_KEY_HEADER) {
                    return None;
                }
                Some((API_KEY_HEADER, key.to_string()))
            }
        }
    }

    /// 实际发送的请求头: 显式请求头加上授权头
    pub fn effective_headers(&self) -> HashMap<String, String> {
        let mut headers = self.headers.clone();
        if let Some((name, value)) = self.authorization_header() {
            headers.insert(name.to_string(), value);
        }
        headers
    }
}

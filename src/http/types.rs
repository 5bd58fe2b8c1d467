use std::fmt;
use std::str::FromStr;

use crate::{Result, TelaError};
use serde::{Deserialize, Serialize};

/// 支持的 HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl FromStr for Method {
    type Err = TelaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            _ => Err(TelaError::ParseError(format!(
                "Unsupported HTTP method: {}",
                s
            ))),
        }
    }
}

impl Method {
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
    ];

    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }

    /// POST / PUT / PATCH 携带请求体，GET / DELETE 不携带
    pub fn allows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
        }
    }
}

/// 状态码分类，用于展示层着色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
    /// 包括 status 0 (请求未到达服务器)
    Unknown,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            500.. => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            StatusClass::Success => "status-success",
            StatusClass::Redirect => "status-redirect",
            StatusClass::ClientError => "status-client-error",
            StatusClass::ServerError => "status-server-error",
            StatusClass::Unknown => "status-unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthType {
    #[default]
    Bearer,
    Basic,
    ApiKey,
}

impl FromStr for AuthType {
    type Err = TelaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bearer" => Ok(AuthType::Bearer),
            "basic" => Ok(AuthType::Basic),
            "api-key" | "apikey" => Ok(AuthType::ApiKey),
            _ => Err(TelaError::ParseError(format!("Invalid auth type: {}", s))),
        }
    }
}

/// 授权信息，原样保存在请求描述中
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Authorization {
    #[serde(rename = "type")]
    pub kind: AuthType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Authorization {
    pub fn bearer(token: &str) -> Self {
        Self {
            kind: AuthType::Bearer,
            token: Some(token.to_string()),
            ..Default::default()
        }
    }

    pub fn basic(username: &str, password: &str) -> Self {
        Self {
            kind: AuthType::Basic,
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            ..Default::default()
        }
    }

    pub fn api_key(key: &str) -> Self {
        Self {
            kind: AuthType::ApiKey,
            token: Some(key.to_string()),
            ..Default::default()
        }
    }
}

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::types::StatusClass;

pub const NETWORK_ERROR: &str = "Network Error";
pub const REQUEST_FAILED: &str = "Request Failed";
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// 成功与失败共用的响应模型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseModel {
    /// 0 表示请求没有得到任何 HTTP 响应
    pub status: u16,
    pub status_text: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Value,
    /// 毫秒，四舍五入
    pub response_time: u64,
}

impl ResponseModel {
    /// 本地失败 (未经过传输层)
    pub fn local_failure(message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            status: 0,
            status_text: REQUEST_FAILED.to_string(),
            headers: HashMap::new(),
            body: Value::String(message.into()),
            response_time: round_millis(elapsed),
        }
    }

    pub fn status_class(&self) -> StatusClass {
        StatusClass::of(self.status)
    }

    pub fn is_success(&self) -> bool {
        self.status_class() == StatusClass::Success
    }

    /// status 0: 连接失败、不支持的方法等
    pub fn is_network_failure(&self) -> bool {
        self.status == 0
    }

    /// 响应体的文本形式，字符串不加引号
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

pub fn round_millis(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_millis() {
        assert_eq!(round_millis(Duration::from_micros(1_499)), 1);
        assert_eq!(round_millis(Duration::from_micros(1_500)), 2);
        assert_eq!(round_millis(Duration::ZERO), 0);
    }

    #[test]
    fn test_serialized_field_names() {
        let response = ResponseModel::local_failure("boom", Duration::from_millis(3));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], 0);
        assert_eq!(json["statusText"], "Request Failed");
        assert_eq!(json["responseTime"], 3);
        assert_eq!(json["body"], "boom");
        assert!(response.is_network_failure());
    }

    #[test]
    fn test_body_text() {
        let mut response = ResponseModel::local_failure("plain", Duration::ZERO);
        assert_eq!(response.body_text(), "plain");
        response.body = serde_json::json!({"ok": true});
        assert_eq!(response.body_text(), r#"{"ok":true}"#);
    }
}

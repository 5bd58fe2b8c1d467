use crate::http::{ResponseModel, StatusClass};
use colored::*;
use serde_json::Value;

pub enum ResponseFormat {
    Compact,
    Verbose,
}

pub struct ResponseFormatter {
    format: ResponseFormat,
    color: bool,
    show_body: bool,
    show_timing: bool,
}

impl ResponseFormatter {
    pub fn new(format: ResponseFormat) -> Self {
        Self {
            format,
            color: true,
            show_body: true,
            show_timing: true,
        }
    }

    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn hide_body(mut self) -> Self {
        self.show_body = false;
        self
    }

    pub fn hide_timing(mut self) -> Self {
        self.show_timing = false;
        self
    }

    pub fn format(&self, response: &ResponseModel) -> String {
        let verbose = matches!(self.format, ResponseFormat::Verbose);
        let mut output = Vec::new();

        output.push(self.status_line(response, verbose));

        if self.show_timing {
            let timing = format!("Time: {}ms", response.response_time);
            output.push(self.paint(timing, |s| s.cyan()));
        }

        if verbose && !response.headers.is_empty() {
            output.push(String::new());
            output.push(self.paint("Headers:".to_string(), |s| s.blue().bold()));
            let mut headers: Vec<_> = response.headers.iter().collect();
            headers.sort();
            for (key, value) in headers {
                output.push(self.paint(format!("   {}: {}", key, value), |s| s.blue()));
            }
        }

        if self.show_body {
            let body = pretty_body(&response.body);
            if verbose && !body.is_empty() {
                output.push(String::new());
                output.push(self.paint("Body:".to_string(), |s| s.blue().bold()));
                output.push(body);
            } else if !body.is_empty() && body.len() < 200 {
                output.push(body);
            } else if !body.is_empty() {
                output.push(format!("Body: {} bytes", body.len()));
            }
        }

        output.join("\n")
    }

    /// status 0 单独标注，和真实的 HTTP 错误区分
    fn status_line(&self, response: &ResponseModel, bold: bool) -> String {
        let line = if response.is_network_failure() {
            format!("✗ {}", response.status_text)
        } else {
            format!("HTTP {} {}", response.status, response.status_text)
        };
        if !self.color {
            return line;
        }

        let colored = match response.status_class() {
            StatusClass::Success => line.green(),
            StatusClass::Redirect => line.cyan(),
            StatusClass::ClientError => line.yellow(),
            StatusClass::ServerError => line.red(),
            StatusClass::Unknown => line.magenta(),
        };
        if bold {
            colored.bold().to_string()
        } else {
            colored.to_string()
        }
    }

    fn paint(&self, text: String, style: impl Fn(&str) -> ColoredString) -> String {
        if self.color {
            style(&text).to_string()
        } else {
            text
        }
    }
}

/// 响应体格式化: JSON 缩进输出，字符串如果本身是 JSON 也会格式化
pub fn pretty_body(body: &Value) -> String {
    match body {
        Value::Null => String::new(),
        Value::String(text) => pretty_json(text).unwrap_or_else(|| text.clone()),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// 尝试将文本格式化为漂亮的 JSON，不是有效 JSON 时返回 None
pub fn pretty_json(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn response(status: u16, body: Value) -> ResponseModel {
        ResponseModel {
            status,
            status_text: "OK".to_string(),
            headers: HashMap::from([("content-type".to_string(), "application/json".to_string())]),
            body,
            response_time: 42,
        }
    }

    #[test]
    fn test_pretty_json() {
        assert_eq!(pretty_json("{\"a\":1}").unwrap(), "{\n  \"a\": 1\n}");
        assert!(pretty_json("not json").is_none());
    }

    #[test]
    fn test_pretty_body() {
        assert_eq!(pretty_body(&Value::Null), "");
        assert_eq!(pretty_body(&Value::String("hello".into())), "hello");
        assert_eq!(pretty_body(&serde_json::json!([1])), "[\n  1\n]");
    }

    #[test]
    fn test_compact_format() {
        let formatter = ResponseFormatter::new(ResponseFormat::Compact).without_color();
        let out = formatter.format(&response(200, serde_json::json!({"ok": true})));
        assert_eq!(out, "HTTP 200 OK\nTime: 42ms\n{\n  \"ok\": true\n}");
    }

    #[test]
    fn test_verbose_format_includes_headers() {
        let formatter = ResponseFormatter::new(ResponseFormat::Verbose).without_color();
        let out = formatter.format(&response(200, Value::Null));
        assert!(out.contains("Headers:\n   content-type: application/json"));
        assert!(!out.contains("Body:"));
    }

    #[test]
    fn test_network_failure_status_line() {
        let formatter = ResponseFormatter::new(ResponseFormat::Compact).without_color();
        let failure = ResponseModel::local_failure("boom", Duration::ZERO);
        assert!(formatter.format(&failure).starts_with("✗ Request Failed"));
    }

    #[test]
    fn test_hidden_sections() {
        let formatter = ResponseFormatter::new(ResponseFormat::Verbose)
            .without_color()
            .hide_body()
            .hide_timing();
        let out = formatter.format(&response(200, serde_json::json!({"ok": true})));
        assert!(out.starts_with("HTTP 200 OK\n\nHeaders:"));
        assert!(!out.contains("Time:"));
        assert!(!out.contains("ok"));
    }
}

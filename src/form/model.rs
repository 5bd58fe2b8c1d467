use serde::{Deserialize, Serialize};

use crate::http::{AuthType, Method};

pub const DEFAULT_URL: &str = "https://jsonplaceholder.typicode.com/posts/1";
pub const DEFAULT_BODY: &str = "{\n  \"title\": \"foo\",\n  \"body\": \"bar\",\n  \"userId\": 1\n}";

/// 请求头 / 查询参数编辑行
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyValueRow {
    pub key: String,
    pub value: String,
}

impl KeyValueRow {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// 键和值都非空时才会进入请求
    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }
}

/// 授权表单，所有字段都以原始文本保存
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthForm {
    #[serde(rename = "type")]
    pub kind: AuthType,
    pub token: String,
    pub username: String,
    pub password: String,
}

/// 表单的原始状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestForm {
    pub method: String,
    pub url: String,
    pub headers: Vec<KeyValueRow>,
    pub params: Vec<KeyValueRow>,
    pub body: String,
    pub authorization: AuthForm,
}

impl Default for RequestForm {
    /// 初始表单: 一个 Content-Type 请求头和一个空的查询参数行
    fn default() -> Self {
        Self {
            method: Method::Get.as_str().to_string(),
            url: DEFAULT_URL.to_string(),
            headers: vec![KeyValueRow::new("Content-Type", "application/json")],
            params: vec![KeyValueRow::default()],
            body: DEFAULT_BODY.to_string(),
            authorization: AuthForm::default(),
        }
    }
}

impl RequestForm {
    pub fn empty() -> Self {
        Self {
            method: Method::Get.as_str().to_string(),
            url: String::new(),
            headers: Vec::new(),
            params: Vec::new(),
            body: String::new(),
            authorization: AuthForm::default(),
        }
    }

    pub fn add_header(&mut self) {
        self.headers
            .push(KeyValueRow::new("Content-Type", "application/json"));
    }

    pub fn remove_header(&mut self, index: usize) -> Option<KeyValueRow> {
        (index < self.headers.len()).then(|| self.headers.remove(index))
    }

    pub fn add_param(&mut self) {
        self.params.push(KeyValueRow::default());
    }

    pub fn remove_param(&mut self, index: usize) -> Option<KeyValueRow> {
        (index < self.params.len()).then(|| self.params.remove(index))
    }
}

use std::collections::HashMap;

use crate::form::model::{AuthForm, KeyValueRow, RequestForm};
use crate::history::HistoryEntry;
use crate::http::{Authorization, RequestDescriptor};

/// 不完整的行 (键或值为空) 被丢弃，重复的键保留最后一个
fn collect_rows(rows: &[KeyValueRow]) -> HashMap<String, String> {
    rows.iter()
        .filter(|row| row.is_complete())
        .map(|row| (row.key.clone(), row.value.clone()))
        .collect()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

impl From<&AuthForm> for Authorization {
    fn from(form: &AuthForm) -> Self {
        Self {
            kind: form.kind,
            token: non_empty(&form.token),
            username: non_empty(&form.username),
            password: non_empty(&form.password),
        }
    }
}

impl From<&Authorization> for AuthForm {
    fn from(auth: &Authorization) -> Self {
        Self {
            kind: auth.kind,
            token: auth.token.clone().unwrap_or_default(),
            username: auth.username.clone().unwrap_or_default(),
            password: auth.password.clone().unwrap_or_default(),
        }
    }
}

impl RequestForm {
    /// 由表单构建规范化的请求描述
    ///
    /// 请求体只保留给 POST / PUT / PATCH。方法不在此处校验。
    pub fn to_descriptor(&self) -> RequestDescriptor {
        let method = self.method.trim().to_uppercase();
        let body = if matches!(method.as_str(), "POST" | "PUT" | "PATCH") {
            self.body.clone()
        } else {
            String::new()
        };

        RequestDescriptor {
            method,
            url: self.url.clone(),
            headers: collect_rows(&self.headers),
            params: collect_rows(&self.params),
            body,
            authorization: Some(Authorization::from(&self.authorization)),
        }
    }

    /// 用历史记录中的请求重新填充表单
    pub fn load_from_history(&mut self, entry: &HistoryEntry) {
        let request = &entry.request;

        self.method = request.method.clone();
        self.url = request.url.clone();
        self.body = request.body.clone();
        if let Some(auth) = &request.authorization {
            self.authorization = AuthForm::from(auth);
        }

        self.headers = sorted_rows(&request.headers);
        self.params = sorted_rows(&request.params);
    }
}

fn sorted_rows(map: &HashMap<String, String>) -> Vec<KeyValueRow> {
    let mut rows: Vec<KeyValueRow> = map.iter().map(|(k, v)| KeyValueRow::new(k, v)).collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}

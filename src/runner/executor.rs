use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info};

use crate::history::HistoryStore;
use crate::http::response::{NETWORK_ERROR, UNKNOWN_ERROR, round_millis};
use crate::http::transport::flatten_headers;
use crate::http::{
    Method, RequestDescriptor, ResponseModel, Transport, TransportError, TransportRequest,
    TransportResponse,
};

/// 执行请求并记录历史
///
/// `execute` 从不返回错误: 所有失败都被转换为 `ResponseModel`。
pub struct RequestExecutor<T> {
    transport: T,
    history: Arc<HistoryStore>,
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T, history: Arc<HistoryStore>) -> Self {
        Self { transport, history }
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// 执行单个请求，结果写入历史后返回
    pub async fn execute(&self, descriptor: RequestDescriptor) -> ResponseModel {
        // 开始计时
        let start = Instant::now();

        let response = match descriptor.parsed_method() {
            Ok(method) => {
                let request = Self::transport_request(method, &descriptor);
                let outcome = self.transport.send(request).await;
                let elapsed = start.elapsed();
                match outcome {
                    Ok(success) => Self::from_success(success, round_millis(elapsed)),
                    Err(failure) => Self::from_failure(failure, round_millis(elapsed)),
                }
            }
            Err(_) => ResponseModel::local_failure(
                format!("Unsupported HTTP method: {}", descriptor.method),
                start.elapsed(),
            ),
        };

        info!(
            method = %descriptor.method,
            url = %descriptor.url,
            status = response.status,
            time_ms = response.response_time,
            "request completed"
        );

        self.history.append(descriptor, response.clone());
        response
    }

    /// GET / DELETE 不发送请求体
    fn transport_request(method: Method, descriptor: &RequestDescriptor) -> TransportRequest {
        let headers = descriptor.effective_headers();
        let params = descriptor.params.clone();
        match method {
            Method::Get | Method::Delete => {
                TransportRequest::without_body(method, &descriptor.url, headers, params)
            }
            Method::Post | Method::Put | Method::Patch => TransportRequest::with_body(
                method,
                &descriptor.url,
                headers,
                params,
                &descriptor.body,
            ),
        }
    }

    fn from_success(response: TransportResponse, response_time: u64) -> ResponseModel {
        ResponseModel {
            status: response.status,
            status_text: response.status_text,
            headers: flatten_headers(response.headers.as_ref()),
            body: response.body,
            response_time,
        }
    }

    fn from_failure(error: TransportError, response_time: u64) -> ResponseModel {
        debug!("transport failure: {}", error);

        let body = match (error.payload, error.message) {
            (Some(payload), _) if !payload.is_null() => payload,
            (_, Some(message)) if !message.is_empty() => Value::String(message),
            _ => Value::String(UNKNOWN_ERROR.to_string()),
        };

        ResponseModel {
            status: error.status.unwrap_or(0),
            status_text: error
                .status_text
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NETWORK_ERROR.to_string()),
            headers: flatten_headers(error.headers.as_ref()),
            body,
            response_time,
        }
    }
}

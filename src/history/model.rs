use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::serialization;
use crate::http::{RequestDescriptor, ResponseModel};

/// 历史记录条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 唯一 ID (UUID)
    pub id: String,

    /// 发送的请求
    pub request: RequestDescriptor,

    /// 响应 (执行完成后总是存在)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseModel>,

    /// 创建时间，精确到毫秒
    #[serde(with = "serialization::iso_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(request: RequestDescriptor, response: Option<ResponseModel>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            request,
            response,
            timestamp: Utc::now().trunc_subsecs(3),
        }
    }

    /// 短 ID，用于列表展示
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    /// 响应状态，未记录响应时为 None
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }
}

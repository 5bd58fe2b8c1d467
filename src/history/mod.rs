pub mod model;
pub mod printer;
pub mod serialization;
pub mod storage;
pub mod store;

pub use model::HistoryEntry;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{HistorySnapshot, HistoryStore, HistorySubscription};

/// 持久化使用的固定键
pub const HISTORY_KEY: &str = "telascripts-http-history";
/// 历史记录上限，超出时淘汰最旧的条目
pub const MAX_ENTRIES: usize = 50;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelaError {
    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("HTTP 请求失败: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("存储错误: {0}")]
    StorageError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL 解析错误: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for TelaError {
    fn from(err: anyhow::Error) -> Self {
        TelaError::Other(err.to_string())
    }
}

impl From<toml::de::Error> for TelaError {
    fn from(err: toml::de::Error) -> Self {
        TelaError::ConfigError(err.to_string())
    }
}

/// Result type for telascripts crate
pub type Result<T> = std::result::Result<T, TelaError>;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Result;

/// 历史目录环境变量，优先于配置文件
pub const HISTORY_DIR_ENV: &str = "TELASCRIPTS_HISTORY_DIR";
const DEFAULT_HISTORY_DIR: &str = ".telascripts";

/// 客户端配置 (telascripts.toml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 请求超时 (秒)
    pub timeout_secs: u64,
    /// 相对 URL 的基准地址
    pub base_url: Option<String>,
    pub history_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            base_url: None,
            history_dir: None,
        }
    }
}

impl ClientConfig {
    /// 历史记录目录: 环境变量 > 配置文件 > 默认值
    pub fn resolved_history_dir(&self) -> PathBuf {
        if let Ok(dir) = std::env::var(HISTORY_DIR_ENV) {
            return PathBuf::from(dir);
        }
        self.history_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_DIR))
    }
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "telascripts.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ClientConfig> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// 查找并加载配置文件，找不到时使用默认配置
    /// 查找顺序：
    /// 1. 当前目录及父目录
    /// 2. 用户配置目录 ~/.config/telascripts/
    pub fn find_and_load() -> ClientConfig {
        let candidates = Self::current_dir_candidates()
            .into_iter()
            .chain(Self::user_dir_candidate());

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_path(&path) {
                Ok(config) => {
                    debug!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => warn!("Ignoring invalid config {}: {}", path.display(), e),
            }
        }

        ClientConfig::default()
    }

    fn current_dir_candidates() -> Vec<PathBuf> {
        let Ok(mut current) = std::env::current_dir() else {
            return Vec::new();
        };

        let mut paths = Vec::new();
        loop {
            paths.push(current.join(Self::CONFIG_FILE));
            if !current.pop() {
                break;
            }
        }
        paths
    }

    fn user_dir_candidate() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("telascripts").join(Self::CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("telascripts.toml");
        fs::write(
            &path,
            "timeout_secs = 5\nbase_url = \"http://localhost:3000\"\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000"));
        assert!(config.history_dir.is_none());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("telascripts.toml");
        fs::write(&path, "").unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("telascripts.toml");
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();

        let err = ConfigLoader::load_from_path(&path).unwrap_err();
        assert!(matches!(err, crate::TelaError::ConfigError(_)));
    }
}

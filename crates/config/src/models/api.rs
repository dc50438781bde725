use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ValidationUtils};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_LOG_PLACEHOLDER: &str = "No logs available";

/// 后端 REST API 连接配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API 根地址，所有资源路径都相对于它
    pub base_url: String,
    /// 单次请求的超时秒数，0 表示不设超时
    pub timeout_seconds: u64,
    /// 每个请求都会带上的请求头；调用方传入的同名请求头优先
    pub default_headers: BTreeMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            default_headers: BTreeMap::new(),
        }
    }
}

impl ConfigValidator for ApiConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_http_url(&self.base_url, "api.base_url")?;
        ValidationUtils::validate_timeout_seconds(self.timeout_seconds, "api.timeout_seconds")?;
        for name in self.default_headers.keys() {
            ValidationUtils::validate_header_name(name, "api.default_headers")?;
        }
        Ok(())
    }
}

impl ApiConfig {
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}

/// 执行日志面板配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    pub export_dir: String,
    pub placeholder: String,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            export_dir: ".".to_string(),
            placeholder: DEFAULT_LOG_PLACEHOLDER.to_string(),
        }
    }
}

impl ConfigValidator for LogsConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_not_empty(&self.export_dir, "logs.export_dir")?;
        ValidationUtils::validate_not_empty(&self.placeholder, "logs.placeholder")?;
        Ok(())
    }
}

// 配置验证

use crate::{ConfigError, ConfigResult};

pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

/// 验证工具函数
pub struct ValidationUtils;

impl ValidationUtils {
    pub fn validate_not_empty(value: &str, field_name: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    /// 只接受 http/https 的绝对地址
    pub fn validate_http_url(value: &str, field_name: &str) -> ConfigResult<()> {
        Self::validate_not_empty(value, field_name)?;

        let parsed = url::Url::parse(value).map_err(|e| {
            ConfigError::Validation(format!("{field_name} must be a valid URL: {e}"))
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::Validation(format!(
                "{field_name} must use http or https, got {other}"
            ))),
        }
    }

    /// 0 表示不限制请求时长
    pub fn validate_timeout_seconds(timeout_seconds: u64, field_name: &str) -> ConfigResult<()> {
        if timeout_seconds > 3600 {
            return Err(ConfigError::Validation(format!(
                "{field_name} must be less than or equal to 3600 seconds"
            )));
        }
        Ok(())
    }

    pub fn validate_header_name(name: &str, field_name: &str) -> ConfigResult<()> {
        Self::validate_not_empty(name, field_name)?;
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
        {
            return Err(ConfigError::Validation(format!(
                "{field_name} contains an invalid header name: {name}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_http_url() {
        assert!(ValidationUtils::validate_http_url("http://localhost:8080/api/v1", "api.base_url").is_ok());
        assert!(ValidationUtils::validate_http_url("https://console.example.com", "api.base_url").is_ok());
        assert!(ValidationUtils::validate_http_url("", "api.base_url").is_err());
        assert!(ValidationUtils::validate_http_url("localhost:8080", "api.base_url").is_err());
        assert!(ValidationUtils::validate_http_url("ftp://files.example.com", "api.base_url").is_err());
    }

    #[test]
    fn test_validate_timeout_seconds() {
        assert!(ValidationUtils::validate_timeout_seconds(30, "api.timeout_seconds").is_ok());
        assert!(ValidationUtils::validate_timeout_seconds(0, "api.timeout_seconds").is_ok());
        assert!(ValidationUtils::validate_timeout_seconds(3600, "api.timeout_seconds").is_ok());
        assert!(ValidationUtils::validate_timeout_seconds(3601, "api.timeout_seconds").is_err());
    }

    #[test]
    fn test_validate_header_name() {
        assert!(ValidationUtils::validate_header_name("X-Request-Id", "api.default_headers").is_ok());
        assert!(ValidationUtils::validate_header_name("Bad Header", "api.default_headers").is_err());
    }
}

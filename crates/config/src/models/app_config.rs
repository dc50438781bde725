use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api::{ApiConfig, LogsConfig, DEFAULT_BASE_URL, DEFAULT_LOG_PLACEHOLDER},
    logging::LogConfig,
};
use crate::validation::ConfigValidator;

pub const ENV_PREFIX: &str = "RATCHET_CONSOLE";

pub const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "config/console.toml",
    "console.toml",
    "/etc/ratchet-console/config.toml",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
    pub logs: LogsConfig,
    pub logging: LogConfig,
}

impl ConsoleConfig {
    /// 按顺序加载：内置默认值、配置文件、`RATCHET_CONSOLE_*` 环境变量
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_with_environment(config_path, Self::environment())
    }

    /// 环境变量形如 `RATCHET_CONSOLE_API__BASE_URL`
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    pub fn load_with_environment(config_path: Option<&str>, environment: Environment) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_seconds", 30)?
            .set_default("logs.export_dir", ".")?
            .set_default("logs.placeholder", DEFAULT_LOG_PLACEHOLDER)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?;

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else if let Some(path) = DEFAULT_CONFIG_PATHS
            .iter()
            .find(|path| Path::new(path).exists())
        {
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        }

        builder = builder.add_source(environment);

        let config: ConsoleConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: ConsoleConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }
}

impl ConfigValidator for ConsoleConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        self.api.validate()?;
        self.logs.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

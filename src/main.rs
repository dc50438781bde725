use anyhow::{Context, Result};
use console_config::{ConsoleConfig, LogConfig, OutputFormat};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod prompt;

use app::{build_cli, Application, ConsoleCommand};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mut config = ConsoleConfig::load(config_path).context("加载配置失败")?;

    // 命令行参数优先于配置文件和环境变量
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config.logging.format = format.parse().map_err(anyhow::Error::msg)?;
    }

    init_logging(&config.logging)?;
    debug!("API 根地址: {}", config.api.base_url);

    let command = ConsoleCommand::from_matches(&matches)?;
    let app = Application::new(config)?;

    if let Err(e) = app.run(command).await {
        error!("命令执行失败: {}", e);
        eprintln!("{}: {}", e.user_message(), e);
        for field in e.field_errors() {
            eprintln!("  - {field}");
        }
        std::process::exit(1);
    }

    Ok(())
}

/// 初始化日志系统，输出到stderr以保证stdout只有命令结果
fn init_logging(config: &LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        OutputFormat::Json => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .context("初始化JSON日志格式失败")?;
        }
        OutputFormat::Pretty => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()
                .context("初始化日志格式失败")?;
        }
    }

    Ok(())
}

//! 执行日志获取与导出

use std::path::{Path, PathBuf};
use std::sync::Arc;

use console_domain::Resource;
use console_errors::{ConsoleError, ConsoleResult};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::protocol::{protocol_for, SideAction};
use crate::provider::{CustomRequest, DataProvider};

/// 按需获取日志，不参与轮询
#[derive(Clone)]
pub struct LogService {
    provider: Arc<dyn DataProvider>,
    placeholder: String,
}

impl LogService {
    pub fn new<S: Into<String>>(provider: Arc<dyn DataProvider>, placeholder: S) -> Self {
        Self {
            provider,
            placeholder: placeholder.into(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// POST `executions/{id}/logs`，返回 `data.logs`；缺失或为空时返回占位文本
    pub async fn fetch_logs(&self, execution_id: &str) -> ConsoleResult<String> {
        let segments =
            protocol_for(Resource::Executions).action_segments(execution_id, SideAction::Logs)?;
        let request = CustomRequest::at_segments(segments, "POST")
            .payload(json!({}))
            .context(Resource::Executions.as_str());

        let response = self.provider.custom(request).await?;
        let logs = response
            .data
            .get("logs")
            .and_then(Value::as_str)
            .filter(|logs| !logs.is_empty())
            .map(str::to_string);

        debug!(
            "Fetched logs for execution {} ({} bytes)",
            execution_id,
            logs.as_ref().map_or(0, String::len)
        );
        Ok(logs.unwrap_or_else(|| self.placeholder.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogPanelState {
    Idle,
    Loading,
    Loaded,
    Failed { message: String },
}

#[derive(Debug)]
struct PanelInner {
    state: LogPanelState,
    text: String,
}

/// 单个执行的日志面板
///
/// 并发刷新不合并也不取消，最后返回的响应决定显示内容。
pub struct LogViewer {
    service: LogService,
    execution_id: String,
    inner: RwLock<PanelInner>,
}

impl LogViewer {
    pub fn new<S: Into<String>>(service: LogService, execution_id: S) -> Self {
        Self {
            service,
            execution_id: execution_id.into(),
            inner: RwLock::new(PanelInner {
                state: LogPanelState::Idle,
                text: String::new(),
            }),
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn title(&self) -> String {
        format!("Execution Logs - {}", self.execution_id)
    }

    pub async fn state(&self) -> LogPanelState {
        self.inner.read().await.state.clone()
    }

    /// 当前显示的文本；尚未加载时显示占位文本
    pub async fn text(&self) -> String {
        let inner = self.inner.read().await;
        if inner.text.is_empty() {
            self.service.placeholder().to_string()
        } else {
            inner.text.clone()
        }
    }

    /// 失败时保留上一次的文本，只记录错误信息
    pub async fn refresh(&self) -> ConsoleResult<String> {
        self.inner.write().await.state = LogPanelState::Loading;

        let result = self.service.fetch_logs(&self.execution_id).await;

        let mut inner = self.inner.write().await;
        match &result {
            Ok(text) => {
                inner.text = text.clone();
                inner.state = LogPanelState::Loaded;
            }
            Err(e) => {
                warn!("Failed to fetch logs for execution {}: {}", self.execution_id, e);
                inner.state = LogPanelState::Failed {
                    message: e.to_string(),
                };
            }
        }
        result
    }

    pub fn export_file_name(&self) -> String {
        let safe_id: String = self
            .execution_id
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("execution-{safe_id}-logs.txt")
    }

    /// 把内存中的文本写入 `dir`，不会重新获取
    pub async fn export(&self, dir: &Path) -> ConsoleResult<PathBuf> {
        let path = dir.join(self.export_file_name());
        let text = self.inner.read().await.text.clone();
        tokio::fs::write(&path, text.as_bytes())
            .await
            .map_err(|e| ConsoleError::Io(format!("写入日志文件失败 {}: {e}", path.display())))?;
        info!("Exported logs for execution {} to {}", self.execution_id, path.display());
        Ok(path)
    }
}

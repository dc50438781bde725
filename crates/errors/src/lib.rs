use serde::{Deserialize, Serialize};
use thiserror::Error;


/// 字段级校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("传输错误 [{resource}] {}: {message}", fmt_status(.status))]
    Transport {
        resource: String,
        status: Option<u16>,
        message: String,
    },
    #[error("数据验证失败 [{resource}]: {message}")]
    Validation {
        resource: String,
        status: Option<u16>,
        message: String,
        fields: Vec<FieldError>,
    },
    #[error("资源未找到: {resource}/{id}")]
    NotFound { resource: String, id: String },
    #[error("响应格式错误 [{resource}]: {message}")]
    Envelope { resource: String, message: String },
    #[error("未知资源: {0}")]
    UnknownResource(String),
    #[error("资源 {resource} 不支持操作: {action}")]
    UnsupportedAction { resource: String, action: String },
    #[error("当前状态不允许操作: {resource}/{id} {action}")]
    ActionNotPermitted {
        resource: String,
        id: String,
        action: String,
    },
    #[error("无效的请求: {0}")]
    InvalidRequest(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("文件错误: {0}")]
    Io(String),
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "无响应".to_string(),
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

impl ConsoleError {
    pub fn transport<R: Into<String>, M: Into<String>>(
        resource: R,
        status: Option<u16>,
        message: M,
    ) -> Self {
        Self::Transport {
            resource: resource.into(),
            status,
            message: message.into(),
        }
    }
    pub fn validation<R: Into<String>, M: Into<String>>(
        resource: R,
        status: Option<u16>,
        message: M,
        fields: Vec<FieldError>,
    ) -> Self {
        Self::Validation {
            resource: resource.into(),
            status,
            message: message.into(),
            fields,
        }
    }
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }
    pub fn envelope<R: Into<String>, M: Into<String>>(resource: R, message: M) -> Self {
        Self::Envelope {
            resource: resource.into(),
            message: message.into(),
        }
    }
    pub fn unsupported_action<R: Into<String>, A: Into<String>>(resource: R, action: A) -> Self {
        Self::UnsupportedAction {
            resource: resource.into(),
            action: action.into(),
        }
    }
    pub fn action_not_permitted<R: Into<String>, I: Into<String>, A: Into<String>>(
        resource: R,
        id: I,
        action: A,
    ) -> Self {
        Self::ActionNotPermitted {
            resource: resource.into(),
            id: id.into(),
            action: action.into(),
        }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ConsoleError::Transport { status, .. } | ConsoleError::Validation { status, .. } => {
                *status
            }
            ConsoleError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ConsoleError::Validation { fields, .. } => fields,
            _ => &[],
        }
    }

    /// Whether re-issuing the same call by hand can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConsoleError::Transport { status: None, .. } => true,
            ConsoleError::Transport {
                status: Some(code), ..
            } => *code >= 500,
            _ => false,
        }
    }

    pub fn user_message(&self) -> &str {
        match self {
            ConsoleError::NotFound { .. } => "请求的记录不存在",
            ConsoleError::Validation { .. } => "输入数据验证失败",
            ConsoleError::Envelope { .. } => "服务端响应格式异常",
            ConsoleError::UnsupportedAction { .. } => "该资源不支持此操作",
            ConsoleError::ActionNotPermitted { .. } => "当前状态不允许此操作",
            ConsoleError::Transport { status: None, .. } => "无法连接到服务端，请稍后重试",
            ConsoleError::Transport {
                status: Some(409), ..
            } => "操作与记录当前状态冲突，请刷新后重试",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        ConsoleError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(err: std::io::Error) -> Self {
        ConsoleError::Io(err.to_string())
    }
}

impl From<anyhow::Error> for ConsoleError {
    fn from(err: anyhow::Error) -> Self {
        ConsoleError::Configuration(err.to_string())
    }
}

//! 响应信封归一化
//!
//! 后端有时返回 `{data, meta}`，有时直接返回裸对象或裸数组。
//! 这里把所有形状统一成 [`ListResponse`] / [`SingleResponse`]。

use console_errors::{ConsoleError, ConsoleResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 调用方的操作类型，决定信封的解读方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    List,
    Single,
    Custom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    List(ListResponse<Value>),
    Single(SingleResponse<Value>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleResponse<T> {
    pub data: T,
}

impl ListResponse<Value> {
    pub fn into_typed<T: DeserializeOwned>(self, resource: &str) -> ConsoleResult<ListResponse<T>> {
        let data = self
            .data
            .into_iter()
            .map(|item| decode(resource, item))
            .collect::<ConsoleResult<Vec<T>>>()?;
        Ok(ListResponse {
            data,
            total: self.total,
        })
    }
}

impl SingleResponse<Value> {
    pub fn into_typed<T: DeserializeOwned>(self, resource: &str) -> ConsoleResult<SingleResponse<T>> {
        Ok(SingleResponse {
            data: decode(resource, self.data)?,
        })
    }
}

fn decode<T: DeserializeOwned>(resource: &str, value: Value) -> ConsoleResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ConsoleError::envelope(resource, format!("记录结构不匹配: {e}")))
}

pub fn normalize(kind: OperationKind, resource: &str, body: Value) -> ConsoleResult<Normalized> {
    match kind {
        OperationKind::List => normalize_list(resource, body).map(Normalized::List),
        OperationKind::Single => normalize_single(resource, body).map(Normalized::Single),
        OperationKind::Custom => Ok(Normalized::Single(normalize_custom(body))),
    }
}

/// `data` 取自 `body.data`，其次是裸数组，否则为空。
/// `total` 取自 `meta.pagination.total`，缺失时回退为条数。
pub fn normalize_list(resource: &str, body: Value) -> ConsoleResult<ListResponse<Value>> {
    let declared_total = body
        .pointer("/meta/pagination/total")
        .and_then(Value::as_u64);

    let data = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(ConsoleError::envelope(
                    resource,
                    format!("列表数据必须是数组，实际为 {}", type_name(&other)),
                ))
            }
        },
        _ => Vec::new(),
    };

    let total = declared_total.unwrap_or(data.len() as u64);
    Ok(ListResponse { data, total })
}

/// 单条记录操作：`data` 缺失或为 null 视为格式错误
pub fn normalize_single(resource: &str, body: Value) -> ConsoleResult<SingleResponse<Value>> {
    match body {
        Value::Null => Err(ConsoleError::envelope(resource, "响应体为空")),
        Value::Object(mut map) if map.contains_key("data") => match map.remove("data") {
            Some(Value::Null) | None => Err(ConsoleError::envelope(resource, "响应缺少 data 字段")),
            Some(data) => Ok(SingleResponse { data }),
        },
        data => Ok(SingleResponse { data }),
    }
}

/// 自定义调用允许空响应体（例如 204 的操作确认）
pub fn normalize_custom(body: Value) -> SingleResponse<Value> {
    match body {
        Value::Object(mut map) if map.contains_key("data") => SingleResponse {
            data: map.remove("data").unwrap_or(Value::Null),
        },
        data => SingleResponse { data },
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

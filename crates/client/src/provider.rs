//! 通用数据访问适配器
//!
//! 所有资源读写都经过 [`DataProvider`]。[`RestDataProvider`] 查协议表决定动词，
//! 用信封归一化处理响应，并把所有失败归类到同一套 [`ConsoleError`]。
//! 每个调用只发送一次，不做重试。

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use console_config::ApiConfig;
use console_domain::{DeletedRecord, ListQuery, Resource};
use console_errors::{ConsoleError, ConsoleResult, FieldError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::envelope::{
    normalize_custom, normalize_list, normalize_single, ListResponse, SingleResponse,
};
use crate::protocol::protocol_for;

/// 旁路调用的目标地址
#[derive(Debug, Clone, PartialEq)]
pub enum RequestTarget {
    /// 绝对地址，或相对于 API 根地址的路径
    Url(String),
    /// 逐段拼接到 API 根地址后，每段单独编码
    Segments(Vec<String>),
}

/// 旁路调用请求：绕过协议表的资源动词规则
#[derive(Debug, Clone, PartialEq)]
pub struct CustomRequest {
    pub target: RequestTarget,
    pub method: String,
    pub payload: Option<Value>,
    pub headers: BTreeMap<String, String>,
    /// 出错时用于标识来源，通常是资源名
    pub context: String,
}

impl CustomRequest {
    pub fn new<U: Into<String>, M: Into<String>>(url: U, method: M) -> Self {
        Self::with_target(RequestTarget::Url(url.into()), method)
    }

    /// 按路径段构造，段内的 `/` 等字符会被编码而不是拆开
    pub fn at_segments<M: Into<String>>(segments: Vec<String>, method: M) -> Self {
        Self::with_target(RequestTarget::Segments(segments), method)
    }

    fn with_target<M: Into<String>>(target: RequestTarget, method: M) -> Self {
        Self {
            target,
            method: method.into(),
            payload: None,
            headers: BTreeMap::new(),
            context: "custom".to_string(),
        }
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn context<C: Into<String>>(mut self, context: C) -> Self {
        self.context = context.into();
        self
    }
}

#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn list(&self, resource: Resource, query: &ListQuery) -> ConsoleResult<ListResponse<Value>>;

    async fn get(&self, resource: Resource, id: &str) -> ConsoleResult<SingleResponse<Value>>;

    async fn create(&self, resource: Resource, payload: &Value) -> ConsoleResult<SingleResponse<Value>>;

    async fn update(
        &self,
        resource: Resource,
        id: &str,
        payload: &Value,
    ) -> ConsoleResult<SingleResponse<Value>>;

    /// The backend does not echo the deleted record; only its id comes back.
    async fn delete(&self, resource: Resource, id: &str) -> ConsoleResult<SingleResponse<DeletedRecord>>;

    async fn custom(&self, request: CustomRequest) -> ConsoleResult<SingleResponse<Value>>;
}

/// 强类型包装
#[async_trait]
pub trait DataProviderExt: DataProvider {
    async fn list_as<T>(&self, resource: Resource, query: &ListQuery) -> ConsoleResult<ListResponse<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.list(resource, query).await?.into_typed(resource.as_str())
    }

    async fn get_as<T>(&self, resource: Resource, id: &str) -> ConsoleResult<SingleResponse<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.get(resource, id).await?.into_typed(resource.as_str())
    }
}

impl<P: DataProvider + ?Sized> DataProviderExt for P {}

/// 基于 REST 的适配器；除 HTTP 连接池外不持有状态
#[derive(Debug, Clone)]
pub struct RestDataProvider {
    base_url: Url,
    http_client: reqwest::Client,
}

impl RestDataProvider {
    pub fn new(config: &ApiConfig) -> ConsoleResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ConsoleError::config_error(format!("无效的 API 地址 {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConsoleError::config_error(format!(
                "API 地址不能作为基础路径: {}",
                config.base_url
            )));
        }

        let mut builder =
            reqwest::Client::builder().default_headers(header_map(&config.default_headers)?);
        // 0 表示不限制请求时长
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }
        let http_client = builder
            .build()
            .map_err(|e| ConsoleError::config_error(format!("创建 HTTP 客户端失败: {e}")))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> ConsoleResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ConsoleError::config_error(format!("API 地址不能作为基础路径: {}", self.base_url))
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        Ok(url)
    }

    fn resolve(&self, target: &RequestTarget) -> ConsoleResult<Url> {
        let target = match target {
            RequestTarget::Segments(segments) => return self.endpoint(segments.as_slice()),
            RequestTarget::Url(url) => url.as_str(),
        };
        let lowered = target.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            return Url::parse(target)
                .map_err(|e| ConsoleError::invalid_request(format!("无效的地址 {target}: {e}")));
        }
        let segments: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
        self.endpoint(&segments)
    }

    #[allow(clippy::too_many_arguments)]
    async fn send(
        &self,
        context: &str,
        lookup_id: Option<&str>,
        method: Method,
        url: Url,
        query: &[(String, String)],
        body: Option<&Value>,
        headers: &BTreeMap<String, String>,
    ) -> ConsoleResult<Value> {
        let text = self
            .send_raw(context, lookup_id, method, url, query, body, headers)
            .await?;
        parse_body(context, &text)
    }

    /// 只检查状态码，成功时返回原始响应文本
    #[allow(clippy::too_many_arguments)]
    async fn send_raw(
        &self,
        context: &str,
        lookup_id: Option<&str>,
        method: Method,
        url: Url,
        query: &[(String, String)],
        body: Option<&Value>,
        headers: &BTreeMap<String, String>,
    ) -> ConsoleResult<String> {
        debug!("{} {} [{}]", method, url, context);

        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .headers(header_map(headers)?);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Request {} {} failed to send: {}", method, url, e);
            ConsoleError::transport(context, None, format!("请求发送失败: {e}"))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ConsoleError::transport(context, Some(status.as_u16()), format!("读取响应失败: {e}"))
        })?;

        if !status.is_success() {
            warn!("Request {} {} returned HTTP {}", method, url, status);
            return Err(classify_failure(context, lookup_id, status, &text));
        }

        debug!("Request {} {} returned HTTP {}", method, url, status);
        Ok(text)
    }
}

#[async_trait]
impl DataProvider for RestDataProvider {
    async fn list(&self, resource: Resource, query: &ListQuery) -> ConsoleResult<ListResponse<Value>> {
        let url = self.endpoint(&[resource.as_str()])?;
        let body = self
            .send(
                resource.as_str(),
                None,
                Method::GET,
                url,
                &query.to_query_pairs(),
                None,
                &BTreeMap::new(),
            )
            .await?;
        normalize_list(resource.as_str(), body)
    }

    async fn get(&self, resource: Resource, id: &str) -> ConsoleResult<SingleResponse<Value>> {
        let url = self.endpoint(&[resource.as_str(), id])?;
        let body = self
            .send(
                resource.as_str(),
                Some(id),
                Method::GET,
                url,
                &[],
                None,
                &BTreeMap::new(),
            )
            .await?;
        normalize_single(resource.as_str(), body)
    }

    async fn create(&self, resource: Resource, payload: &Value) -> ConsoleResult<SingleResponse<Value>> {
        let url = self.endpoint(&[resource.as_str()])?;
        let body = self
            .send(
                resource.as_str(),
                None,
                Method::POST,
                url,
                &[],
                Some(payload),
                &BTreeMap::new(),
            )
            .await?;
        normalize_single(resource.as_str(), body)
    }

    async fn update(
        &self,
        resource: Resource,
        id: &str,
        payload: &Value,
    ) -> ConsoleResult<SingleResponse<Value>> {
        let method = protocol_for(resource).update_verb.method();
        let url = self.endpoint(&[resource.as_str(), id])?;
        let body = self
            .send(
                resource.as_str(),
                None,
                method,
                url,
                &[],
                Some(payload),
                &BTreeMap::new(),
            )
            .await?;
        normalize_single(resource.as_str(), body)
    }

    async fn delete(&self, resource: Resource, id: &str) -> ConsoleResult<SingleResponse<DeletedRecord>> {
        if !protocol_for(resource).can_delete {
            warn!("Refusing to delete {}/{}: resource is not deletable", resource, id);
            return Err(ConsoleError::transport(
                resource.as_str(),
                None,
                "该资源不支持删除",
            ));
        }

        // 删除响应体不做解析，服务端可能返回纯文本或空体
        let url = self.endpoint(&[resource.as_str(), id])?;
        self.send_raw(
            resource.as_str(),
            None,
            Method::DELETE,
            url,
            &[],
            None,
            &BTreeMap::new(),
        )
        .await?;

        Ok(SingleResponse {
            data: DeletedRecord { id: id.to_string() },
        })
    }

    async fn custom(&self, request: CustomRequest) -> ConsoleResult<SingleResponse<Value>> {
        let method_name = request.method.trim().to_ascii_uppercase();
        let method = Method::from_bytes(method_name.as_bytes()).map_err(|_| {
            ConsoleError::invalid_request(format!("无效的 HTTP 方法: {}", request.method))
        })?;
        let url = self.resolve(&request.target)?;

        let body = self
            .send(
                &request.context,
                None,
                method,
                url,
                &[],
                request.payload.as_ref(),
                &request.headers,
            )
            .await?;
        Ok(normalize_custom(body))
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> ConsoleResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ConsoleError::invalid_request(format!("无效的请求头名称 {name}: {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| ConsoleError::invalid_request(format!("无效的请求头 {name}: {e}")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn parse_body(context: &str, text: &str) -> ConsoleResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text)
        .map_err(|e| ConsoleError::envelope(context, format!("响应不是合法的 JSON: {e}")))
}

/// 非 2xx 响应的统一归类
pub(crate) fn classify_failure(
    context: &str,
    lookup_id: Option<&str>,
    status: StatusCode,
    text: &str,
) -> ConsoleError {
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = lookup_id {
            return ConsoleError::not_found(context, id);
        }
    }

    let body: Value = serde_json::from_str(text).unwrap_or(Value::Null);
    let message = server_message(&body, text).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("未知错误")
            .to_string()
    });

    if status.is_client_error() {
        let fields = extract_field_errors(&body);
        if !fields.is_empty() {
            return ConsoleError::validation(context, Some(status.as_u16()), message, fields);
        }
    }

    ConsoleError::transport(context, Some(status.as_u16()), message)
}

const MAX_RAW_MESSAGE_LEN: usize = 200;

fn server_message(body: &Value, raw: &str) -> Option<String> {
    let from_json = body
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .or_else(|| body.pointer("/error/message").and_then(Value::as_str));
    if let Some(message) = from_json {
        return Some(message.to_string());
    }

    let raw = raw.trim();
    if body.is_null() && !raw.is_empty() && raw.len() <= MAX_RAW_MESSAGE_LEN {
        return Some(raw.to_string());
    }
    None
}

fn extract_field_errors(body: &Value) -> Vec<FieldError> {
    const CANDIDATES: [&str; 5] = [
        "/errors",
        "/fieldErrors",
        "/details",
        "/error/details",
        "/error/errors",
    ];

    CANDIDATES
        .iter()
        .filter_map(|pointer| body.pointer(pointer))
        .map(field_errors_from)
        .find(|fields| !fields.is_empty())
        .unwrap_or_default()
}

// Accepts `[{field|path, message}]` or `{field: message | [message]}`.
fn field_errors_from(value: &Value) -> Vec<FieldError> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let field = item
                    .get("field")
                    .or_else(|| item.get("path"))
                    .and_then(Value::as_str)?;
                let message = item
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("无效");
                Some(FieldError::new(field, message))
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .flat_map(|(field, messages)| match messages {
                Value::String(message) => vec![FieldError::new(field.as_str(), message.as_str())],
                Value::Array(list) => list
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|message| FieldError::new(field.as_str(), message))
                    .collect(),
                _ => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

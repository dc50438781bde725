use std::path::{Path, PathBuf};
use std::sync::Arc;

use console_config::{ConsoleConfig, LogsConfig};
use console_domain::{
    derive_timeline, validate_payload, DeletedRecord, Execution, Job, ListQuery, Resource,
    Schedule, TaskDefinition, TimelineEvent,
};
use console_errors::{ConsoleError, ConsoleResult};
use serde_json::Value;
use tracing::debug;

use crate::actions::{ActionDispatcher, ActionOutcome, Confirm};
use crate::envelope::{ListResponse, SingleResponse};
use crate::invalidation::{CacheKey, Invalidation, InvalidationBus, QueryCache};
use crate::logs::{LogService, LogViewer};
use crate::protocol::SideAction;
use crate::provider::{DataProvider, DataProviderExt, RestDataProvider};

/// 控制台客户端：适配器、操作分发、失效广播和日志服务的组合
#[derive(Clone)]
pub struct ConsoleClient {
    provider: Arc<dyn DataProvider>,
    bus: InvalidationBus,
    cache: QueryCache,
    actions: ActionDispatcher,
    logs: LogService,
    export_dir: PathBuf,
}

impl ConsoleClient {
    pub fn from_config(config: &ConsoleConfig) -> ConsoleResult<Self> {
        let provider = RestDataProvider::new(&config.api)?;
        Ok(Self::with_provider(Arc::new(provider), &config.logs))
    }

    pub fn with_provider(provider: Arc<dyn DataProvider>, logs: &LogsConfig) -> Self {
        let bus = InvalidationBus::new();
        Self {
            actions: ActionDispatcher::new(Arc::clone(&provider), bus.clone()),
            logs: LogService::new(Arc::clone(&provider), logs.placeholder.clone()),
            cache: QueryCache::new(),
            export_dir: PathBuf::from(&logs.export_dir),
            provider,
            bus,
        }
    }

    pub fn provider(&self) -> &dyn DataProvider {
        self.provider.as_ref()
    }

    pub fn bus(&self) -> &InvalidationBus {
        &self.bus
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn actions(&self) -> &ActionDispatcher {
        &self.actions
    }

    pub fn logs(&self) -> &LogService {
        &self.logs
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn log_viewer<S: Into<String>>(&self, execution_id: S) -> LogViewer {
        LogViewer::new(self.logs.clone(), execution_id)
    }

    pub async fn list(&self, resource: Resource, query: &ListQuery) -> ConsoleResult<ListResponse<Value>> {
        let response = self.provider.list(resource, query).await?;
        let key = CacheKey::List {
            resource,
            query: query.to_query_pairs(),
        };
        self.cache.insert(key, serde_json::to_value(&response)?).await;
        Ok(response)
    }

    pub async fn get(&self, resource: Resource, id: &str) -> ConsoleResult<SingleResponse<Value>> {
        let response = self.provider.get(resource, id).await?;
        self.cache
            .insert(record_key(resource, id), response.data.clone())
            .await;
        Ok(response)
    }

    /// 命中缓存时不发请求
    pub async fn cached_get(&self, resource: Resource, id: &str) -> ConsoleResult<SingleResponse<Value>> {
        if let Some(data) = self.cache.get(&record_key(resource, id)).await {
            debug!("Cache hit for {}/{}", resource, id);
            return Ok(SingleResponse { data });
        }
        self.get(resource, id).await
    }

    /// 先做表单预校验，失败时不发请求
    pub async fn create(&self, resource: Resource, payload: &Value) -> ConsoleResult<SingleResponse<Value>> {
        validate_payload(resource, payload, false)?;
        let response = self.provider.create(resource, payload).await?;
        self.invalidate(Invalidation::List { resource }).await;
        Ok(response)
    }

    pub async fn update(
        &self,
        resource: Resource,
        id: &str,
        payload: &Value,
    ) -> ConsoleResult<SingleResponse<Value>> {
        validate_payload(resource, payload, true)?;
        let response = self.provider.update(resource, id, payload).await?;
        self.invalidate_record(resource, id).await;
        Ok(response)
    }

    pub async fn delete(&self, resource: Resource, id: &str) -> ConsoleResult<SingleResponse<DeletedRecord>> {
        let response = self.provider.delete(resource, id).await?;
        self.invalidate_record(resource, id).await;
        Ok(response)
    }

    pub async fn task(&self, id: &str) -> ConsoleResult<TaskDefinition> {
        let response: SingleResponse<TaskDefinition> = self.provider.get_as(Resource::Tasks, id).await?;
        Ok(response.data)
    }

    /// 作业详情页引用的任务，优先读缓存
    pub async fn linked_task(&self, task_id: &str) -> ConsoleResult<TaskDefinition> {
        let response: SingleResponse<TaskDefinition> = self
            .cached_get(Resource::Tasks, task_id)
            .await?
            .into_typed(Resource::Tasks.as_str())?;
        Ok(response.data)
    }

    pub async fn execution(&self, id: &str) -> ConsoleResult<Execution> {
        let response: SingleResponse<Execution> = self.provider.get_as(Resource::Executions, id).await?;
        Ok(response.data)
    }

    pub async fn job(&self, id: &str) -> ConsoleResult<Job> {
        let response: SingleResponse<Job> = self.provider.get_as(Resource::Jobs, id).await?;
        Ok(response.data)
    }

    pub async fn schedule(&self, id: &str) -> ConsoleResult<Schedule> {
        let response: SingleResponse<Schedule> = self.provider.get_as(Resource::Schedules, id).await?;
        Ok(response.data)
    }

    /// 旁路操作；受状态约束的操作先重新获取记录再判断是否允许
    pub async fn run_action<C: Confirm + ?Sized>(
        &self,
        resource: Resource,
        id: &str,
        action: SideAction,
        confirm: &C,
    ) -> ConsoleResult<ActionOutcome> {
        let outcome = match (resource, action) {
            (Resource::Executions, SideAction::Cancel) => {
                let execution = self.execution(id).await?;
                self.actions.cancel_execution(&execution, confirm).await?
            }
            (Resource::Executions, SideAction::Retry) => {
                let execution = self.execution(id).await?;
                self.actions.retry_execution(&execution, confirm).await?
            }
            (Resource::Jobs, SideAction::Cancel) => {
                let job = self.job(id).await?;
                self.actions.cancel_job(&job, confirm).await?
            }
            (Resource::Jobs, SideAction::Retry) => {
                let job = self.job(id).await?;
                self.actions.retry_job(&job, confirm).await?
            }
            (Resource::Schedules, SideAction::Trigger) => {
                let schedule = self.schedule(id).await?;
                self.actions.trigger_schedule(&schedule, confirm).await?
            }
            (Resource::Schedules, SideAction::Enable) => {
                self.actions.set_schedule_enabled(id, true).await?
            }
            (Resource::Schedules, SideAction::Disable) => {
                self.actions.set_schedule_enabled(id, false).await?
            }
            _ => self.actions.perform(resource, id, action, confirm).await?,
        };

        if outcome.is_completed() && action != SideAction::Logs {
            self.evict_record(resource, id).await;
        }
        Ok(outcome)
    }

    pub async fn timeline(&self, resource: Resource, id: &str) -> ConsoleResult<Vec<TimelineEvent>> {
        match resource {
            Resource::Executions => Ok(derive_timeline(&self.execution(id).await?)),
            Resource::Jobs => Ok(derive_timeline(&self.job(id).await?)),
            other => Err(ConsoleError::unsupported_action(other.as_str(), "timeline")),
        }
    }

    async fn invalidate(&self, invalidation: Invalidation) {
        self.cache.apply(&invalidation).await;
        self.bus.publish(invalidation);
    }

    async fn invalidate_record(&self, resource: Resource, id: &str) {
        for invalidation in Invalidation::for_record(resource, id) {
            self.invalidate(invalidation).await;
        }
    }

    // The dispatcher has already broadcast; only the local cache needs updating.
    async fn evict_record(&self, resource: Resource, id: &str) {
        for invalidation in Invalidation::for_record(resource, id) {
            self.cache.apply(&invalidation).await;
        }
    }
}

fn record_key(resource: Resource, id: &str) -> CacheKey {
    CacheKey::Record {
        resource,
        id: id.to_string(),
    }
}

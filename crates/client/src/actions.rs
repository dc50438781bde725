//! 记录级旁路操作（取消、重试、触发等）
//!
//! 需要确认的操作在用户拒绝时不会发出任何请求；操作失败时不发布失效信号，
//! 记录保持原样，由用户决定是否再次执行。

use std::sync::Arc;

use async_trait::async_trait;
use console_domain::{Execution, Job, Resource, Schedule};
use console_errors::{ConsoleError, ConsoleResult};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::invalidation::InvalidationBus;
use crate::protocol::{protocol_for, SideAction};
use crate::provider::{CustomRequest, DataProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
}

impl ConfirmPrompt {
    pub fn for_action(resource: Resource, action: SideAction) -> Self {
        let noun = resource.singular();
        Self {
            title: format!("{} {}", capitalize(action.as_str()), capitalize(noun)),
            message: format!("Are you sure you want to {} this {}?", action.as_str(), noun),
        }
    }
}

/// 操作确认的交互边界
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// 非交互模式：总是确认
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

#[async_trait]
impl Confirm for AlwaysConfirm {
    async fn confirm(&self, _prompt: &ConfirmPrompt) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Completed { data: Value, message: String },
    Declined,
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ActionOutcome::Completed { .. })
    }
}

#[derive(Clone)]
pub struct ActionDispatcher {
    provider: Arc<dyn DataProvider>,
    bus: InvalidationBus,
}

impl ActionDispatcher {
    pub fn new(provider: Arc<dyn DataProvider>, bus: InvalidationBus) -> Self {
        Self { provider, bus }
    }

    pub async fn perform<C: Confirm + ?Sized>(
        &self,
        resource: Resource,
        id: &str,
        action: SideAction,
        confirm: &C,
    ) -> ConsoleResult<ActionOutcome> {
        let segments = protocol_for(resource).action_segments(id, action)?;

        if action.requires_confirmation() {
            let prompt = ConfirmPrompt::for_action(resource, action);
            if !confirm.confirm(&prompt).await {
                info!("{} {}/{} declined by operator", action, resource, id);
                return Ok(ActionOutcome::Declined);
            }
        }

        let request = CustomRequest::at_segments(segments, "POST")
            .payload(json!({}))
            .context(resource.as_str());

        let response = self.provider.custom(request).await.map_err(|e| {
            warn!("{} {}/{} failed: {}", action, resource, id, e);
            e
        })?;

        if action != SideAction::Logs {
            self.bus.publish_record(resource, id);
        }
        info!("{} {}/{} succeeded", action, resource, id);

        Ok(ActionOutcome::Completed {
            data: response.data,
            message: success_message(resource, action),
        })
    }

    pub async fn cancel_execution<C: Confirm + ?Sized>(
        &self,
        execution: &Execution,
        confirm: &C,
    ) -> ConsoleResult<ActionOutcome> {
        if !execution.capabilities().cancel {
            return Err(not_permitted(Resource::Executions, &execution.id, SideAction::Cancel));
        }
        self.perform(Resource::Executions, &execution.id, SideAction::Cancel, confirm)
            .await
    }

    pub async fn retry_execution<C: Confirm + ?Sized>(
        &self,
        execution: &Execution,
        confirm: &C,
    ) -> ConsoleResult<ActionOutcome> {
        if !execution.capabilities().retry {
            return Err(not_permitted(Resource::Executions, &execution.id, SideAction::Retry));
        }
        self.perform(Resource::Executions, &execution.id, SideAction::Retry, confirm)
            .await
    }

    pub async fn cancel_job<C: Confirm + ?Sized>(
        &self,
        job: &Job,
        confirm: &C,
    ) -> ConsoleResult<ActionOutcome> {
        if !job.can_cancel() {
            return Err(not_permitted(Resource::Jobs, &job.id, SideAction::Cancel));
        }
        self.perform(Resource::Jobs, &job.id, SideAction::Cancel, confirm)
            .await
    }

    pub async fn retry_job<C: Confirm + ?Sized>(
        &self,
        job: &Job,
        confirm: &C,
    ) -> ConsoleResult<ActionOutcome> {
        if !job.can_retry() {
            return Err(not_permitted(Resource::Jobs, &job.id, SideAction::Retry));
        }
        self.perform(Resource::Jobs, &job.id, SideAction::Retry, confirm)
            .await
    }

    pub async fn trigger_schedule<C: Confirm + ?Sized>(
        &self,
        schedule: &Schedule,
        confirm: &C,
    ) -> ConsoleResult<ActionOutcome> {
        if !schedule.can_trigger() {
            return Err(not_permitted(Resource::Schedules, &schedule.id, SideAction::Trigger));
        }
        self.perform(Resource::Schedules, &schedule.id, SideAction::Trigger, confirm)
            .await
    }

    pub async fn set_schedule_enabled(
        &self,
        schedule_id: &str,
        enabled: bool,
    ) -> ConsoleResult<ActionOutcome> {
        let action = if enabled {
            SideAction::Enable
        } else {
            SideAction::Disable
        };
        self.perform(Resource::Schedules, schedule_id, action, &AlwaysConfirm)
            .await
    }
}

fn not_permitted(resource: Resource, id: &str, action: SideAction) -> ConsoleError {
    ConsoleError::action_not_permitted(resource.as_str(), id, action.as_str())
}

fn success_message(resource: Resource, action: SideAction) -> String {
    let noun = capitalize(resource.singular());
    match action {
        SideAction::Cancel => format!("{noun} cancelled successfully"),
        SideAction::Retry => format!("{noun} retry initiated successfully"),
        SideAction::Logs => format!("{noun} logs fetched"),
        SideAction::Trigger => format!("{noun} triggered successfully"),
        SideAction::Enable => format!("{noun} enabled successfully"),
        SideAction::Disable => format!("{noun} disabled successfully"),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use console_errors::ConsoleResult;

use crate::entities::{
    ApiId, ExecutionPriority, ExecutionStatus, JobPriority, JobStatus, TaskSpec,
};
use crate::resource::Resource;
use crate::validation;

/// 任务创建请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    pub definition: TaskSpec,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> ConsoleResult<()> {
        validation::into_result(
            Resource::Tasks,
            validation::collect([
                validation::validate_task_name(&self.name),
                validation::validate_version(&self.version),
                validation::validate_command(&self.definition.command),
            ]),
        )
    }
}

/// 任务更新请求；任务使用整体替换语义，调用方应提交完整记录
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<TaskSpec>,
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> ConsoleResult<()> {
        let mut checks = Vec::new();
        if let Some(name) = &self.name {
            checks.push(validation::validate_task_name(name));
        }
        if let Some(version) = &self.version {
            checks.push(validation::validate_version(version));
        }
        if let Some(definition) = &self.definition {
            checks.push(validation::validate_command(&definition.command));
        }
        validation::into_result(Resource::Tasks, validation::collect(checks))
    }
}

/// 执行创建请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExecutionRequest {
    pub task_id: ApiId,
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ExecutionPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl CreateExecutionRequest {
    pub fn validate(&self) -> ConsoleResult<()> {
        validation::into_result(
            Resource::Executions,
            validation::collect([validation::validate_required("taskId", &self.task_id)]),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExecutionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExecutionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// 作业创建请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub task_id: ApiId,
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<JobPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_destinations: Option<Vec<serde_json::Value>>,
}

impl CreateJobRequest {
    pub fn validate(&self) -> ConsoleResult<()> {
        let mut checks = vec![validation::validate_required("taskId", &self.task_id)];
        if let Some(max_retries) = self.max_retries {
            checks.push(validation::validate_max_retries(max_retries));
        }
        validation::into_result(Resource::Jobs, validation::collect(checks))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<JobPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl UpdateJobRequest {
    pub fn validate(&self) -> ConsoleResult<()> {
        let checks = self.max_retries.map(validation::validate_max_retries);
        validation::into_result(Resource::Jobs, validation::collect(checks))
    }
}

/// 调度创建请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub task_id: ApiId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cron_expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default)]
    pub task_input: serde_json::Value,
}

impl CreateScheduleRequest {
    pub fn validate(&self) -> ConsoleResult<()> {
        let mut checks = vec![
            validation::validate_required("name", &self.name),
            validation::validate_required("taskId", &self.task_id),
            validation::validate_cron_expression(&self.cron_expression),
        ];
        if let Some(timezone) = &self.timezone {
            checks.push(validation::validate_timezone(timezone));
        }
        validation::into_result(Resource::Schedules, validation::collect(checks))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_input: Option<serde_json::Value>,
}

impl UpdateScheduleRequest {
    pub fn validate(&self) -> ConsoleResult<()> {
        let mut checks = Vec::new();
        if let Some(name) = &self.name {
            checks.push(validation::validate_required("name", name));
        }
        if let Some(expr) = &self.cron_expression {
            checks.push(validation::validate_cron_expression(expr));
        }
        if let Some(timezone) = &self.timezone {
            checks.push(validation::validate_timezone(timezone));
        }
        validation::into_result(Resource::Schedules, validation::collect(checks))
    }
}

/// 按资源类型校验一个原始 JSON 载荷
///
/// 载荷无法反序列化为对应的请求类型时同样视为校验失败。
pub fn validate_payload(
    resource: Resource,
    payload: &serde_json::Value,
    is_update: bool,
) -> ConsoleResult<()> {
    fn decode<T: serde::de::DeserializeOwned>(
        resource: Resource,
        payload: &serde_json::Value,
    ) -> ConsoleResult<T> {
        serde_json::from_value(payload.clone()).map_err(|e| {
            console_errors::ConsoleError::validation(resource.as_str(), None, e.to_string(), vec![])
        })
    }

    match (resource, is_update) {
        (Resource::Tasks, false) => decode::<CreateTaskRequest>(resource, payload)?.validate(),
        (Resource::Tasks, true) => decode::<UpdateTaskRequest>(resource, payload)?.validate(),
        (Resource::Executions, false) => {
            decode::<CreateExecutionRequest>(resource, payload)?.validate()
        }
        (Resource::Executions, true) => {
            decode::<UpdateExecutionRequest>(resource, payload).map(|_| ())
        }
        (Resource::Jobs, false) => decode::<CreateJobRequest>(resource, payload)?.validate(),
        (Resource::Jobs, true) => decode::<UpdateJobRequest>(resource, payload)?.validate(),
        (Resource::Schedules, false) => {
            decode::<CreateScheduleRequest>(resource, payload)?.validate()
        }
        (Resource::Schedules, true) => {
            decode::<UpdateScheduleRequest>(resource, payload)?.validate()
        }
    }
}

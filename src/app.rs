use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use console_client::{ActionOutcome, AlwaysConfirm, ConsoleClient, SideAction};
use console_config::{ConsoleConfig, LogLevel, OutputFormat};
use console_domain::{
    derive_timeline, Execution, Job, ListQuery, Pagination, Resource, Schedule, SortOrder,
    TaskDefinition,
};
use console_errors::{ConsoleError, ConsoleResult};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::prompt::StdinConfirm;

const RESOURCES: [&str; 4] = ["tasks", "executions", "jobs", "schedules"];
const RUNNABLE_RESOURCES: [&str; 2] = ["executions", "jobs"];

pub fn build_cli() -> Command {
    Command::new("ratchet-console")
        .version(env!("CARGO_PKG_VERSION"))
        .about("任务执行平台运维控制台")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径")
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别")
                .value_parser(PossibleValuesParser::new(
                    LogLevel::ALL.iter().map(LogLevel::as_str),
                ))
                .global(true),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式")
                .value_parser(PossibleValuesParser::new(
                    OutputFormat::ALL.iter().map(OutputFormat::as_str),
                ))
                .global(true),
        )
        .subcommand(
            Command::new("list")
                .about("分页列出资源记录")
                .arg(resource_arg(&RESOURCES))
                .arg(
                    Arg::new("page")
                        .long("page")
                        .value_name("N")
                        .help("页码，从1开始")
                        .value_parser(value_parser!(u32).range(1..)),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_name("N")
                        .help("每页条数")
                        .value_parser(value_parser!(u32).range(1..)),
                )
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .value_name("FIELD=VALUE")
                        .help("过滤条件，可重复")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .value_name("[-]FIELD")
                        .help("排序字段，前缀'-'表示降序"),
                ),
        )
        .subcommand(
            Command::new("get")
                .about("获取单条记录")
                .arg(resource_arg(&RESOURCES))
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("显示单条记录的摘要")
                .arg(resource_arg(&RESOURCES))
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("create")
                .about("创建记录")
                .arg(resource_arg(&RESOURCES))
                .arg(data_arg()),
        )
        .subcommand(
            Command::new("update")
                .about("更新记录")
                .arg(resource_arg(&RESOURCES))
                .arg(id_arg())
                .arg(data_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("删除记录")
                .arg(resource_arg(&RESOURCES))
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("cancel")
                .about("取消执行或作业")
                .arg(resource_arg(&RUNNABLE_RESOURCES))
                .arg(id_arg())
                .arg(yes_arg()),
        )
        .subcommand(
            Command::new("retry")
                .about("重试失败的执行或作业")
                .arg(resource_arg(&RUNNABLE_RESOURCES))
                .arg(id_arg())
                .arg(yes_arg()),
        )
        .subcommand(
            Command::new("trigger")
                .about("立即触发调度")
                .arg(id_arg())
                .arg(yes_arg()),
        )
        .subcommand(Command::new("enable").about("启用调度").arg(id_arg()))
        .subcommand(Command::new("disable").about("停用调度").arg(id_arg()))
        .subcommand(
            Command::new("logs")
                .about("查看执行日志")
                .arg(id_arg())
                .arg(
                    Arg::new("export")
                        .long("export")
                        .value_name("DIR")
                        .help("导出日志到目录，省略时使用配置中的目录")
                        .num_args(0..=1),
                ),
        )
        .subcommand(
            Command::new("timeline")
                .about("显示执行或作业的生命周期")
                .arg(resource_arg(&RUNNABLE_RESOURCES))
                .arg(id_arg()),
        )
}

fn resource_arg(allowed: &'static [&'static str]) -> Arg {
    Arg::new("resource")
        .required(true)
        .value_name("RESOURCE")
        .help("资源类型")
        .value_parser(PossibleValuesParser::new(allowed.iter().copied()))
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).value_name("ID").help("记录ID")
}

fn data_arg() -> Arg {
    Arg::new("data")
        .short('d')
        .long("data")
        .required(true)
        .value_name("JSON|@FILE")
        .help("JSON数据，或以'@'开头的文件路径")
}

fn yes_arg() -> Arg {
    Arg::new("yes")
        .short('y')
        .long("yes")
        .help("跳过确认")
        .action(ArgAction::SetTrue)
}

/// 解析后的控制台命令
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    List {
        resource: Resource,
        query: ListQuery,
    },
    Get {
        resource: Resource,
        id: String,
    },
    Show {
        resource: Resource,
        id: String,
    },
    Create {
        resource: Resource,
        payload: Value,
    },
    Update {
        resource: Resource,
        id: String,
        payload: Value,
    },
    Delete {
        resource: Resource,
        id: String,
    },
    Action {
        resource: Resource,
        id: String,
        action: SideAction,
        assume_yes: bool,
    },
    Logs {
        id: String,
        /// `Some(None)` 表示导出到配置的默认目录
        export: Option<Option<PathBuf>>,
    },
    Timeline {
        resource: Resource,
        id: String,
    },
}

impl ConsoleCommand {
    pub fn from_matches(matches: &ArgMatches) -> ConsoleResult<Self> {
        let (name, sub) = matches
            .subcommand()
            .ok_or_else(|| ConsoleError::invalid_request("缺少子命令"))?;

        let command = match name {
            "list" => ConsoleCommand::List {
                resource: resource_of(sub)?,
                query: list_query(sub)?,
            },
            "get" => ConsoleCommand::Get {
                resource: resource_of(sub)?,
                id: id_of(sub)?,
            },
            "show" => ConsoleCommand::Show {
                resource: resource_of(sub)?,
                id: id_of(sub)?,
            },
            "create" => ConsoleCommand::Create {
                resource: resource_of(sub)?,
                payload: payload_of(sub)?,
            },
            "update" => ConsoleCommand::Update {
                resource: resource_of(sub)?,
                id: id_of(sub)?,
                payload: payload_of(sub)?,
            },
            "delete" => ConsoleCommand::Delete {
                resource: resource_of(sub)?,
                id: id_of(sub)?,
            },
            "cancel" | "retry" => ConsoleCommand::Action {
                resource: resource_of(sub)?,
                id: id_of(sub)?,
                action: name.parse()?,
                assume_yes: sub.get_flag("yes"),
            },
            "trigger" => ConsoleCommand::Action {
                resource: Resource::Schedules,
                id: id_of(sub)?,
                action: SideAction::Trigger,
                assume_yes: sub.get_flag("yes"),
            },
            "enable" | "disable" => ConsoleCommand::Action {
                resource: Resource::Schedules,
                id: id_of(sub)?,
                action: name.parse()?,
                assume_yes: false,
            },
            "logs" => ConsoleCommand::Logs {
                id: id_of(sub)?,
                export: sub
                    .contains_id("export")
                    .then(|| sub.get_one::<String>("export").map(PathBuf::from)),
            },
            "timeline" => ConsoleCommand::Timeline {
                resource: resource_of(sub)?,
                id: id_of(sub)?,
            },
            other => {
                return Err(ConsoleError::invalid_request(format!("未知子命令: {other}")));
            }
        };

        Ok(command)
    }
}

fn resource_of(matches: &ArgMatches) -> ConsoleResult<Resource> {
    matches
        .get_one::<String>("resource")
        .ok_or_else(|| ConsoleError::invalid_request("缺少资源类型"))?
        .parse()
}

fn id_of(matches: &ArgMatches) -> ConsoleResult<String> {
    let id = matches
        .get_one::<String>("id")
        .map(|id| id.trim().to_string())
        .unwrap_or_default();
    if id.is_empty() {
        return Err(ConsoleError::invalid_request("记录ID不能为空"));
    }
    Ok(id)
}

fn list_query(matches: &ArgMatches) -> ConsoleResult<ListQuery> {
    let mut query = ListQuery::new();

    let page = matches.get_one::<u32>("page").copied();
    let limit = matches.get_one::<u32>("limit").copied();
    if page.is_some() || limit.is_some() {
        let defaults = Pagination::default();
        query = query.page(page.unwrap_or(defaults.page), limit.unwrap_or(defaults.limit));
    }

    for raw in matches.get_many::<String>("filter").into_iter().flatten() {
        let (field, value) = parse_filter(raw)?;
        query = query.filter(field, value);
    }

    if let Some(raw) = matches.get_one::<String>("sort") {
        let (field, order) = parse_sort(raw)?;
        query = query.sort_by(field, order);
    }

    Ok(query)
}

fn parse_filter(raw: &str) -> ConsoleResult<(&str, &str)> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value.trim())),
        _ => Err(ConsoleError::invalid_request(format!(
            "过滤条件格式应为 FIELD=VALUE: {raw}"
        ))),
    }
}

fn parse_sort(raw: &str) -> ConsoleResult<(&str, SortOrder)> {
    let raw = raw.trim();
    let (field, order) = match raw.strip_prefix('-') {
        Some(field) => (field, SortOrder::Desc),
        None => (raw, SortOrder::Asc),
    };
    if field.is_empty() {
        return Err(ConsoleError::invalid_request("排序字段不能为空"));
    }
    Ok((field, order))
}

/// `--data` 接受内联JSON，或 `@path` 形式的文件
fn payload_of(matches: &ArgMatches) -> ConsoleResult<Value> {
    let raw = matches
        .get_one::<String>("data")
        .ok_or_else(|| ConsoleError::invalid_request("缺少 --data 参数"))?;
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => raw.clone(),
    };
    let payload: Value = serde_json::from_str(&text)?;
    if !payload.is_object() {
        return Err(ConsoleError::invalid_request("--data 必须是JSON对象"));
    }
    Ok(payload)
}

/// 控制台应用
pub struct Application {
    client: ConsoleClient,
}

impl Application {
    pub fn new(config: ConsoleConfig) -> ConsoleResult<Self> {
        let client = ConsoleClient::from_config(&config)?;
        Ok(Self { client })
    }

    pub async fn run(&self, command: ConsoleCommand) -> ConsoleResult<()> {
        debug!("执行命令: {:?}", command);

        match command {
            ConsoleCommand::List { resource, query } => {
                let response = self.client.list(resource, &query).await?;
                print_json(&response)?;
            }
            ConsoleCommand::Get { resource, id } => {
                let response = self.client.get(resource, &id).await?;
                print_json(&response.data)?;
            }
            ConsoleCommand::Show { resource, id } => {
                let lines = match resource {
                    Resource::Tasks => summarize_task(&self.client.task(&id).await?),
                    Resource::Executions => summarize_execution(&self.client.execution(&id).await?),
                    Resource::Jobs => {
                        let job = self.client.job(&id).await?;
                        // 关联任务只用于补充展示，获取失败不影响作业详情
                        let task = match self.client.linked_task(&job.task_id).await {
                            Ok(task) => Some(task),
                            Err(e) => {
                                warn!("获取作业 {} 关联的任务 {} 失败: {}", job.id, job.task_id, e);
                                None
                            }
                        };
                        summarize_job(&job, task.as_ref())
                    }
                    Resource::Schedules => summarize_schedule(&self.client.schedule(&id).await?),
                };
                for line in lines {
                    println!("{line}");
                }
            }
            ConsoleCommand::Create { resource, payload } => {
                let response = self.client.create(resource, &payload).await?;
                info!("{} 创建成功", resource.singular());
                print_json(&response.data)?;
            }
            ConsoleCommand::Update {
                resource,
                id,
                payload,
            } => {
                let response = self.client.update(resource, &id, &payload).await?;
                info!("{} {} 更新成功", resource.singular(), id);
                print_json(&response.data)?;
            }
            ConsoleCommand::Delete { resource, id } => {
                let response = self.client.delete(resource, &id).await?;
                info!("{} {} 已删除", resource.singular(), id);
                print_json(&response.data)?;
            }
            ConsoleCommand::Action {
                resource,
                id,
                action,
                assume_yes,
            } => {
                let outcome = if assume_yes {
                    self.client
                        .run_action(resource, &id, action, &AlwaysConfirm)
                        .await?
                } else {
                    self.client
                        .run_action(resource, &id, action, &StdinConfirm)
                        .await?
                };
                match outcome {
                    ActionOutcome::Completed { data, message } => {
                        eprintln!("{message}");
                        print_json(&data)?;
                    }
                    ActionOutcome::Declined => {
                        eprintln!("操作已取消");
                    }
                }
            }
            ConsoleCommand::Logs { id, export } => {
                let viewer = self.client.log_viewer(id);
                viewer.refresh().await?;
                eprintln!("{}", viewer.title());
                match export {
                    Some(dir) => {
                        let dir = dir.unwrap_or_else(|| self.client.export_dir().to_path_buf());
                        let path = viewer.export(&dir).await?;
                        eprintln!("日志已导出到 {}", path.display());
                    }
                    None => println!("{}", viewer.text().await),
                }
            }
            ConsoleCommand::Timeline { resource, id } => {
                for event in self.client.timeline(resource, &id).await? {
                    println!("{event}");
                }
            }
        }

        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> ConsoleResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn action_list(actions: &[(&'static str, bool)]) -> String {
    let enabled: Vec<&str> = actions
        .iter()
        .filter(|(_, allowed)| *allowed)
        .map(|(name, _)| *name)
        .collect();
    if enabled.is_empty() {
        "none".to_string()
    } else {
        enabled.join(", ")
    }
}

fn summarize_task(task: &TaskDefinition) -> Vec<String> {
    let mut lines = vec![
        task.entity_description(),
        format!("Enabled:   {}", yes_no(task.enabled)),
        format!("Command:   {}", task.definition.command),
    ];
    if let Some(timeout) = task.definition.timeout {
        lines.push(format!("Timeout:   {timeout}s"));
    }
    if let Some(description) = &task.description {
        lines.push(format!("Notes:     {description}"));
    }
    lines
}

fn summarize_execution(execution: &Execution) -> Vec<String> {
    let capabilities = execution.capabilities();
    let mut lines = vec![
        execution.entity_description(),
        format!("Status:    {}", execution.badge().label),
        format!("Priority:  {}", execution.effective_priority().as_str()),
        format!(
            "Progress:  {:.0}% ({:?})",
            execution.progress_percent(),
            execution.progress_state()
        ),
        format!("Duration:  {}", execution.duration_display()),
        format!(
            "Actions:   {}",
            action_list(&[
                ("cancel", capabilities.cancel),
                ("retry", capabilities.retry),
                ("logs", capabilities.view_logs),
            ])
        ),
    ];
    if let Some(message) = &execution.error_message {
        lines.push(format!("Error:     {message}"));
    }
    lines.push("Timeline:".to_string());
    lines.extend(derive_timeline(execution).iter().map(|event| format!("  {event}")));
    lines
}

fn summarize_job(job: &Job, task: Option<&TaskDefinition>) -> Vec<String> {
    let mut lines = vec![
        job.entity_description(),
        format!("Status:    {}", job.badge().label),
        format!("Priority:  {}", job.priority.as_str()),
        format!(
            "Retries:   {}/{} ({:.0}%)",
            job.retry_count,
            job.max_retries,
            job.retry_progress()
        ),
        format!(
            "Actions:   {}",
            action_list(&[("cancel", job.can_cancel()), ("retry", job.can_retry())])
        ),
    ];
    if let Some(message) = &job.error_message {
        lines.push(format!("Error:     {message}"));
    }
    lines.push("Timeline:".to_string());
    lines.extend(derive_timeline(job).iter().map(|event| format!("  {event}")));

    if let Some(task) = task {
        lines.push(format!("Task:      {} v{}", task.name, task.version));
        lines.push(format!(
            "  Description: {}",
            task.description.as_deref().unwrap_or("No description")
        ));
        lines.push(format!("  Enabled:     {}", yes_no(task.enabled)));
        lines.push("  Expected input schema:".to_string());
        match serde_json::to_string_pretty(&task.definition.input_schema) {
            Ok(schema) => lines.extend(schema.lines().map(|line| format!("    {line}"))),
            Err(e) => lines.push(format!("    <{e}>")),
        }
    }
    lines
}

fn summarize_schedule(schedule: &Schedule) -> Vec<String> {
    vec![
        schedule.entity_description(),
        format!("Enabled:   {}", yes_no(schedule.enabled)),
        format!("Timezone:  {}", schedule.effective_timezone()),
        format!("Next run:  {}", schedule.next_run_display()),
        format!("Last run:  {}", schedule.last_run_display()),
        format!(
            "Actions:   {}",
            action_list(&[
                ("trigger", schedule.can_trigger()),
                ("enable", !schedule.enabled),
                ("disable", schedule.enabled),
            ])
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn parse(args: &[&str]) -> ConsoleResult<ConsoleCommand> {
        let mut argv = vec!["ratchet-console"];
        argv.extend_from_slice(args);
        let matches = build_cli().try_get_matches_from(argv).unwrap();
        ConsoleCommand::from_matches(&matches)
    }

    #[test]
    fn test_list_builds_query() {
        let command = parse(&[
            "list",
            "executions",
            "--page",
            "2",
            "--filter",
            "status=failed",
            "--filter",
            "taskId=t1",
            "--sort",
            "-queuedAt",
        ])
        .unwrap();

        let expected = ListQuery::new()
            .page(2, 10)
            .filter("status", "failed")
            .filter("taskId", "t1")
            .sort_by("queuedAt", SortOrder::Desc);
        assert_eq!(
            command,
            ConsoleCommand::List {
                resource: Resource::Executions,
                query: expected,
            }
        );
    }

    #[test]
    fn test_list_without_options_has_no_pagination() {
        match parse(&["list", "tasks"]).unwrap() {
            ConsoleCommand::List { query, .. } => assert_eq!(query, ListQuery::new()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_filter_is_rejected() {
        let err = parse(&["list", "jobs", "--filter", "status"]).unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidRequest(_)));
    }

    #[test]
    fn test_unknown_resource_is_rejected_by_parser() {
        let result = build_cli().try_get_matches_from(["ratchet-console", "get", "widgets", "w1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cancel_is_limited_to_runnable_resources() {
        let result =
            build_cli().try_get_matches_from(["ratchet-console", "cancel", "schedules", "s1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_action_commands() {
        assert_eq!(
            parse(&["retry", "jobs", "j1", "--yes"]).unwrap(),
            ConsoleCommand::Action {
                resource: Resource::Jobs,
                id: "j1".to_string(),
                action: SideAction::Retry,
                assume_yes: true,
            }
        );
        assert_eq!(
            parse(&["disable", "s1"]).unwrap(),
            ConsoleCommand::Action {
                resource: Resource::Schedules,
                id: "s1".to_string(),
                action: SideAction::Disable,
                assume_yes: false,
            }
        );
        assert_eq!(
            parse(&["trigger", "s1"]).unwrap(),
            ConsoleCommand::Action {
                resource: Resource::Schedules,
                id: "s1".to_string(),
                action: SideAction::Trigger,
                assume_yes: false,
            }
        );
    }

    #[test]
    fn test_inline_payload() {
        let command = parse(&["create", "schedules", "--data", r#"{"name":"nightly"}"#]).unwrap();
        assert_eq!(
            command,
            ConsoleCommand::Create {
                resource: Resource::Schedules,
                payload: json!({"name": "nightly"}),
            }
        );
    }

    #[test]
    fn test_payload_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"enabled": false}}"#).unwrap();
        let arg = format!("@{}", file.path().display());

        let command = parse(&["update", "tasks", "t1", "-d", &arg]).unwrap();
        assert_eq!(
            command,
            ConsoleCommand::Update {
                resource: Resource::Tasks,
                id: "t1".to_string(),
                payload: json!({"enabled": false}),
            }
        );
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        let err = parse(&["create", "tasks", "--data", "[1, 2]"]).unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidRequest(_)));

        let err = parse(&["create", "tasks", "--data", "{not json"]).unwrap_err();
        assert!(matches!(err, ConsoleError::Serialization(_)));
    }

    #[test]
    fn test_logs_export_forms() {
        assert_eq!(
            parse(&["logs", "e1"]).unwrap(),
            ConsoleCommand::Logs {
                id: "e1".to_string(),
                export: None,
            }
        );
        assert_eq!(
            parse(&["logs", "e1", "--export"]).unwrap(),
            ConsoleCommand::Logs {
                id: "e1".to_string(),
                export: Some(None),
            }
        );
        assert_eq!(
            parse(&["logs", "e1", "--export", "/tmp/out"]).unwrap(),
            ConsoleCommand::Logs {
                id: "e1".to_string(),
                export: Some(Some(PathBuf::from("/tmp/out"))),
            }
        );
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from([
                "ratchet-console",
                "get",
                "tasks",
                "t1",
                "--log-level",
                "debug",
            ])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("log-level").map(String::as_str),
            Some("debug")
        );
    }

    #[test]
    fn test_execution_summary() {
        let execution: Execution = serde_json::from_value(json!({
            "id": "e1",
            "taskId": "t1",
            "status": "running",
            "progress": 42.4,
            "duration": 1500,
            "canCancel": true,
            "queuedAt": "2024-01-01T00:00:00Z",
            "startedAt": "2024-01-01T00:00:05Z"
        }))
        .unwrap();

        let lines = summarize_execution(&execution);
        assert!(lines.contains(&"Status:    RUNNING".to_string()));
        assert!(lines.contains(&"Priority:  normal".to_string()));
        assert!(lines.contains(&"Progress:  42% (Active)".to_string()));
        assert!(lines.contains(&"Duration:  2s".to_string()));
        assert!(lines.contains(&"Actions:   cancel, logs".to_string()));
        assert_eq!(lines.last().unwrap(), "  2024-01-01T00:00:05+00:00  Execution Started");
    }

    #[test]
    fn test_job_summary_shows_exhausted_retries() {
        let job: Job = serde_json::from_value(json!({
            "id": "j1",
            "taskId": "t1",
            "status": "FAILED",
            "retryCount": 3,
            "maxRetries": 3,
            "queuedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        let lines = summarize_job(&job, None);
        assert!(lines.contains(&"Status:    RETRIES EXHAUSTED".to_string()));
        assert!(lines.contains(&"Retries:   3/3 (100%)".to_string()));
        assert!(lines.contains(&"Actions:   retry".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("Task:")));
    }

    #[test]
    fn test_job_summary_includes_linked_task() {
        let job: Job = serde_json::from_value(json!({
            "id": "j2",
            "taskId": "t1",
            "status": "QUEUED",
            "queuedAt": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let task: TaskDefinition = serde_json::from_value(json!({
            "id": "t1",
            "name": "resize",
            "version": "1.2.0",
            "enabled": false,
            "definition": {
                "command": "resize.sh",
                "inputSchema": {
                    "type": "object",
                    "required": ["path"]
                }
            }
        }))
        .unwrap();

        let lines = summarize_job(&job, Some(&task));
        assert!(lines.contains(&"Task:      resize v1.2.0".to_string()));
        assert!(lines.contains(&"  Description: No description".to_string()));
        assert!(lines.contains(&"  Enabled:     no".to_string()));
        assert!(lines.contains(&"      \"type\": \"object\",".to_string()));
        assert!(lines.contains(&"        \"path\"".to_string()));
    }

    #[test]
    fn test_disabled_schedule_summary() {
        let schedule: Schedule = serde_json::from_value(json!({
            "id": "s1",
            "taskId": "t1",
            "name": "nightly",
            "cronExpression": "0 0 * * *",
            "enabled": false,
            "nextRun": "2024-01-02T00:00:00Z"
        }))
        .unwrap();

        let lines = summarize_schedule(&schedule);
        assert!(lines.contains(&"Timezone:  UTC".to_string()));
        assert!(lines.contains(&"Next run:  Not scheduled".to_string()));
        assert!(lines.contains(&"Last run:  Never".to_string()));
        assert!(lines.contains(&"Actions:   enable".to_string()));
    }
}

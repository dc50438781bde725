//! 表单预校验
//!
//! 在请求发出前拦截明显无效的输入。服务端仍是最终校验方，
//! 这里只做语法层面的检查，不计算 cron 的触发时间。

use std::str::FromStr;

use console_errors::{ConsoleError, ConsoleResult, FieldError};

use cron::Schedule;

use crate::resource::Resource;

pub const MAX_JOB_RETRIES: u32 = 10;

/// 任务名称：只允许字母、数字、下划线和连字符
pub fn validate_task_name(name: &str) -> Result<(), FieldError> {
    if name.is_empty() {
        return Err(FieldError::new("name", "任务名称不能为空"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(FieldError::new(
            "name",
            "任务名称只能包含字母、数字、下划线和连字符",
        ));
    }
    Ok(())
}

/// 语义化版本 MAJOR.MINOR.PATCH，不允许前导零
pub fn validate_version(version: &str) -> Result<(), FieldError> {
    if version.is_empty() {
        return Err(FieldError::new("version", "版本号不能为空"));
    }
    let parts: Vec<&str> = version.split('.').collect();
    let well_formed = parts.len() == 3
        && parts.iter().all(|part| {
            !part.is_empty()
                && part.chars().all(|c| c.is_ascii_digit())
                && (part.len() == 1 || !part.starts_with('0'))
        });
    if !well_formed {
        return Err(FieldError::new(
            "version",
            "版本号必须符合语义化版本格式 (例如 1.0.0)",
        ));
    }
    Ok(())
}

pub fn validate_command(command: &str) -> Result<(), FieldError> {
    if command.trim().is_empty() {
        return Err(FieldError::new("definition.command", "命令不能为空"));
    }
    Ok(())
}

pub fn validate_max_retries(max_retries: u32) -> Result<(), FieldError> {
    if max_retries > MAX_JOB_RETRIES {
        return Err(FieldError::new(
            "maxRetries",
            format!("最大重试次数必须在 0 到 {MAX_JOB_RETRIES} 之间"),
        ));
    }
    Ok(())
}

pub fn validate_required(field: &str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, format!("{field} 不能为空")));
    }
    Ok(())
}

/// 五段式 cron 表达式（分 时 日 月 周）的语法检查
///
/// `cron` crate 要求秒字段在前且星期从 1 (周日) 计数，
/// 这里补上秒字段并把数字星期换成英文缩写后交给它解析。
pub fn validate_cron_expression(expr: &str) -> Result<(), FieldError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.is_empty() {
        return Err(FieldError::new("cronExpression", "CRON表达式不能为空"));
    }
    if fields.len() != 5 {
        return Err(FieldError::new(
            "cronExpression",
            format!("CRON表达式需要5个字段，实际为{}个", fields.len()),
        ));
    }

    let normalized = format!(
        "0 {} {} {} {} {}",
        fields[0],
        fields[1],
        fields[2],
        fields[3],
        translate_day_of_week(fields[4])
    );
    Schedule::from_str(&normalized).map_err(|e| {
        FieldError::new("cronExpression", format!("CRON表达式无效: {e}"))
    })?;
    Ok(())
}

fn translate_day_of_week(field: &str) -> String {
    field
        .split(',')
        .map(translate_day_of_week_item)
        .collect::<Vec<_>>()
        .join(",")
}

// 7 也表示周日；不带步长的 `x-7` 拆成 `x-SAT,SUN`
fn translate_day_of_week_item(item: &str) -> String {
    let (base, step) = match item.split_once('/') {
        Some((base, step)) => (base, Some(step)),
        None => (item, None),
    };
    let translated = match base.split_once('-') {
        Some((from, "7")) if step.is_none() => format!("{}-SAT,SUN", day_name(from)),
        Some((from, "7")) => format!("{}-SAT", day_name(from)),
        Some((from, to)) => format!("{}-{}", day_name(from), day_name(to)),
        None => day_name(base).to_string(),
    };
    match step {
        Some(step) => format!("{translated}/{step}"),
        None => translated,
    }
}

fn day_name(atom: &str) -> &str {
    match atom {
        "0" | "7" => "SUN",
        "1" => "MON",
        "2" => "TUE",
        "3" => "WED",
        "4" => "THU",
        "5" => "FRI",
        "6" => "SAT",
        other => other,
    }
}

/// IANA 时区名只做形状检查
pub fn validate_timezone(timezone: &str) -> Result<(), FieldError> {
    if timezone.is_empty() || timezone.chars().any(char::is_whitespace) {
        return Err(FieldError::new("timezone", "时区格式无效"));
    }
    Ok(())
}

/// 汇总检查结果
pub fn collect<I>(checks: I) -> Vec<FieldError>
where
    I: IntoIterator<Item = Result<(), FieldError>>,
{
    checks.into_iter().filter_map(Result::err).collect()
}

pub fn into_result(resource: Resource, fields: Vec<FieldError>) -> ConsoleResult<()> {
    if fields.is_empty() {
        return Ok(());
    }
    let message = fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(ConsoleError::validation(
        resource.as_str(),
        None,
        message,
        fields,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_name() {
        assert!(validate_task_name("demo_task-1").is_ok());
        assert!(validate_task_name("").is_err());
        assert!(validate_task_name("has space").is_err());
        assert!(validate_task_name("dots.are.bad").is_err());
    }

    #[test]
    fn test_version() {
        assert!(validate_version("1.0.0").is_ok());
        assert!(validate_version("0.10.3").is_ok());
        assert!(validate_version("1.0").is_err());
        assert!(validate_version("01.0.0").is_err());
        assert!(validate_version("1.0.0-beta").is_err());
        assert!(validate_version("1..0").is_err());
    }

    #[test]
    fn test_max_retries_bounds() {
        assert!(validate_max_retries(0).is_ok());
        assert!(validate_max_retries(10).is_ok());
        assert!(validate_max_retries(11).is_err());
    }

    #[test]
    fn test_cron_expression_accepts_common_patterns() {
        for expr in [
            "0 9 * * MON-FRI",
            "0 0 * * 0",
            "*/15 * * * *",
            "0 */6 * * *",
            "0 0 1 * *",
            "5,10,15 0-6/2 * JAN *",
            "30 2 * * 1-7",
            "0 0 * * 5,6,0",
        ] {
            assert!(validate_cron_expression(expr).is_ok(), "{expr}");
        }
    }

    #[test]
    fn test_cron_expression_rejects_malformed() {
        assert!(validate_cron_expression("").is_err());
        assert!(validate_cron_expression("0 0 * *").is_err());
        assert!(validate_cron_expression("0 0 0 * * *").is_err());
        assert!(validate_cron_expression("0 0 * * 1-").is_err());
        assert!(validate_cron_expression("*/ 0 * * *").is_err());
        assert!(validate_cron_expression("0 0 * * M0N").is_err());
    }

    #[test]
    fn test_cron_expression_rejects_out_of_range_values() {
        for expr in [
            "99 * * * *",
            "0 0 32 * *",
            "0 0 * 13 *",
            "FOO * * * *",
            "0 24 * * *",
            "0 0 * * 8",
        ] {
            let err = validate_cron_expression(expr).unwrap_err();
            assert_eq!(err.field, "cronExpression", "{expr}");
        }
    }

    #[test]
    fn test_collect_and_into_result() {
        let fields = collect([
            validate_task_name("ok"),
            validate_version("x"),
            validate_command(""),
        ]);
        assert_eq!(fields.len(), 2);

        let err = into_result(Resource::Tasks, fields).unwrap_err();
        match err {
            ConsoleError::Validation {
                resource,
                status,
                fields,
                ..
            } => {
                assert_eq!(resource, "tasks");
                assert_eq!(status, None);
                assert_eq!(fields[0].field, "version");
                assert_eq!(fields[1].field, "definition.command");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(into_result(Resource::Tasks, vec![]).is_ok());
    }
}

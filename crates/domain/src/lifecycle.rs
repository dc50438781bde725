//! 执行与作业的生命周期模型
//!
//! 纯函数：由服务端返回的记录推导展示状态、可用操作和时间线。
//! 状态与时间戳以服务端为准，这里不做任何纠正。

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{
    Execution, ExecutionPriority, ExecutionStatus, Job, JobStatus, Schedule,
};

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// 状态的展示语义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusTone {
    Waiting,
    InProgress,
    Success,
    Failure,
    Inactive,
    Retrying,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBadge {
    pub label: String,
    pub tone: StatusTone,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Cancelled)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ExecutionStatus::Pending | ExecutionStatus::Running)
    }

    /// `failed -> pending` is the retry re-entry; `failed` never advances on its own.
    pub fn allowed_transitions(&self) -> &'static [ExecutionStatus] {
        match self {
            ExecutionStatus::Pending => &[ExecutionStatus::Running, ExecutionStatus::Cancelled],
            ExecutionStatus::Running => &[
                ExecutionStatus::Completed,
                ExecutionStatus::Failed,
                ExecutionStatus::Cancelled,
            ],
            ExecutionStatus::Failed => &[ExecutionStatus::Pending],
            ExecutionStatus::Completed | ExecutionStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: ExecutionStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            ExecutionStatus::Pending => StatusTone::Waiting,
            ExecutionStatus::Running => StatusTone::InProgress,
            ExecutionStatus::Completed => StatusTone::Success,
            ExecutionStatus::Failed => StatusTone::Failure,
            ExecutionStatus::Cancelled => StatusTone::Inactive,
        }
    }

    pub fn badge(&self) -> StatusBadge {
        StatusBadge {
            label: self.as_str().to_uppercase(),
            tone: self.tone(),
        }
    }
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn allowed_transitions(&self) -> &'static [JobStatus] {
        match self {
            JobStatus::Queued => &[JobStatus::Processing, JobStatus::Cancelled],
            JobStatus::Processing => &[
                JobStatus::Completed,
                JobStatus::Failed,
                JobStatus::Retrying,
                JobStatus::Cancelled,
            ],
            JobStatus::Retrying => &[JobStatus::Processing],
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            JobStatus::Queued => StatusTone::Waiting,
            JobStatus::Processing => StatusTone::InProgress,
            JobStatus::Completed => StatusTone::Success,
            JobStatus::Failed => StatusTone::Failure,
            JobStatus::Cancelled => StatusTone::Inactive,
            JobStatus::Retrying => StatusTone::Retrying,
        }
    }
}

/// 执行记录当前允许的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionCapabilities {
    pub cancel: bool,
    pub retry: bool,
    pub view_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressState {
    Success,
    Exception,
    Active,
}

impl Execution {
    /// Status is necessary but not sufficient: the server flag must also be set.
    /// A missing flag counts as false.
    pub fn capabilities(&self) -> ExecutionCapabilities {
        ExecutionCapabilities {
            cancel: self.status.is_active() && self.can_cancel.unwrap_or(false),
            retry: self.status == ExecutionStatus::Failed && self.can_retry.unwrap_or(false),
            view_logs: true,
        }
    }

    pub fn badge(&self) -> StatusBadge {
        self.status.badge()
    }

    pub fn effective_priority(&self) -> ExecutionPriority {
        self.priority.unwrap_or_default()
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress.unwrap_or(0.0).clamp(0.0, 100.0)
    }

    pub fn progress_state(&self) -> ProgressState {
        if self.progress_percent() >= 100.0 {
            ProgressState::Success
        } else if self.status == ExecutionStatus::Failed {
            ProgressState::Exception
        } else {
            ProgressState::Active
        }
    }

    pub fn duration_display(&self) -> String {
        match self.duration {
            Some(ms) if ms > 0 => format!("{}s", (ms as f64 / 1000.0).round() as u64),
            _ => "N/A".to_string(),
        }
    }
}

impl Job {
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count >= self.max_retries
    }

    /// `0 <= retryCount <= maxRetries <= 10`; enforced by the backend, only checked here.
    pub fn retry_bounds_hold(&self) -> bool {
        self.retry_count <= self.max_retries
            && self.max_retries <= crate::validation::MAX_JOB_RETRIES
    }

    pub fn can_cancel(&self) -> bool {
        matches!(self.status, JobStatus::Queued | JobStatus::Processing)
    }

    /// Jobs carry no server capability flags; a manual retry is offered only once failed.
    pub fn can_retry(&self) -> bool {
        self.status == JobStatus::Failed
    }

    pub fn retry_progress(&self) -> f64 {
        if self.max_retries == 0 {
            0.0
        } else {
            (self.retry_count as f64 / self.max_retries as f64 * 100.0).min(100.0)
        }
    }

    pub fn badge(&self) -> StatusBadge {
        if self.status == JobStatus::Failed && self.retries_exhausted() {
            return StatusBadge {
                label: "RETRIES EXHAUSTED".to_string(),
                tone: StatusTone::Failure,
            };
        }
        StatusBadge {
            label: self.status.as_str().to_string(),
            tone: self.status.tone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndOutcome {
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineEventKind {
    Queued,
    Started,
    LastAttempt,
    Ended(EndOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub kind: TimelineEventKind,
    pub label: String,
    pub at: DateTime<Utc>,
}

impl fmt::Display for TimelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.at.to_rfc3339(), self.label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleStamps {
    pub queued_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// 可以推导时间线的记录
pub trait TimelineSource {
    fn subject(&self) -> &'static str;
    fn lifecycle_stamps(&self) -> LifecycleStamps;
    fn end_outcome(&self) -> EndOutcome;
}

impl TimelineSource for Execution {
    fn subject(&self) -> &'static str {
        "Execution"
    }

    fn lifecycle_stamps(&self) -> LifecycleStamps {
        LifecycleStamps {
            queued_at: Some(self.queued_at),
            started_at: self.started_at,
            last_attempt_at: None,
            completed_at: self.completed_at,
        }
    }

    fn end_outcome(&self) -> EndOutcome {
        match self.status {
            ExecutionStatus::Completed => EndOutcome::Completed,
            ExecutionStatus::Cancelled => EndOutcome::Cancelled,
            _ => EndOutcome::Failed,
        }
    }
}

impl TimelineSource for Job {
    fn subject(&self) -> &'static str {
        "Job"
    }

    fn lifecycle_stamps(&self) -> LifecycleStamps {
        LifecycleStamps {
            queued_at: Some(self.queued_at),
            started_at: self.started_at,
            last_attempt_at: self.last_attempt_at,
            completed_at: self.completed_at,
        }
    }

    fn end_outcome(&self) -> EndOutcome {
        match self.status {
            JobStatus::Completed => EndOutcome::Completed,
            JobStatus::Cancelled => EndOutcome::Cancelled,
            _ => EndOutcome::Failed,
        }
    }
}

/// Order is fixed (queued, started, last attempt, ended) and never derived from
/// comparing timestamps; out-of-order server values are emitted as-is.
pub fn derive_timeline<S: TimelineSource + ?Sized>(source: &S) -> Vec<TimelineEvent> {
    let stamps = source.lifecycle_stamps();
    let subject = source.subject();
    let outcome = source.end_outcome();

    let slots = [
        (TimelineEventKind::Queued, stamps.queued_at),
        (TimelineEventKind::Started, stamps.started_at),
        (TimelineEventKind::LastAttempt, stamps.last_attempt_at),
        (TimelineEventKind::Ended(outcome), stamps.completed_at),
    ];

    slots
        .into_iter()
        .filter_map(|(kind, at)| {
            at.map(|at| TimelineEvent {
                kind,
                label: timeline_label(subject, kind),
                at,
            })
        })
        .collect()
}

fn timeline_label(subject: &str, kind: TimelineEventKind) -> String {
    match kind {
        TimelineEventKind::Queued => format!("{subject} Queued"),
        TimelineEventKind::Started => format!("{subject} Started"),
        TimelineEventKind::LastAttempt => "Last Attempt".to_string(),
        TimelineEventKind::Ended(EndOutcome::Completed) => format!("{subject} Completed"),
        TimelineEventKind::Ended(EndOutcome::Failed) => format!("{subject} Failed"),
        TimelineEventKind::Ended(EndOutcome::Cancelled) => format!("{subject} Cancelled"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextRun {
    NotScheduled,
    At(DateTime<Utc>),
}

impl fmt::Display for NextRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextRun::NotScheduled => f.write_str("Not scheduled"),
            NextRun::At(at) => f.write_str(&at.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastRun {
    Never,
    At(DateTime<Utc>),
}

impl fmt::Display for LastRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastRun::Never => f.write_str("Never"),
            LastRun::At(at) => f.write_str(&at.to_rfc3339()),
        }
    }
}

impl Schedule {
    /// A disabled schedule is never shown as scheduled, whatever `nextRun` says.
    pub fn next_run_display(&self) -> NextRun {
        match (self.enabled, self.next_run) {
            (true, Some(at)) => NextRun::At(at),
            _ => NextRun::NotScheduled,
        }
    }

    pub fn last_run_display(&self) -> LastRun {
        self.last_run.map_or(LastRun::Never, LastRun::At)
    }

    pub fn effective_timezone(&self) -> &str {
        self.timezone
            .as_deref()
            .filter(|tz| !tz.is_empty())
            .unwrap_or(DEFAULT_TIMEZONE)
    }

    pub fn can_trigger(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    fn execution(status: ExecutionStatus) -> Execution {
        Execution {
            id: "e1".to_string(),
            task_id: "t1".to_string(),
            status,
            input: json!({}),
            output: None,
            error_message: None,
            error_details: None,
            progress: None,
            priority: None,
            queued_at: ts(1),
            scheduled_for: None,
            started_at: None,
            completed_at: None,
            duration: None,
            can_cancel: None,
            can_retry: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn job(status: JobStatus, retry_count: u32, max_retries: u32) -> Job {
        Job {
            id: "j1".to_string(),
            task_id: "t1".to_string(),
            status,
            priority: Default::default(),
            input: json!({}),
            output: None,
            error_message: None,
            retry_count,
            max_retries,
            queued_at: ts(1),
            scheduled_for: None,
            started_at: None,
            last_attempt_at: None,
            completed_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_execution_state_machine() {
        use ExecutionStatus::*;
        assert!(Pending.can_transition_to(Running));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Running.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Running));
        assert!(!Pending.can_transition_to(Completed));

        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Failed.is_terminal());
    }

    #[test]
    fn test_job_state_machine() {
        use JobStatus::*;
        assert!(Processing.can_transition_to(Retrying));
        assert!(Retrying.can_transition_to(Processing));
        assert!(Queued.can_transition_to(Cancelled));
        assert!(!Retrying.can_transition_to(Completed));
        assert!(!Failed.can_transition_to(Queued));
        assert!(Failed.is_terminal());
    }

    #[test]
    fn test_capabilities_require_server_flags() {
        // status alone would permit both actions; flags are absent or false
        let mut running = execution(ExecutionStatus::Running);
        assert!(!running.capabilities().cancel);
        running.can_cancel = Some(false);
        assert!(!running.capabilities().cancel);
        running.can_cancel = Some(true);
        assert!(running.capabilities().cancel);

        let mut failed = execution(ExecutionStatus::Failed);
        failed.can_retry = Some(false);
        assert!(!failed.capabilities().retry);
        failed.can_retry = Some(true);
        assert!(failed.capabilities().retry);
        assert!(failed.capabilities().view_logs);
    }

    #[test]
    fn test_capabilities_require_matching_status() {
        for status in [
            ExecutionStatus::Completed,
            ExecutionStatus::Failed,
            ExecutionStatus::Cancelled,
        ] {
            let mut record = execution(status);
            record.can_cancel = Some(true);
            assert!(!record.capabilities().cancel, "{status:?}");
        }
        for status in [
            ExecutionStatus::Pending,
            ExecutionStatus::Running,
            ExecutionStatus::Completed,
            ExecutionStatus::Cancelled,
        ] {
            let mut record = execution(status);
            record.can_retry = Some(true);
            assert!(!record.capabilities().retry, "{status:?}");
        }
    }

    #[test]
    fn test_execution_badge_and_progress() {
        let mut record = execution(ExecutionStatus::Failed);
        assert_eq!(record.badge().label, "FAILED");
        assert_eq!(record.badge().tone, StatusTone::Failure);
        assert_eq!(record.progress_state(), ProgressState::Exception);

        record.progress = Some(100.0);
        assert_eq!(record.progress_state(), ProgressState::Success);

        let pending = execution(ExecutionStatus::Pending);
        assert_eq!(pending.progress_state(), ProgressState::Active);
        assert_eq!(pending.progress_percent(), 0.0);
        assert_eq!(pending.effective_priority(), ExecutionPriority::Normal);
    }

    #[test]
    fn test_duration_display() {
        let mut record = execution(ExecutionStatus::Completed);
        assert_eq!(record.duration_display(), "N/A");
        record.duration = Some(1_499);
        assert_eq!(record.duration_display(), "1s");
        record.duration = Some(2_500);
        assert_eq!(record.duration_display(), "3s");
    }

    #[test]
    fn test_job_retries_exhausted_badge() {
        let exhausted = job(JobStatus::Failed, 3, 3);
        assert!(exhausted.retries_exhausted());
        assert!(exhausted.retry_bounds_hold());
        assert_eq!(exhausted.badge().label, "RETRIES EXHAUSTED");

        let failed_with_budget = job(JobStatus::Failed, 1, 3);
        assert_eq!(failed_with_budget.badge().label, "FAILED");

        let retrying = job(JobStatus::Retrying, 2, 3);
        assert_eq!(retrying.badge().tone, StatusTone::Retrying);
    }

    #[test]
    fn test_job_retry_bounds() {
        assert!(job(JobStatus::Queued, 0, 0).retry_bounds_hold());
        assert!(!job(JobStatus::Failed, 4, 3).retry_bounds_hold());
        assert!(!job(JobStatus::Queued, 0, 11).retry_bounds_hold());
        assert_eq!(job(JobStatus::Queued, 0, 0).retry_progress(), 0.0);
        assert_eq!(job(JobStatus::Retrying, 1, 4).retry_progress(), 25.0);
    }

    #[test]
    fn test_job_cancel_only_before_completion() {
        assert!(job(JobStatus::Queued, 0, 1).can_cancel());
        assert!(job(JobStatus::Processing, 0, 1).can_cancel());
        assert!(!job(JobStatus::Retrying, 0, 1).can_cancel());
        assert!(!job(JobStatus::Completed, 0, 1).can_cancel());
        assert!(job(JobStatus::Failed, 1, 1).can_retry());
        assert!(!job(JobStatus::Retrying, 1, 2).can_retry());
    }

    #[test]
    fn test_timeline_keeps_definitional_order_for_out_of_order_stamps() {
        let mut record = execution(ExecutionStatus::Completed);
        record.queued_at = ts(2);
        record.completed_at = Some(ts(1));

        let timeline = derive_timeline(&record);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].kind, TimelineEventKind::Queued);
        assert_eq!(timeline[0].at, ts(2));
        assert_eq!(
            timeline[1].kind,
            TimelineEventKind::Ended(EndOutcome::Completed)
        );
        assert_eq!(timeline[1].at, ts(1));
        assert_eq!(timeline[1].label, "Execution Completed");
    }

    #[test]
    fn test_job_timeline_includes_last_attempt() {
        let mut record = job(JobStatus::Failed, 2, 2);
        record.started_at = Some(ts(2));
        record.last_attempt_at = Some(ts(3));
        record.completed_at = Some(ts(4));

        let kinds: Vec<TimelineEventKind> =
            derive_timeline(&record).into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TimelineEventKind::Queued,
                TimelineEventKind::Started,
                TimelineEventKind::LastAttempt,
                TimelineEventKind::Ended(EndOutcome::Failed),
            ]
        );
    }

    #[test]
    fn test_cancelled_timeline_label() {
        let mut record = job(JobStatus::Cancelled, 0, 1);
        record.completed_at = Some(ts(2));
        let timeline = derive_timeline(&record);
        assert_eq!(timeline.last().unwrap().label, "Job Cancelled");
    }

    #[test]
    fn test_schedule_display_rules() {
        let mut schedule: Schedule = serde_json::from_value(json!({
            "id": "s1",
            "taskId": "t1",
            "name": "nightly",
            "cronExpression": "0 0 * * *",
            "enabled": false,
            "nextRun": "2024-01-02T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(schedule.next_run_display(), NextRun::NotScheduled);
        assert_eq!(schedule.next_run_display().to_string(), "Not scheduled");
        assert_eq!(schedule.last_run_display(), LastRun::Never);
        assert_eq!(schedule.effective_timezone(), "UTC");
        assert!(!schedule.can_trigger());

        schedule.enabled = true;
        schedule.timezone = Some("Asia/Shanghai".to_string());
        assert_eq!(schedule.next_run_display(), NextRun::At(ts(2)));
        assert_eq!(schedule.effective_timezone(), "Asia/Shanghai");
        assert!(schedule.can_trigger());
    }
}

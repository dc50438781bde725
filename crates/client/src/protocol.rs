//! 资源协议表：每种资源的更新动词、删除能力和旁路操作

use std::fmt;
use std::str::FromStr;

use console_domain::Resource;
use console_errors::{ConsoleError, ConsoleResult};
use reqwest::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateVerb {
    /// 整体替换 (PUT)
    Replace,
    /// 部分更新 (PATCH)
    Merge,
}

impl UpdateVerb {
    pub fn method(&self) -> Method {
        match self {
            UpdateVerb::Replace => Method::PUT,
            UpdateVerb::Merge => Method::PATCH,
        }
    }
}

/// 非 CRUD 的记录级操作，统一以 POST 发送
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideAction {
    Cancel,
    Retry,
    Logs,
    Trigger,
    Enable,
    Disable,
}

impl SideAction {
    pub const ALL: [SideAction; 6] = [
        SideAction::Cancel,
        SideAction::Retry,
        SideAction::Logs,
        SideAction::Trigger,
        SideAction::Enable,
        SideAction::Disable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SideAction::Cancel => "cancel",
            SideAction::Retry => "retry",
            SideAction::Logs => "logs",
            SideAction::Trigger => "trigger",
            SideAction::Enable => "enable",
            SideAction::Disable => "disable",
        }
    }

    /// Repeating a retry or trigger enqueues another run.
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, SideAction::Retry | SideAction::Trigger)
    }

    /// Cancel is destructive; the non-idempotent ones create new runs.
    pub fn requires_confirmation(&self) -> bool {
        *self == SideAction::Cancel || !self.is_idempotent()
    }
}

impl fmt::Display for SideAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SideAction {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SideAction::ALL
            .into_iter()
            .find(|action| action.as_str() == wanted)
            .ok_or_else(|| ConsoleError::invalid_request(format!("未知操作: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceProtocol {
    pub resource: Resource,
    pub update_verb: UpdateVerb,
    pub can_delete: bool,
    pub actions: &'static [SideAction],
}

impl ResourceProtocol {
    pub fn supports(&self, action: SideAction) -> bool {
        self.actions.contains(&action)
    }

    pub fn ensure_supports(&self, action: SideAction) -> ConsoleResult<()> {
        if self.supports(action) {
            Ok(())
        } else {
            Err(ConsoleError::unsupported_action(
                self.resource.as_str(),
                action.as_str(),
            ))
        }
    }

    /// `[resource, id, action]` path segments, relative to the API root.
    /// The id stays a single segment even if it contains `/`.
    pub fn action_segments(&self, id: &str, action: SideAction) -> ConsoleResult<Vec<String>> {
        self.ensure_supports(action)?;
        Ok(vec![
            self.resource.as_str().to_string(),
            id.to_string(),
            action.as_str().to_string(),
        ])
    }
}

pub fn protocol_for(resource: Resource) -> ResourceProtocol {
    match resource {
        Resource::Tasks => ResourceProtocol {
            resource,
            update_verb: UpdateVerb::Replace,
            can_delete: false,
            actions: &[],
        },
        Resource::Executions => ResourceProtocol {
            resource,
            update_verb: UpdateVerb::Merge,
            can_delete: false,
            actions: &[SideAction::Cancel, SideAction::Retry, SideAction::Logs],
        },
        Resource::Jobs => ResourceProtocol {
            resource,
            update_verb: UpdateVerb::Merge,
            can_delete: false,
            actions: &[SideAction::Cancel, SideAction::Retry],
        },
        Resource::Schedules => ResourceProtocol {
            resource,
            update_verb: UpdateVerb::Merge,
            can_delete: true,
            actions: &[SideAction::Trigger, SideAction::Enable, SideAction::Disable],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_verb_per_resource() {
        for resource in Resource::ALL {
            let expected = if resource == Resource::Tasks {
                Method::PUT
            } else {
                Method::PATCH
            };
            assert_eq!(protocol_for(resource).update_verb.method(), expected, "{resource}");
        }
    }

    #[test]
    fn test_only_schedules_are_deletable() {
        for resource in Resource::ALL {
            assert_eq!(
                protocol_for(resource).can_delete,
                resource == Resource::Schedules,
                "{resource}"
            );
        }
    }

    #[test]
    fn test_action_segments() {
        let protocol = protocol_for(Resource::Executions);
        assert_eq!(
            protocol.action_segments("e1", SideAction::Retry).unwrap(),
            vec!["executions", "e1", "retry"]
        );
        assert_eq!(
            protocol.action_segments("a/b", SideAction::Logs).unwrap(),
            vec!["executions", "a/b", "logs"]
        );

        let err = protocol.action_segments("e1", SideAction::Trigger).unwrap_err();
        assert!(matches!(err, ConsoleError::UnsupportedAction { .. }));
        assert!(protocol_for(Resource::Tasks)
            .action_segments("t1", SideAction::Cancel)
            .is_err());
    }

    #[test]
    fn test_action_properties() {
        assert!(SideAction::Cancel.is_idempotent());
        assert!(!SideAction::Retry.is_idempotent());
        assert!(SideAction::Enable.is_idempotent());
        assert!(SideAction::Cancel.requires_confirmation());
        assert!(SideAction::Retry.requires_confirmation());
        assert!(SideAction::Trigger.requires_confirmation());
        assert!(!SideAction::Logs.requires_confirmation());
        assert!(!SideAction::Enable.requires_confirmation());
    }

    #[test]
    fn test_side_action_from_str() {
        assert_eq!("Cancel".parse::<SideAction>().unwrap(), SideAction::Cancel);
        assert_eq!(" logs ".parse::<SideAction>().unwrap(), SideAction::Logs);
        assert!("pause".parse::<SideAction>().is_err());
    }
}

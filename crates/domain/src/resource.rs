use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use console_errors::ConsoleError;

/// 控制台管理的资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Tasks,
    Executions,
    Jobs,
    Schedules,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Tasks,
        Resource::Executions,
        Resource::Jobs,
        Resource::Schedules,
    ];

    /// URL path segment under the API root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Tasks => "tasks",
            Resource::Executions => "executions",
            Resource::Jobs => "jobs",
            Resource::Schedules => "schedules",
        }
    }

    /// Singular noun used in prompts and log lines.
    pub fn singular(&self) -> &'static str {
        match self {
            Resource::Tasks => "task",
            Resource::Executions => "execution",
            Resource::Jobs => "job",
            Resource::Schedules => "schedule",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tasks" => Ok(Resource::Tasks),
            "executions" => Ok(Resource::Executions),
            "jobs" => Ok(Resource::Jobs),
            "schedules" => Ok(Resource::Schedules),
            _ => Err(ConsoleError::UnknownResource(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_round_trips_through_str() {
        for resource in Resource::ALL {
            assert_eq!(resource.as_str().parse::<Resource>().unwrap(), resource);
        }
    }

    #[test]
    fn test_resource_parse_is_case_insensitive() {
        assert_eq!("Executions".parse::<Resource>().unwrap(), Resource::Executions);
        assert_eq!(" jobs ".parse::<Resource>().unwrap(), Resource::Jobs);
    }

    #[test]
    fn test_unknown_resource() {
        let err = "workers".parse::<Resource>().unwrap_err();
        assert!(matches!(err, ConsoleError::UnknownResource(name) if name == "workers"));
    }

    #[test]
    fn test_resource_display() {
        assert_eq!(Resource::Schedules.to_string(), "schedules");
        assert_eq!(Resource::Tasks.singular(), "task");
    }
}

#[cfg(test)]
mod loading_tests {
    use crate::{ConsoleConfig, LogLevel, OutputFormat};

    use config::{Environment, Map};
    use std::fs;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> Environment {
        let source: Map<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConsoleConfig::environment().source(Some(source))
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("console.toml");
        fs::write(
            &path,
            r#"
[api]
base_url = "http://scheduler:9000/api/v1"

[logging]
format = "json"
"#,
        )
        .unwrap();

        let config =
            ConsoleConfig::load_with_environment(path.to_str(), env_from(&[])).unwrap();
        assert_eq!(config.api.base_url, "http://scheduler:9000/api/v1");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.logging.format, OutputFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logs.placeholder, "No logs available");
    }

    #[test]
    fn test_environment_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("console.toml");
        fs::write(
            &path,
            r#"
[api]
base_url = "http://scheduler:9000/api/v1"
"#,
        )
        .unwrap();

        let env = env_from(&[
            ("RATCHET_CONSOLE_API__BASE_URL", "https://override.example.com/api/v1"),
            ("RATCHET_CONSOLE_LOGGING__LEVEL", "warn"),
            ("RATCHET_CONSOLE_LOGS__EXPORT_DIR", "/var/tmp"),
        ]);

        let config = ConsoleConfig::load_with_environment(path.to_str(), env).unwrap();
        assert_eq!(config.api.base_url, "https://override.example.com/api/v1");
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.logs.export_dir, "/var/tmp");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");
        let result = ConsoleConfig::load_with_environment(path.to_str(), env_from(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let env = env_from(&[("RATCHET_CONSOLE_API__BASE_URL", "not-a-url")]);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("console.toml");
        fs::write(&path, "").unwrap();

        let result = ConsoleConfig::load_with_environment(path.to_str(), env);
        assert!(result.is_err());
    }
}

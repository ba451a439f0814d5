// ABOUTME: Integration tests for configuration parsing and discovery.
// ABOUTME: Tests YAML parsing, env var interpolation, and config file lookup.

use nephos::config::*;
use nephos::error::Error;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let yaml = r#"
decision:
  endpoint: https://my-resource.openai.azure.com
  api_key: literal-key
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.decision.endpoint, "https://my-resource.openai.azure.com");
        assert_eq!(config.decision.deployment, "gpt-4");
        assert_eq!(config.decision.timeout, Duration::from_secs(30));
        assert_eq!(config.provision.timeout, Duration::from_secs(600));
        assert_eq!(config.azure.cli, "az");
        assert_eq!(config.aws.cli, "aws");
        assert!(config.aws.region.is_none());
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
decision:
  endpoint: https://my-resource.openai.azure.com
  deployment: gpt-4o
  api_key:
    env: AZURE_OPENAI_KEY
    default: fallback
  timeout: 45s

provision:
  timeout: 15m

azure:
  subscription: sub-123
  cli: /usr/local/bin/az

aws:
  region: eu-west-1

history: logs/deployments.jsonl
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.decision.deployment, "gpt-4o");
        assert_eq!(config.decision.timeout, Duration::from_secs(45));
        assert_eq!(config.provision.timeout, Duration::from_secs(900));
        assert_eq!(config.azure.cli, "/usr/local/bin/az");
        assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.history.to_str(), Some("logs/deployments.jsonl"));
    }

    #[test]
    fn missing_decision_section_is_an_error() {
        assert!(Config::from_yaml("provision:\n  timeout: 1m\n").is_err());
    }
}

mod env_interpolation {
    use super::*;

    #[test]
    fn literal_api_key_resolves_as_is() {
        let value = EnvValue::Literal("abc".to_string());
        assert_eq!(value.resolve().unwrap(), "abc");
    }

    #[test]
    fn env_reference_resolves_from_environment() {
        temp_env::with_var("NEPHOS_TEST_KEY", Some("from-env"), || {
            let value = EnvValue::FromEnv {
                var: "NEPHOS_TEST_KEY".to_string(),
                default: None,
            };
            assert_eq!(value.resolve().unwrap(), "from-env");
        });
    }

    #[test]
    fn missing_env_falls_back_to_default() {
        temp_env::with_var_unset("NEPHOS_TEST_MISSING", || {
            let value = EnvValue::FromEnv {
                var: "NEPHOS_TEST_MISSING".to_string(),
                default: Some("fallback".to_string()),
            };
            assert_eq!(value.resolve().unwrap(), "fallback");
        });
    }

    #[test]
    fn missing_env_without_default_is_an_error() {
        temp_env::with_var_unset("NEPHOS_TEST_MISSING", || {
            let value = EnvValue::FromEnv {
                var: "NEPHOS_TEST_MISSING".to_string(),
                default: None,
            };
            match value.resolve() {
                Err(Error::MissingEnvVar(var)) => assert_eq!(var, "NEPHOS_TEST_MISSING"),
                other => panic!("expected MissingEnvVar, got {other:?}"),
            }
        });
    }
}

mod discovery {
    use super::*;

    const MINIMAL: &str = "decision:\n  endpoint: https://x\n  api_key: k\n";

    #[test]
    fn discover_finds_nephos_yml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), MINIMAL).unwrap();
        assert!(Config::discover(dir.path()).is_ok());
    }

    #[test]
    fn discover_finds_dotdir_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".nephos")).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME_DIR), MINIMAL).unwrap();
        assert!(Config::discover(dir.path()).is_ok());
    }

    #[test]
    fn discover_without_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        match Config::discover(dir.path()) {
            Err(Error::ConfigNotFound(path)) => assert_eq!(path, dir.path()),
            other => panic!("expected ConfigNotFound, got {other:?}"),
        }
    }

    #[test]
    fn init_then_discover_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), false).unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.decision.deployment, "gpt-4");
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), false).unwrap();
        match init_config(dir.path(), false) {
            Err(Error::AlreadyExists(_)) => {}
            other => panic!("expected AlreadyExists, got {other:?}"),
        }
        // --force replaces it
        assert!(init_config(dir.path(), true).is_ok());
    }
}

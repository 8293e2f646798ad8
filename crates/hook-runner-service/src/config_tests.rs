//! Tests for loading and validating action configuration.

use super::*;
use std::io::Write;

const VALID_CONFIG: &str = r#"
actions:
  - name: deploy-site
    on:
      - events: [push]
        repos: [acme/site]
      - events: [hook-runner-startup]
    run:
      command: [/usr/local/bin/deploy, --fast]
  - name: rebuild-docs
    on:
      - events: [push]
        repos: [acme/docs, acme/site]
    run:
      command: [make, docs]
"#;

fn validation_errors(yaml: &str) -> Vec<String> {
    let config = Configuration::from_yaml_str(yaml).expect("test YAML must parse");
    match config.validate() {
        Ok(()) => Vec::new(),
        Err(ConfigError::Validation { errors }) => errors,
        Err(other) => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Parsing
// ============================================================================

mod parsing_tests {
    use super::*;

    #[test]
    fn test_parses_full_configuration() {
        let config = Configuration::from_yaml_str(VALID_CONFIG).unwrap();

        assert_eq!(config.actions.len(), 2);
        let deploy = &config.actions[0];
        assert_eq!(deploy.name, "deploy-site");
        assert_eq!(deploy.triggers.len(), 2);
        assert_eq!(deploy.triggers[0].event_types, vec!["push"]);
        assert_eq!(deploy.triggers[0].full_repo_names, vec!["acme/site"]);
        assert!(deploy.triggers[1].full_repo_names.is_empty());
        assert_eq!(deploy.run.command, vec!["/usr/local/bin/deploy", "--fast"]);
        assert_eq!(
            config.actions[1].triggers[0].full_repo_names,
            vec!["acme/docs", "acme/site"]
        );
    }

    #[test]
    fn test_unknown_top_level_key_is_rejected() {
        let result = Configuration::from_yaml_str("actions: []\nlisten: 8080\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_action_key_is_rejected() {
        let yaml = r#"
actions:
  - name: a
    on: [{events: [push], repos: [a/b]}]
    run: {command: ["true"]}
    execute: {command: ["true"]}
"#;
        let err = Configuration::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("execute"), "{err}");
    }

    #[test]
    fn test_unknown_trigger_key_is_rejected() {
        let yaml = r#"
actions:
  - name: a
    on: [{events: [push], repositories: [a/b]}]
    run: {command: ["true"]}
"#;
        assert!(Configuration::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_empty_document_has_no_actions() {
        let config = Configuration::from_yaml_str("{}").unwrap();
        assert!(config.actions.is_empty());
        assert!(config.validate().is_ok());
    }
}

// ============================================================================
// Validation
// ============================================================================

mod validation_tests {
    use super::*;

    #[test]
    fn test_valid_configuration_passes() {
        assert!(validation_errors(VALID_CONFIG).is_empty());
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let errors = validation_errors("actions:\n  - {}\n");

        assert_eq!(
            errors,
            vec![
                "actions[0].name may not be empty",
                "actions[0].on may not be empty",
                "actions[0].run.command may not be empty",
            ]
        );
    }

    #[test]
    fn test_empty_event_list() {
        let yaml = r#"
actions:
  - name: a
    on:
      - repos: [acme/site]
    run: {command: ["true"]}
"#;
        assert_eq!(
            validation_errors(yaml),
            vec!["actions[0].on[0].events may not be empty"]
        );
    }

    #[test]
    fn test_unsupported_event_type() {
        let yaml = r#"
actions:
  - name: a
    on:
      - events: [push, issues]
        repos: [acme/site]
    run: {command: ["true"]}
"#;
        assert_eq!(
            validation_errors(yaml),
            vec![r#"actions[0].on[0].events contains unsupported event type "issues""#]
        );
    }

    #[test]
    fn test_pseudo_event_with_repos() {
        let yaml = r#"
actions:
  - name: a
    on:
      - events: [hook-runner-startup, push]
        repos: [acme/site]
    run: {command: ["true"]}
"#;
        assert_eq!(
            validation_errors(yaml),
            vec![
                "actions[0].on[0] matches pseudo-events [hook-runner-startup], but also requires a match on repository names"
            ]
        );
    }

    #[test]
    fn test_unknown_pseudo_event_reports_both_problems() {
        let yaml = r#"
actions:
  - name: a
    on:
      - events: [hook-runner-shutdown]
        repos: [acme/site]
    run: {command: ["true"]}
"#;
        let errors = validation_errors(yaml);

        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("unsupported event type \"hook-runner-shutdown\""));
        assert!(errors[1].contains("pseudo-events [hook-runner-shutdown]"));
    }

    #[test]
    fn test_indices_point_at_the_offending_entry() {
        let yaml = r#"
actions:
  - name: ok
    on: [{events: [push], repos: [a/b]}]
    run: {command: ["true"]}
  - name: broken
    on:
      - events: [push]
        repos: [a/b]
      - events: []
    run: {command: ["true"]}
"#;
        assert_eq!(
            validation_errors(yaml),
            vec!["actions[1].on[1].events may not be empty"]
        );
    }

    #[test]
    fn test_validation_error_display_joins_messages() {
        let err = ConfigError::Validation {
            errors: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(err.to_string(), "invalid action configuration: first; second");
    }
}

// ============================================================================
// Loading from disk
// ============================================================================

mod load_tests {
    use super::*;

    #[test]
    fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID_CONFIG.as_bytes()).unwrap();

        let config = Configuration::load(file.path()).unwrap();

        assert_eq!(config.actions.len(), 2);
    }

    #[test]
    fn test_load_runs_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"actions:\n  - name: x\n").unwrap();

        let err = Configuration::load(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Validation { .. }), "{err}");
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let err = Configuration::load(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("absent.yaml"), "{err}");
    }

    #[test]
    fn test_malformed_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"actions: [\n").unwrap();

        let err = Configuration::load(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }
}

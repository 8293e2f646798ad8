//! Action configuration file.
//!
//! ```yaml
//! actions:
//!   - name: deploy-site
//!     on:
//!       - events: [push]
//!         repos: [acme/site]
//!       - events: [hook-runner-startup]
//!     run:
//!       command: [/usr/local/bin/deploy, --fast]
//! ```
//!
//! Unknown keys are rejected when parsing. Everything the YAML decoder cannot
//! check is covered by [`Configuration::validate`].

use crate::actions::Action;
use crate::events::{is_pseudo_event_type, is_supported_event_type};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse action configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// All semantic problems found in an otherwise well-formed file.
    #[error("invalid action configuration: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("missing environment variable: {name}")]
    MissingVariable { name: String },
}

/// Contents of the action configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Configuration {
    /// Read, parse and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), "Read action configuration");

        let config = Self::from_yaml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse without validating.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Check for problems the YAML decoder cannot detect.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] listing every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        for (a_idx, action) in self.actions.iter().enumerate() {
            if action.name.is_empty() {
                errors.push(format!("actions[{a_idx}].name may not be empty"));
            }
            if action.triggers.is_empty() {
                errors.push(format!("actions[{a_idx}].on may not be empty"));
            }

            for (t_idx, trigger) in action.triggers.iter().enumerate() {
                if trigger.event_types.is_empty() {
                    errors.push(format!(
                        "actions[{a_idx}].on[{t_idx}].events may not be empty"
                    ));
                }

                let mut pseudo_events = Vec::new();
                for event_type in &trigger.event_types {
                    if !is_supported_event_type(event_type) {
                        errors.push(format!(
                            "actions[{a_idx}].on[{t_idx}].events contains unsupported event type {event_type:?}"
                        ));
                    }
                    if is_pseudo_event_type(event_type) {
                        pseudo_events.push(event_type.as_str());
                    }
                }

                // Pseudo-events have no repository to match against.
                if !pseudo_events.is_empty() && !trigger.full_repo_names.is_empty() {
                    errors.push(format!(
                        "actions[{a_idx}].on[{t_idx}] matches pseudo-events [{}], but also requires a match on repository names",
                        pseudo_events.join(" ")
                    ));
                }
            }

            if action.run.command.is_empty() {
                errors.push(format!("actions[{a_idx}].run.command may not be empty"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation { errors })
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

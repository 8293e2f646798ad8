//! Actions: what to run, and on which events.

use crate::events::ActionEvent;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

/// Errors from running an action.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("action {action:?} has no command to run")]
    NoCommand { action: String },

    #[error("command {command:?} could not be started: {message}")]
    SpawnFailed {
        command: Vec<String>,
        message: String,
    },

    #[error("command {command:?} failed: {status}")]
    CommandFailed {
        command: Vec<String>,
        status: String,
    },
}

/// An action from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Action {
    #[serde(default)]
    pub name: String,

    /// The action runs when any of these triggers matches.
    #[serde(rename = "on", default)]
    pub triggers: Vec<Trigger>,

    #[serde(default)]
    pub run: RunTask,
}

/// One `on:` entry of an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trigger {
    #[serde(rename = "events", default)]
    pub event_types: Vec<String>,

    /// `owner/name` of the repositories to react to. Must be empty when
    /// `event_types` contains pseudo-events.
    #[serde(rename = "repos", default)]
    pub full_repo_names: Vec<String>,
}

/// The `run:` section of an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunTask {
    /// Program followed by its arguments. No shell is involved.
    #[serde(default)]
    pub command: Vec<String>,
}

impl Action {
    /// Returns `true` if any trigger of this action selects `event`.
    ///
    /// A trigger selects an event when it lists the event's type, and either
    /// the event has no repository or the trigger lists that repository.
    pub fn matches(&self, event: &dyn ActionEvent) -> bool {
        let full_repo_name = event.full_repo_name();
        self.triggers.iter().any(|trigger| {
            if !trigger.event_types.iter().any(|t| t == event.event_type()) {
                return false;
            }
            match &full_repo_name {
                None => true,
                Some(name) => trigger.full_repo_names.contains(name),
            }
        })
    }

    /// Run the action's command for `event` and wait for it to finish.
    ///
    /// The command inherits this process's environment and output streams,
    /// gets the event's variables on top, and reads from an empty stdin.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] if the command cannot be started or exits
    /// unsuccessfully.
    pub async fn execute(
        &self,
        delivery_id: &str,
        event: &dyn ActionEvent,
    ) -> Result<(), ActionError> {
        let Some((program, args)) = self.run.command.split_first() else {
            return Err(ActionError::NoCommand {
                action: self.name.clone(),
            });
        };

        info!(delivery_id = %delivery_id, action = %self.name, "Executing action");

        let status = Command::new(program)
            .args(args)
            .envs(event.env_variables())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ActionError::SpawnFailed {
                command: self.run.command.clone(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(ActionError::CommandFailed {
                command: self.run.command.clone(),
                status: status.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;

//! Webhook callback that runs configured actions.

use crate::actions::Action;
use crate::config::Configuration;
use crate::events::{as_action_event, ActionEvent};
use async_trait::async_trait;
use hook_runner_core::{Event, EventCallback};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Outcome of dispatching one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Actions whose triggers matched the event.
    pub matched: usize,

    /// Matched actions that did not complete successfully.
    pub failed: usize,
}

/// Runs every action whose triggers match an incoming event.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    actions: Arc<[Action]>,
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        Self {
            actions: Arc::from(Vec::new()),
        }
    }
}

impl ActionDispatcher {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            actions: configuration.actions.into(),
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Run matching actions one after another, in configuration order.
    ///
    /// A failing action is logged and does not stop the remaining ones.
    pub async fn dispatch(&self, delivery_id: &str, event: &dyn ActionEvent) -> DispatchSummary {
        run_matching(&self.actions, delivery_id, event).await
    }
}

async fn run_matching(
    actions: &[Action],
    delivery_id: &str,
    event: &dyn ActionEvent,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    match event.full_repo_name() {
        Some(repository) => info!(
            delivery_id = %delivery_id,
            event_type = %event.event_type(),
            repository = %repository,
            "Received event"
        ),
        None => info!(
            delivery_id = %delivery_id,
            event_type = %event.event_type(),
            "Received event"
        ),
    }

    for action in actions.iter().filter(|a| a.matches(event)) {
        summary.matched += 1;
        if let Err(e) = action.execute(delivery_id, event).await {
            summary.failed += 1;
            error!(
                delivery_id = %delivery_id,
                action = %action.name,
                error = %e,
                "Action failed"
            );
        }
    }

    summary
}

#[async_trait]
impl EventCallback for ActionDispatcher {
    /// Runs the matching actions on their own task.
    ///
    /// The caller still waits for them, but dropping this future (a client
    /// disconnecting mid-delivery) does not stop the remaining actions.
    async fn on_event(&self, delivery_id: &str, event: Box<dyn Event>) {
        if as_action_event(event.as_ref()).is_none() {
            debug!(
                delivery_id = %delivery_id,
                event_type = %event.event_type(),
                "Ignoring event that no action can subscribe to"
            );
            return;
        }

        let actions = Arc::clone(&self.actions);
        let task_delivery_id = delivery_id.to_string();
        let task = tokio::spawn(async move {
            if let Some(action_event) = as_action_event(event.as_ref()) {
                run_matching(&actions, &task_delivery_id, action_event).await;
            }
        });

        if let Err(e) = task.await {
            error!(
                delivery_id = %delivery_id,
                error = %e,
                "Action dispatch task failed"
            );
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

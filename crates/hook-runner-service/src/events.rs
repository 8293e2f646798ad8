//! Event types that actions can subscribe to.
//!
//! Two kinds of events exist:
//!
//! - Webhook events such as [`PushEvent`], decoded from a delivery and always
//!   tied to one repository.
//! - Pseudo-events such as [`StartupEvent`], raised by the service itself.
//!   Their type starts with [`PSEUDO_EVENT_PREFIX`] and they have no
//!   repository.

use hook_runner_core::{decode_minimal, DecodeResult, Event};
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Event type of a push to a repository.
pub const PUSH_EVENT_TYPE: &str = "push";

/// Event type of the pseudo-event raised once when the service starts.
pub const STARTUP_EVENT_TYPE: &str = "hook-runner-startup";

/// Prefix shared by all pseudo-event types.
pub const PSEUDO_EVENT_PREFIX: &str = "hook-runner-";

/// Event types that may appear in an action trigger.
pub const SUPPORTED_EVENT_TYPES: [&str; 2] = [PUSH_EVENT_TYPE, STARTUP_EVENT_TYPE];

/// An event that actions can react to.
pub trait ActionEvent: Event {
    /// `owner/name` of the repository the event belongs to, `None` for
    /// pseudo-events.
    fn full_repo_name(&self) -> Option<String>;

    /// Variables added to the environment of commands run for this event.
    fn env_variables(&self) -> BTreeMap<String, String>;
}

/// Returns `true` if `event_type` may be used in an action trigger.
pub fn is_supported_event_type(event_type: &str) -> bool {
    SUPPORTED_EVENT_TYPES.contains(&event_type)
}

/// Returns `true` if `event_type` names a pseudo-event.
pub fn is_pseudo_event_type(event_type: &str) -> bool {
    event_type.starts_with(PSEUDO_EVENT_PREFIX)
}

/// Delivery id used for the startup pseudo-event.
pub fn startup_delivery_id() -> String {
    Uuid::nil().to_string()
}

/// Decoder for the webhook handler.
///
/// Decodes `push` into a [`PushEvent`] and leaves every other type to
/// [`decode_minimal`]. Pseudo-events are never decoded from a delivery.
pub fn decode_event(event_type: &str, payload: &[u8]) -> DecodeResult {
    match event_type {
        PUSH_EVENT_TYPE => Ok(Some(Box::new(PushEvent::from_payload(payload)?))),
        _ => decode_minimal(event_type, payload),
    }
}

/// View a decoded event as an [`ActionEvent`], if it is one.
pub fn as_action_event(event: &dyn Event) -> Option<&dyn ActionEvent> {
    if let Some(push) = event.downcast_ref::<PushEvent>() {
        return Some(push);
    }
    if let Some(startup) = event.downcast_ref::<StartupEvent>() {
        return Some(startup);
    }
    None
}

// ============================================================================
// Push
// ============================================================================

/// `X-GitHub-Event: push`
///
/// Only the fields needed to select and parameterize actions are decoded.
/// Missing fields are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushEvent {
    /// Full ref that was pushed, e.g. `refs/heads/main`.
    #[serde(rename = "ref", default)]
    pub git_ref: String,

    /// Commit the ref points to after the push.
    #[serde(rename = "after", default)]
    pub commit: String,

    /// Branch name for refs under `refs/heads/`, otherwise empty.
    #[serde(skip)]
    pub branch: String,

    #[serde(default)]
    pub repository: PushRepository,

    /// The payload exactly as received.
    #[serde(skip)]
    pub raw_payload: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushRepository {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub owner: PushRepositoryOwner,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushRepositoryOwner {
    #[serde(default)]
    pub name: String,
}

impl PushEvent {
    /// Decode a push payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the payload is not a JSON object with
    /// correctly typed fields. A JSON `null` decodes to an empty event.
    pub fn from_payload(payload: &[u8]) -> Result<Self, serde_json::Error> {
        let mut event = serde_json::from_slice::<Option<PushEvent>>(payload)?.unwrap_or_default();
        event.branch = event
            .git_ref
            .strip_prefix("refs/heads/")
            .unwrap_or_default()
            .to_string();
        event.raw_payload = String::from_utf8_lossy(payload).into_owned();
        Ok(event)
    }
}

impl Event for PushEvent {
    fn event_type(&self) -> &str {
        PUSH_EVENT_TYPE
    }
}

impl ActionEvent for PushEvent {
    fn full_repo_name(&self) -> Option<String> {
        Some(format!(
            "{}/{}",
            self.repository.owner.name, self.repository.name
        ))
    }

    fn env_variables(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("HOOK_RUNNER_VAR_REF".to_string(), self.git_ref.clone()),
            ("HOOK_RUNNER_VAR_BRANCH".to_string(), self.branch.clone()),
            ("HOOK_RUNNER_VAR_COMMIT".to_string(), self.commit.clone()),
            (
                "HOOK_RUNNER_VAR_REPO_NAME".to_string(),
                self.repository.name.clone(),
            ),
            (
                "HOOK_RUNNER_VAR_REPO_OWNER".to_string(),
                self.repository.owner.name.clone(),
            ),
            ("HOOK_RUNNER_PAYLOAD".to_string(), self.raw_payload.clone()),
        ])
    }
}

// ============================================================================
// Startup
// ============================================================================

/// Pseudo-event raised once before the service starts listening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartupEvent;

impl Event for StartupEvent {
    fn event_type(&self) -> &str {
        STARTUP_EVENT_TYPE
    }
}

impl ActionEvent for StartupEvent {
    fn full_repo_name(&self) -> Option<String> {
        None
    }

    fn env_variables(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;

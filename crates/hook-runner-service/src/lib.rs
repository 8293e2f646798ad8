//! # Hook-Runner Service
//!
//! Runs configured commands when GitHub or Gitea deliver matching webhooks.
//!
//! This crate wires [`hook_runner_core`] into a standalone service:
//! - [`settings`] resolves command line flags and environment variables
//! - [`config`] loads and validates the YAML action configuration
//! - [`events`] decodes the event types actions can subscribe to
//! - [`actions`] matches events against triggers and runs commands
//! - [`dispatch`] is the webhook callback that ties the above together
//! - [`server`] binds the listener and serves until shutdown

pub mod actions;
pub mod config;
pub mod dispatch;
pub mod events;
pub mod server;
pub mod settings;

pub use actions::{Action, ActionError, RunTask, Trigger};
pub use config::{ConfigError, Configuration};
pub use dispatch::{ActionDispatcher, DispatchSummary};
pub use events::{
    as_action_event, decode_event, is_pseudo_event_type, is_supported_event_type,
    startup_delivery_id, ActionEvent, PushEvent, PushRepository, PushRepositoryOwner,
    StartupEvent, PSEUDO_EVENT_PREFIX, PUSH_EVENT_TYPE, STARTUP_EVENT_TYPE,
    SUPPORTED_EVENT_TYPES,
};
pub use server::{bind, build_router, serve, shutdown_signal, start_server, ServiceError};
pub use settings::{Cli, ServiceSettings};

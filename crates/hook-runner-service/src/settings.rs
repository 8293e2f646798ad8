//! Command line and environment settings.
//!
//! Everything except the webhook secret can be given as a flag or through
//! the environment. The secret is only read from [`SECRET_ENV_VAR`] so that
//! it never shows up in process listings.

use crate::config::ConfigError;
use clap::Parser;
use hook_runner_core::SecretKey;
use std::path::PathBuf;

pub const CONFIG_ENV_VAR: &str = "HOOK_RUNNER_CONFIG";
pub const SECRET_ENV_VAR: &str = "HOOK_RUNNER_SECRET";
pub const PORT_ENV_VAR: &str = "HOOK_RUNNER_PORT";
pub const HOST_ENV_VAR: &str = "HOOK_RUNNER_HOST";

/// Configuration file used when neither `--config` nor
/// `HOOK_RUNNER_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "./hook-runner.yaml";

/// Variables removed from the environment before any action runs.
pub const SCRUBBED_ENV_VARS: [&str; 4] =
    [CONFIG_ENV_VAR, SECRET_ENV_VAR, PORT_ENV_VAR, HOST_ENV_VAR];

// ============================================================================
// CLI Structure
// ============================================================================

/// Hook-Runner - run commands on GitHub and Gitea webhooks
#[derive(Debug, Parser)]
#[command(name = "hook-runner")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Runs configured commands when GitHub or Gitea webhooks arrive")]
#[command(
    long_about = "Runs configured commands when GitHub or Gitea webhooks arrive.\n\n\
                  The webhook secret is read from the HOOK_RUNNER_SECRET environment variable."
)]
pub struct Cli {
    /// Action configuration file [default: ./hook-runner.yaml]
    #[arg(short, long, env = "HOOK_RUNNER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to bind HTTP server
    #[arg(short, long, env = "HOOK_RUNNER_PORT")]
    pub port: Option<u16>,

    /// Host to bind HTTP server
    #[arg(long, env = "HOOK_RUNNER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Logging level, used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,
}

// ============================================================================
// Resolved settings
// ============================================================================

/// Settings the service runs with.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub config_path: PathBuf,

    /// `true` when [`DEFAULT_CONFIG_PATH`] was used.
    pub config_path_defaulted: bool,

    pub host: String,
    pub port: u16,
    pub secret_key: SecretKey,
}

impl ServiceSettings {
    /// Combine parsed flags with the secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVariable`] when the secret is absent or
    /// empty, or when no port was given.
    pub fn resolve(cli: &Cli, secret: Option<String>) -> Result<Self, ConfigError> {
        let secret = secret
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing(SECRET_ENV_VAR))?;
        let port = cli.port.ok_or_else(|| missing(PORT_ENV_VAR))?;

        let (config_path, config_path_defaulted) = match &cli.config {
            Some(path) => (path.clone(), false),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), true),
        };

        Ok(Self {
            config_path,
            config_path_defaulted,
            host: cli.host.clone(),
            port,
            secret_key: SecretKey::new(secret),
        })
    }

    /// Like [`resolve`](Self::resolve), reading the secret from the process
    /// environment.
    pub fn from_environment(cli: &Cli) -> Result<Self, ConfigError> {
        Self::resolve(cli, std::env::var(SECRET_ENV_VAR).ok())
    }
}

/// Remove [`SCRUBBED_ENV_VARS`] from the process environment so that
/// commands run by actions cannot see them.
///
/// Must be called before the async runtime starts any threads.
pub fn scrub_environment() {
    for name in SCRUBBED_ENV_VARS {
        std::env::remove_var(name);
    }
}

fn missing(name: &str) -> ConfigError {
    ConfigError::MissingVariable {
        name: name.to_string(),
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

//! # Hook-Runner
//!
//! Binary entry point for the hook-runner service.
//!
//! This executable:
//! - Parses flags and reads the webhook secret from the environment
//! - Loads and validates the action configuration
//! - Removes its own settings from the environment seen by actions
//! - Raises the startup pseudo-event
//! - Serves webhooks until SIGINT or SIGTERM

use anyhow::Context;
use clap::Parser;
use hook_runner_core::{EventCallback, WebhookHandler};
use hook_runner_service::{
    build_router, decode_event, settings::scrub_environment, start_server, startup_delivery_id,
    ActionDispatcher, Cli, ConfigError, Configuration, ServiceError, ServiceSettings, StartupEvent,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            let exit_code = e
                .downcast_ref::<ServiceError>()
                .map(ServiceError::exit_code)
                .unwrap_or(1);
            ExitCode::from(exit_code)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = ServiceSettings::from_environment(&cli).map_err(ServiceError::from)?;
    if settings.config_path_defaulted {
        info!(
            path = %settings.config_path.display(),
            "No configuration file given, using the default path"
        );
    }

    let configuration = load_configuration(&settings).map_err(ServiceError::from)?;
    info!(actions = configuration.actions.len(), "Loaded action configuration");

    // The runtime is not running yet, so no other thread can read the
    // environment while it is being modified.
    scrub_environment();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(serve(settings, configuration))?;
    Ok(())
}

async fn serve(
    settings: ServiceSettings,
    configuration: Configuration,
) -> Result<(), ServiceError> {
    let dispatcher = Arc::new(ActionDispatcher::new(configuration));

    dispatcher
        .on_event(&startup_delivery_id(), Box::new(StartupEvent))
        .await;

    let handler = WebhookHandler::new(settings.secret_key.clone(), dispatcher)
        .with_decoder(Arc::new(decode_event));

    start_server(&settings.host, settings.port, build_router(handler)).await
}

fn load_configuration(settings: &ServiceSettings) -> Result<Configuration, ConfigError> {
    Configuration::load(&settings.config_path).inspect_err(|e| {
        if let ConfigError::Validation { errors } = e {
            for message in errors {
                error!("{}", message);
            }
        }
    })
}

fn init_tracing(cli: &Cli) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    let ansi = std::io::IsTerminal::is_terminal(&std::io::stderr());

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Carelink - appointment chat client for the telemedicine backend.
//!
//! This is the binary entry point for the Carelink CLI.

use std::sync::Arc;
use std::time::Duration;

use carelink_api::ApiClient;
use carelink_chat::ChatTarget;
use carelink_config::CarelinkConfig;
use carelink_core::error::CarelinkError;
use carelink_core::types::AppointmentId;
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod appointments;
mod chat;

/// Carelink - appointment chat client.
#[derive(Parser, Debug)]
#[command(name = "carelink", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List appointments with their chat availability.
    Appointments,
    /// Open an interactive chat bound to an appointment.
    #[command(group = ArgGroup::new("target").required(true).args(["appointment", "counterpart"]))]
    Chat {
        /// Appointment id to chat under.
        #[arg(long)]
        appointment: Option<String>,
        /// Counterpart user id; the backing appointment is picked
        /// automatically.
        #[arg(long)]
        counterpart: Option<String>,
    },
    /// Show the resolved configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match carelink_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            carelink_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.app.log_level);

    let result = match cli.command {
        Some(Commands::Appointments) => appointments::run(&config).await,
        Some(Commands::Chat {
            appointment,
            counterpart,
        }) => {
            let target = match (appointment, counterpart) {
                (Some(id), _) => ChatTarget::Appointment(AppointmentId(id)),
                (None, Some(user_id)) => ChatTarget::Counterpart(user_id),
                (None, None) => unreachable!("clap enforces the target group"),
            };
            chat::run(&config, target).await
        }
        Some(Commands::Config) => show_config(&config),
        None => {
            println!("carelink: use --help for available commands");
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("carelink: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    // RUST_LOG wins over the configured level when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn show_config(config: &CarelinkConfig) -> Result<(), CarelinkError> {
    // Serialize through the same model the loader deserializes into, so
    // what is shown is exactly what took effect.
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| CarelinkError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// Builds the API client from configuration.
fn build_client(config: &CarelinkConfig) -> Result<Arc<ApiClient>, CarelinkError> {
    let client = ApiClient::new(
        &config.api.base_url,
        config.api.bearer_token.as_deref(),
        Duration::from_secs(config.api.request_timeout_secs),
    )?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chat_requires_a_target() {
        let result = Cli::try_parse_from(["carelink", "chat"]);
        assert!(result.is_err());
    }

    #[test]
    fn chat_accepts_an_appointment_id() {
        let cli = Cli::try_parse_from(["carelink", "chat", "--appointment", "a1"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Chat {
                appointment: Some(_),
                counterpart: None
            })
        ));
    }
}

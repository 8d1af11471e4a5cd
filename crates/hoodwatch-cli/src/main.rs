mod cli;
mod error;
mod server;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use hoodwatch_agent::{ProtocolHandler, ToolDispatcher};
use hoodwatch_core::{BrokerageSource, RobinhoodAdapter, SessionConfig};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::cli::{CallArgs, Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = SessionConfig::from_env()
        .with_username(cli.username.clone())
        .with_password(cli.password.clone())
        .with_session_path(cli.session_path.clone())
        .with_allow_mfa(cli.allow_mfa_override())
        .with_mfa_code(cli.mfa_code.clone())
        .with_api_base_url(cli.api_base_url.clone())
        .with_timeout_ms(cli.timeout_ms);
    let source = Arc::new(RobinhoodAdapter::new(config));

    match cli.command {
        None | Some(Command::Serve) => {
            let handler = ProtocolHandler::new(ToolDispatcher::new(source));
            server::serve(&handler).await?;
        }
        Some(Command::Tools) => {
            let dispatcher = ToolDispatcher::new(source);
            println!("{}", serde_json::to_string_pretty(&dispatcher.tools())?);
        }
        Some(Command::Call(args)) => {
            call(ToolDispatcher::new(source), &args).await?;
        }
        Some(Command::Logout) => {
            source.logout().await;
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn call(dispatcher: ToolDispatcher, args: &CallArgs) -> Result<(), CliError> {
    let arguments: Value = serde_json::from_str(&args.arguments)
        .map_err(|error| CliError::Arguments(format!("--arguments is not valid JSON: {error}")))?;

    let outcome = dispatcher.call(&args.tool, &arguments).await;
    println!("{}", serde_json::to_string_pretty(&outcome.payload)?);

    if outcome.is_error {
        return Err(CliError::ToolFailed(outcome.text()));
    }
    Ok(())
}

/// Logs go to stderr; stdout carries protocol traffic.
fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

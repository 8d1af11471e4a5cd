//! CLI argument definitions for hoodwatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the stdio tool server (default) |
//! | `tools` | Print the tool registry |
//! | `call` | Run one tool call and print its payload |
//! | `logout` | Clear the persisted session |
//!
//! Connection flags override the matching `RH_*` / `HOODWATCH_*` variables.
//!
//! # Examples
//!
//! ```bash
//! # Serve tools to an agent over stdio
//! hoodwatch --session-path ~/.hoodwatch
//!
//! # One-shot options chain lookup
//! hoodwatch call robinhood.options.chain --arguments '{"symbol":"AAPL"}'
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Read-only Robinhood tool server for agents.
#[derive(Debug, Parser)]
#[command(
    name = "hoodwatch",
    author,
    version,
    about = "Read-only Robinhood tool server for agents"
)]
pub struct Cli {
    /// Robinhood account username (overrides RH_USERNAME).
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Robinhood account password (overrides RH_PASSWORD).
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Directory holding the persisted session token (overrides RH_SESSION_PATH).
    #[arg(long, global = true)]
    pub session_path: Option<PathBuf>,

    /// Allow interactive multi-factor login (overrides RH_ALLOW_MFA).
    #[arg(long, global = true, default_value_t = false)]
    pub allow_mfa: bool,

    /// One-time MFA code to send with the login request.
    #[arg(long, global = true)]
    pub mfa_code: Option<String>,

    /// Brokerage API base URL.
    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, env = "HOODWATCH_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve JSON-RPC tool calls on stdin/stdout until EOF.
    Serve,

    /// Print every tool definition as JSON.
    Tools,

    /// Run a single tool call and print the result payload.
    ///
    ///   hoodwatch call robinhood.market.quote --arguments '{"symbols":["AAPL"]}'
    Call(CallArgs),

    /// Remove the persisted session token.
    Logout,
}

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Tool name, e.g. robinhood.options.chain.
    pub tool: String,

    /// Tool arguments as a JSON object.
    #[arg(long, default_value = "{}")]
    pub arguments: String,
}

impl Cli {
    /// `--allow-mfa` only ever turns MFA on; its absence defers to the environment.
    pub fn allow_mfa_override(&self) -> Option<bool> {
        self.allow_mfa.then_some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["hoodwatch"]).expect("parses");
        assert!(cli.command.is_none());
        assert_eq!(cli.allow_mfa_override(), None);
    }

    #[test]
    fn call_takes_tool_and_arguments() {
        let cli = Cli::try_parse_from([
            "hoodwatch",
            "--timeout-ms",
            "2500",
            "call",
            "robinhood.news.latest",
            "--arguments",
            r#"{"symbol":"AAPL"}"#,
        ])
        .expect("parses");

        assert_eq!(cli.timeout_ms, Some(2500));
        match cli.command {
            Some(Command::Call(args)) => {
                assert_eq!(args.tool, "robinhood.news.latest");
                assert_eq!(args.arguments, r#"{"symbol":"AAPL"}"#);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn connection_flags_are_global() {
        let cli = Cli::try_parse_from(["hoodwatch", "logout", "--session-path", "/tmp/rh", "--allow-mfa"])
            .expect("parses");
        assert_eq!(cli.session_path, Some(PathBuf::from("/tmp/rh")));
        assert_eq!(cli.allow_mfa_override(), Some(true));
    }
}

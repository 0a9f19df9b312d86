// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand};
use clap_complete::{generate, Shell};
use commands::*;
use std::io;
use tlsgate_config::OptionRegistry;
use tlsgate_observability::{init_tracing_with_config, LogConfig, LogFormat};

#[derive(Parser)]
#[command(name = "tlsgate")]
#[command(version, about = "Check transport-security settings before a node starts")]
#[command(
    long_about = "tlsgate validates the SSL options of a server or client the way the node \
would at startup, then prints the resolved settings as JSON. Options come from a \
configuration file, TLSGATE_* environment variables and the command line, in \
increasing precedence."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format (pretty|compact|json)
    #[arg(long, global = true, value_name = "FORMAT", default_value = "pretty")]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate server transport-security settings
    Server(ServerCmd),

    /// Validate client transport-security settings
    Client(ClientCmd),

    /// List the options a role accepts
    Options(OptionsCmd),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// The derived command with the catalog's ssl flags attached to `server`
/// and `client`.
fn build_command() -> Result<clap::Command> {
    let server = OptionRegistry::server()?;
    let client = OptionRegistry::client()?;
    Ok(Cli::command()
        .mut_subcommand("server", |cmd| server.augment(cmd))
        .mut_subcommand("client", |cmd| client.augment(cmd)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_command()?.get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let log_config = LogConfig::for_verbosity(cli.verbose, cli.quiet)
        .with_format(cli.log_format)
        .with_color(console::colors_enabled_stderr());
    init_tracing_with_config(&log_config).ok(); // Ignore errors if already initialized

    let flags = subcommand_matches(&matches)?;
    let result = match &cli.command {
        Commands::Server(cmd) => cmd.execute(flags).await,
        Commands::Client(cmd) => cmd.execute(flags).await,
        Commands::Options(cmd) => cmd.execute(),
        Commands::Completions { shell } => generate_completions(*shell),
    };

    // Handle errors
    if let Err(e) = result {
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn subcommand_matches(matches: &clap::ArgMatches) -> Result<&clap::ArgMatches> {
    matches
        .subcommand()
        .map(|(_, sub)| sub)
        .context("no subcommand given")
}

fn generate_completions(shell: Shell) -> Result<()> {
    let mut cmd = build_command()?;
    generate(shell, &mut cmd, "tlsgate", &mut io::stdout());
    Ok(())
}

//! Command-line shell around `routegen-core`.
//!
//! Parses arguments, loads the document and optional TOML config, writes the
//! generated file and maps the outcome to an exit code: `0` with one line on
//! stdout, or `1` with one line on stderr.

mod common;
mod hooks;
mod routes;

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use routegen_core::Error;

pub use common::CliError;

#[derive(Parser, Debug)]
#[command(
    name = "routegen",
    version,
    about = "Generate Hono routes, Zod validators and client hooks from OpenAPI documents",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[command(flatten)]
    routes: routes::RoutesArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate fetch wrappers and query/mutation hooks
    Hooks(hooks::HooksArgs),
}

/// Run the CLI with `args` (program name first) and return the exit code.
pub fn run<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Hooks(args)) => hooks::run(args),
            None => routes::run(cli.routes),
        },
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            0
        }
        Err(e) => {
            eprintln!("{}", Error::InvalidCliArgument(first_line(&e.to_string())));
            1
        }
    }
}

/// clap renders usage after the message; keep the message only.
fn first_line(rendered: &str) -> String {
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

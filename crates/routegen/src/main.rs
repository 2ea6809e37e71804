//! `routegen` binary.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

fn main() {
    init_tracing();
    std::process::exit(routegen_cli::run(std::env::args_os()));
}

/// Logs go to stderr so stdout carries only the result line.
///
/// `RUST_LOG` takes a level or a full filter spec (`routegen_core=debug`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

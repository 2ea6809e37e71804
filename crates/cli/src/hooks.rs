//! `routegen hooks`: client hooks for one library profile.

use clap::Args;
use routegen_core::{EmitterProfile, generate_hooks};
use std::path::PathBuf;
use tracing::info;

use crate::common::{CliError, load_document, load_options, write_output};

#[derive(Args, Debug, Clone)]
pub struct HooksArgs {
    /// OpenAPI document (JSON, or YAML for .yaml/.yml)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
    /// Output file for the generated hook module
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,
    /// Client library: tanstack, swr, vue-query or svelte-query
    #[arg(long = "profile", value_name = "PROFILE")]
    pub profile: EmitterProfile,
    /// TOML file with compile options
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub fn run(args: HooksArgs) -> i32 {
    match execute(&args) {
        Ok(()) => {
            println!(
                "Generated {} hooks at {}",
                args.profile.name,
                args.output.display()
            );
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn execute(args: &HooksArgs) -> Result<(), CliError> {
    let options = load_options(args.config.as_deref())?;
    let doc = load_document(&args.input)?;
    let source = generate_hooks(&doc, &args.profile, &options)?;
    write_output(&args.output, &source)?;
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        profile = args.profile.name,
        "wrote hooks"
    );
    Ok(())
}

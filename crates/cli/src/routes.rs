//! Default command: Zod validators and Hono route descriptors.

use clap::Args;
use routegen_core::{CaseConvention, generate_routes};
use std::path::PathBuf;
use tracing::info;

use crate::common::{CliError, load_document, load_options, write_output};

#[derive(Args, Debug, Clone)]
pub struct RoutesArgs {
    /// OpenAPI document (JSON, or YAML for .yaml/.yml)
    #[arg(value_name = "INPUT", required = true)]
    pub input: Option<PathBuf>,
    /// Output file for the generated route module
    #[arg(short = 'o', long = "output", value_name = "PATH", required = true)]
    pub output: Option<PathBuf>,
    /// Case of validator identifiers (camelCase or PascalCase)
    #[arg(long = "naming-case-schema", value_name = "CASE")]
    pub naming_case_schema: Option<CaseConvention>,
    /// Export validator declarations
    #[arg(long = "export-schema")]
    pub export_schema: bool,
    /// Case of type alias identifiers (camelCase or PascalCase)
    #[arg(long = "naming-case-type", value_name = "CASE")]
    pub naming_case_type: Option<CaseConvention>,
    /// Emit exported type aliases
    #[arg(long = "export-type")]
    pub export_type: bool,
    /// TOML file with compile options; flags override it
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub fn run(args: RoutesArgs) -> i32 {
    match execute(&args) {
        Ok(output) => {
            println!("Generated routes at {}", output.display());
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn execute(args: &RoutesArgs) -> Result<PathBuf, CliError> {
    let input = args.input.as_ref().ok_or_else(|| CliError::missing("input document"))?;
    let output = args.output.as_ref().ok_or_else(|| CliError::missing("output path"))?;

    let mut options = load_options(args.config.as_deref())?;
    if let Some(case) = args.naming_case_schema {
        options.schema.case = case;
    }
    if let Some(case) = args.naming_case_type {
        options.type_alias.case = case;
    }
    options.schema.export |= args.export_schema;
    options.type_alias.export |= args.export_type;

    let doc = load_document(input)?;
    let source = generate_routes(&doc, &options)?;
    write_output(output, &source)?;
    info!(input = %input.display(), output = %output.display(), "wrote routes");
    Ok(output.clone())
}

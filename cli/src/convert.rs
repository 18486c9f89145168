#![deny(missing_docs)]

//! # Convert Command
//!
//! Reads an OpenAPI document, runs one conversion and writes the model as
//! pretty JSON (or the human readable dump with `--dump`).

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use spec_ir_core::{convert_str, ConversionOptions};

use crate::error::{CliError, CliResult};

/// Arguments for the convert command.
#[derive(clap::Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Path to the OpenAPI document (YAML or JSON).
    pub input: PathBuf,

    /// Output file. Stdout when omitted.
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    /// Package the emitter places generated code into.
    #[clap(long, env = "SPEC_IR_PACKAGE_NAME", default_value = "")]
    pub package_name: String,

    /// Only convert operations carrying one of these tags (comma separated).
    #[clap(long, env = "SPEC_IR_LIMIT_APIS", value_delimiter = ',')]
    pub limit_apis: Vec<String>,

    /// Keep every component schema, even unreachable ones.
    #[clap(long, env = "SPEC_IR_GENERATE_ALL")]
    pub generate_all: bool,

    /// Log document problems instead of failing on them.
    #[clap(long, env = "SPEC_IR_ALLOW_PARSE_ERRORS")]
    pub allow_parse_errors: bool,

    /// Log the model summary while converting.
    #[clap(long, short, env = "SPEC_IR_VERBOSE")]
    pub verbose: bool,

    /// Write the human readable summary instead of JSON.
    #[clap(long)]
    pub dump: bool,
}

impl ConvertArgs {
    /// Maps the command line onto conversion options.
    pub fn options(&self) -> ConversionOptions {
        ConversionOptions::new(self.package_name.clone())
            .with_limit_apis(
                self.limit_apis
                    .iter()
                    .map(|tag| tag.trim())
                    .filter(|tag| !tag.is_empty()),
            )
            .with_generate_all_named_schemas(self.generate_all)
            .with_allow_parse_errors(self.allow_parse_errors)
            .with_verbose(self.verbose)
    }
}

/// Converts the input document and renders the result.
pub fn render(args: &ConvertArgs) -> CliResult<String> {
    let text = fs::read_to_string(&args.input)?;
    let model = convert_str(&text, &args.options())?;

    if args.dump {
        return Ok(model.dump());
    }
    serde_json::to_string_pretty(&model)
        .map_err(|e| CliError::General(format!("Failed to serialize model: {}", e)))
}

/// Executes the conversion.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &ConvertArgs) -> CliResult<()> {
    let rendered = render(args)?;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
            tracing::info!("wrote model to {:?}", path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Generate OpenAPI schemas from Protocol Buffer definitions.
///
/// Reads a .proto file and writes the OpenAPI `components.schemas`
/// fragment for its messages as YAML.
#[derive(Parser)]
#[command(name = "proto2openapi", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an OpenAPI schema file from a protobuf file.
    Generate {
        /// Source protobuf file to read from.
        #[arg(long, short, env = "PROTO2OPENAPI_PROTO")]
        proto: PathBuf,

        /// OpenAPI schema file to write to.
        #[arg(
            long,
            short,
            default_value = "./apischema.yaml",
            env = "PROTO2OPENAPI_OUT"
        )]
        out: PathBuf,

        /// Suppress non-error output.
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet());

    if let Err(e) = run(cli) {
        error!("{e}");

        // Print cause chain.
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            error!("  caused by: {cause}");
            source = std::error::Error::source(cause);
        }

        process::exit(1);
    }
}

impl Cli {
    fn quiet(&self) -> bool {
        match &self.command {
            Commands::Generate { quiet, .. } => *quiet,
        }
    }
}

/// Log to stderr. `RUST_LOG` overrides the default level.
fn init_tracing(quiet: bool) {
    let default_level = if quiet { "error" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn error_kind(e: &proto2openapi::error::Error) -> &'static str {
    use proto2openapi::error::Error;
    match e {
        Error::Parse { .. } => "parse",
        Error::MalformedFieldName(_) => "malformed_field_name",
        Error::Read { .. } => "read",
        Error::Write { .. } => "write",
    }
}

fn run(cli: Cli) -> proto2openapi::error::Result<()> {
    match cli.command {
        Commands::Generate { proto, out, .. } => {
            info!(proto = %proto.display(), "generating schemas");

            let stats = proto2openapi::codegen::convert_file(&proto, &out).inspect_err(|e| {
                error!(
                    proto = %proto.display(),
                    outfile = %out.display(),
                    kind = error_kind(e),
                    "problem generating docs"
                );
            })?;

            if stats.elements_skipped > 0 {
                info!(
                    skipped = stats.elements_skipped,
                    "skipped nested messages, enums, oneofs and other non-field elements"
                );
            }
            info!(
                proto = %proto.display(),
                outfile = %out.display(),
                messages = stats.messages_emitted,
                fields = stats.fields_emitted,
                "finished generating docs to output file"
            );
        }
    }

    Ok(())
}

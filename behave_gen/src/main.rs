//! behave-gen
//!
//! Command line entry point: compiles a behavior suite into a Rust test file.

use behave_gen::{generate_from_files, write_output, GeneratorConfig, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Generate Rust behavior tests from a suite document
#[derive(Debug, Parser)]
#[command(
    name = "behave-gen",
    version,
    about = "Generate Rust behavior tests from a suite document."
)]
struct Cli {
    /// Suite document (JSON, or YAML by extension)
    #[arg(value_name = "SPEC")]
    spec: PathBuf,

    /// API model JSON the suite is resolved against
    #[arg(long, value_name = "FILE")]
    model: PathBuf,

    /// Generator configuration YAML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Fail if the output file differs from freshly generated source
    #[arg(long, requires = "out")]
    check: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("behave-gen: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::load_file(path)?,
        None => GeneratorConfig::default(),
    };
    let source = generate_from_files(&cli.spec, &cli.model, &config)?;

    match &cli.out {
        Some(out) => write_output(out, &source, cli.check),
        None => {
            print!("{source}");
            Ok(())
        }
    }
}

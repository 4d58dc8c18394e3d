//! The `minc` command line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use minc_drv::{compile_file, CompileFlags, CompileResult};
use tracing_subscriber::EnvFilter;

/// Front end for a C-subset language: lexes and parses a source file into a
/// fully annotated syntax tree.
#[derive(Parser, Debug)]
#[command(name = "minc", version, about)]
struct Cli {
    /// Source file to compile.
    input: PathBuf,

    /// Output file handed to the downstream code generator.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the token vector to stdout.
    #[arg(long)]
    dump_tokens: bool,

    /// Print the node tree to stdout.
    #[arg(long)]
    dump_ast: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let flags = CompileFlags { dump_tokens: cli.dump_tokens, dump_ast: cli.dump_ast };
    match compile_file(&cli.input, cli.output.as_deref(), flags) {
        CompileResult::Success => ExitCode::SUCCESS,
        CompileResult::FailedWithErrors => ExitCode::FAILURE,
    }
}

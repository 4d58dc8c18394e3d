//! minc-drv - Compiler Driver
//!
//! ============================================================================
//! DRIVER OVERVIEW
//! ============================================================================
//!
//! The driver is the entry point and orchestrator of the pipeline:
//!
//! ```text
//! Source file (.c subset)
//!        |
//!        v
//!   [minc-lex]  -->  token vector
//!        |
//!        v
//!   [minc-par]  -->  AST (arena + roots), offsets and symbols resolved
//!        |
//!        v
//!   downstream code generation (not part of this workspace)
//! ```
//!
//! Errors from any phase are rendered to stderr in the positional format and
//! collapse into [`CompileResult::FailedWithErrors`]; warnings are rendered
//! the same way but do not fail the compilation. The `--dump-tokens` and
//! `--dump-ast` switches print diagnostic views of the two intermediate
//! results to stdout.

use std::fs::File;
use std::path::Path;

use anyhow::Context;
use minc_lex::{FileSource, LexProcess, Token, TokenKind};
use minc_par::print::render_ast;
use minc_util::{Handler, Symbol};
use tracing::{debug, info};

/// Outcome of a compilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompileResult {
    /// The input compiled cleanly (warnings allowed).
    Success,
    /// Something was reported to stderr and compilation stopped.
    FailedWithErrors,
}

/// Driver switches.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompileFlags {
    /// Print the token vector to stdout after lexing.
    pub dump_tokens: bool,
    /// Print the node tree to stdout after parsing.
    pub dump_ast: bool,
}

/// Compiles `input`, reporting diagnostics to stderr.
///
/// When `output` is given the file is created for the downstream code
/// generator; this front end writes nothing into it.
pub fn compile_file(input: &Path, output: Option<&Path>, flags: CompileFlags) -> CompileResult {
    match run_pipeline(input, output, flags) {
        Ok(()) => CompileResult::Success,
        Err(error) => {
            eprintln!("{error}");
            CompileResult::FailedWithErrors
        }
    }
}

fn run_pipeline(input: &Path, output: Option<&Path>, flags: CompileFlags) -> anyhow::Result<()> {
    let file = Symbol::intern(&input.display().to_string());
    info!(input = %input.display(), "compiling");

    let source = FileSource::open(input).with_context(|| format!("could not open input file {}", input.display()))?;
    let tokens = LexProcess::new(source, file).lex()?;
    debug!(tokens = tokens.len(), "lexical analysis complete");
    if flags.dump_tokens {
        print!("{}", render_tokens(&tokens));
    }

    let handler = Handler::new();
    let parsed = minc_par::parse(tokens, file, &handler);
    for warning in handler.take() {
        eprintln!("{warning}");
    }
    let ast = parsed?;
    debug!(roots = ast.roots.len(), "parsing complete");
    if flags.dump_ast {
        print!("{}", render_ast(&ast));
    }

    if let Some(output) = output {
        File::create(output).with_context(|| format!("could not open output file {}", output.display()))?;
    }

    info!("compilation successful");
    Ok(())
}

/// Renders the token vector, one token per line. Diagnostic only.
pub fn render_tokens(tokens: &[Token]) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for token in tokens {
        let _ = write!(out, "{}:{}: ", token.pos.line, token.pos.column);
        let _ = match &token.kind {
            TokenKind::Identifier(name) => writeln!(out, "identifier {name}"),
            TokenKind::Keyword(name) => writeln!(out, "keyword {name}"),
            TokenKind::Operator(op) => writeln!(out, "operator {op}"),
            TokenKind::Symbol(symbol) => writeln!(out, "symbol {symbol}"),
            TokenKind::Str(text) => writeln!(out, "string {text:?}"),
            TokenKind::Comment(text) => writeln!(out, "comment {text:?}"),
            TokenKind::Newline => writeln!(out, "newline"),
            TokenKind::Number { value, kind } => writeln!(out, "number {value} ({kind:?})"),
        };
    }
    out
}

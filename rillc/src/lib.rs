///
/// rillc - The rill Language Front End
///
/// This crate provides a small C-like scripting language, rill, as an
/// embeddable pipeline. It includes:
///
/// - source: SourceBuffer, locations, ranges and character cursors
/// - lexer: Tokenizer and token filtering
/// - ast: Syntax tree, declaration contexts, visitor and dumper
/// - parser: Extensible precedence-climbing parser and the default grammar
/// - interpreter: Tree-walking evaluator
/// - diagnostic: miette reports for located errors
/// - config: `rill.toml` settings
///
/// Entry points:
/// - `tokenize`: Convert source text into tokens
/// - `parse_unit` / `parse_source`: Parse a program or a script
/// - `interpret` / `interpret_source`: Evaluate a parsed tree
/// - `run`: The whole pipeline over one buffer
///

pub mod ast;
pub mod config;
pub mod diagnostic;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod source;

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use ast::{AstDumper, Source, Unit};
pub use config::{Config, ConfigError};
pub use diagnostic::{DiagnosticReporter, RillDiagnostic};
pub use interpreter::{Context, RuntimeError, Value, interpret, interpret_source, interpret_with};
pub use lexer::{LexError, Token, TokenKind, Tokenizer, tokenize};
pub use parser::{ParseError, Parser, parse_source, parse_unit};
pub use source::{SourceBuffer, SourceError, SourceLocation, SourceRange};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Where the error happened, unknown for errors without a location.
    pub fn range(&self) -> SourceRange {
        match self {
            Error::Lex(err) => err.range(),
            Error::Parse(err) => err.range(),
            Error::Runtime(err) => err.range(),
            Error::Source(_) | Error::Config(_) | Error::Io { .. } => SourceRange::unknown(),
        }
    }

    /// The pipeline stage that raised the error.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Lex(_) | Error::Parse(ParseError::Lex(_)) => "syntax",
            Error::Parse(_) => "parse",
            Error::Runtime(_) => "runtime",
            Error::Config(_) => "config",
            Error::Source(_) | Error::Io { .. } => "input",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn read_source(path: &Path) -> Result<SourceBuffer> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SourceBuffer::new(path.display().to_string(), text))
}

/// Parses `buffer` as a program, runs `main` with `output` as the print
/// sink and returns the rendered result of `main`.
pub fn run(buffer: &SourceBuffer, config: &Config, output: impl Write) -> Result<String> {
    let unit = parse_unit(buffer)?;
    debug!(name = %buffer.name, decls = unit.decls.len(), "parsed unit");
    let mut ctx = Context::with_output(&unit.names, output).max_call_depth(config.interpreter.max_call_depth);
    let value = interpret_with(&unit, &mut ctx)?;
    Ok(value.to_string())
}

/// Parses `buffer` as a script and runs its statements in order.
pub fn run_script(buffer: &SourceBuffer, config: &Config, output: impl Write) -> Result<String> {
    let source = parse_source(buffer)?;
    debug!(name = %buffer.name, stmts = source.stmts.len(), "parsed script");
    let mut ctx = Context::with_output(&source.names, output).max_call_depth(config.interpreter.max_call_depth);
    let value = interpret_source(&source, &mut ctx)?;
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::SharedOutput;

    const PROGRAM: &str = r#"
const int LIMIT = 10;

func int fib(int n) {
    if (n < 2) return n;
    return fib(n - 1) + fib(n - 2);
}

func string label(int n) {
    switch (n % 3) {
        case 0: return "fizz";
        case 1: return "one";
        default: return "other";
    }
}

func int main() {
    var int total = 0;
    for (var i = 0; i < LIMIT; i++) {
        total += fib(i);
    }
    var s = "rill";
    print("total=", total, " ", label(total), " ", s[0], s.length);
    return total;
}
"#;

    #[test]
    fn test_run_program() {
        let buffer = SourceBuffer::new("program.rill", PROGRAM);
        let out = SharedOutput::new();
        let result = run(&buffer, &Config::default(), out.clone()).unwrap();
        assert_eq!(result, "88");
        assert_eq!(out.contents(), "total=88 one r4\n");
    }

    #[test]
    fn test_error_stages() {
        let lex = run(&SourceBuffer::anonymous("var s = \"open"), &Config::default(), std::io::sink());
        let err = lex.unwrap_err();
        assert_eq!(err.stage(), "syntax");
        assert_eq!(err.range().start, SourceLocation::new(1, 9));

        let parse = run(&SourceBuffer::anonymous("1 + 2;"), &Config::default(), std::io::sink());
        assert_eq!(parse.unwrap_err().stage(), "parse");

        let runtime = run(&SourceBuffer::anonymous("func main() { 1 / 0; }"), &Config::default(), std::io::sink());
        let err = runtime.unwrap_err();
        assert_eq!(err.stage(), "runtime");
        assert_eq!(err.to_string(), "division by zero");
    }

    #[test]
    fn test_run_script_honors_depth() {
        let mut config = Config::default();
        config.interpreter.max_call_depth = 4;
        let buffer = SourceBuffer::anonymous("func f(int n) { return f(n + 1); } f(0);");
        let err = run_script(&buffer, &config, std::io::sink()).unwrap_err();
        assert!(matches!(err, Error::Runtime(RuntimeError::CallDepthExceeded { limit: 4, .. })));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_source(Path::new("/definitely/not/here.rill")).unwrap_err();
        assert_eq!(err.stage(), "input");
        assert!(err.to_string().starts_with("cannot read /definitely/not/here.rill"));
    }
}

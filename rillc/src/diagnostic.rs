//!
//! Diagnostic Module - Rich Error Reporting
//!
//! Turns a pipeline error and the buffer it came from into a miette report
//! with the line and column in the message and the offending range
//! highlighted in a source snippet.
//!
//! Usage:
//!   let reporter = DiagnosticReporter::new(&buffer);
//!   reporter.report(&err);
//!

use miette::{Diagnostic, LabeledSpan, NamedSource, Report, SourceSpan};

use crate::Error;
use crate::interpreter::RuntimeError;
use crate::lexer::LexError;
use crate::parser::ParseError;
use crate::source::{SourceBuffer, SourceRange};

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RillDiagnostic {
    message: String,
    src: NamedSource<String>,
    span: Option<SourceSpan>,
    label: String,
    help_text: Option<String>,
}

impl Diagnostic for RillDiagnostic {
    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        self.span.map(|_| &self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_primary_with_span(
            Some(self.label.clone()),
            span,
        ))))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.help_text
            .as_ref()
            .map(|h| Box::new(h.clone()) as Box<dyn std::fmt::Display>)
    }
}

impl RillDiagnostic {
    pub fn from_error(err: &Error, source: &SourceBuffer) -> Self {
        let range = err.range();
        let span = byte_span(range, source);
        let message = match span {
            Some(_) => format!(
                "{} error at {}:{}: {}",
                err.stage(),
                range.start.line,
                range.start.column,
                err
            ),
            None => format!("{} error: {}", err.stage(), err),
        };

        Self {
            message,
            src: NamedSource::new(&source.name, source.text().to_string()),
            span,
            label: label_for(err),
            help_text: help_for(err),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Option<SourceSpan> {
        self.span
    }
}

fn byte_span(range: SourceRange, source: &SourceBuffer) -> Option<SourceSpan> {
    if range.is_unknown() {
        return None;
    }
    let start = source.offset(range.start)?;
    let end = source.offset(range.end).unwrap_or(start).max(start);
    Some((start, end - start).into())
}

fn label_for(err: &Error) -> String {
    match err {
        Error::Lex(lex) | Error::Parse(ParseError::Lex(lex)) => match lex {
            LexError::UnknownEscape { .. } => "unknown escape".to_string(),
            LexError::UnrecognizedCharacter { .. } => "not part of any token".to_string(),
            _ => "literal starts here".to_string(),
        },
        Error::Parse(ParseError::Expected { expected, .. }) => format!("expected {expected}"),
        Error::Parse(ParseError::ExpectedExpr { .. }) => "expected an expression".to_string(),
        Error::Parse(ParseError::ExpectedDeclaration { .. }) => "expected a declaration".to_string(),
        Error::Parse(ParseError::InvalidNumber { .. }) => "invalid number".to_string(),
        Error::Runtime(RuntimeError::UnresolvedSymbol { .. }) => "not found in any scope".to_string(),
        Error::Runtime(RuntimeError::DuplicateSymbol { .. }) => "already defined".to_string(),
        Error::Runtime(RuntimeError::DifferentTypes { lhs, rhs, .. }) => format!("{lhs} and {rhs}"),
        Error::Runtime(RuntimeError::ArgumentCount { expected, .. }) => format!("expected {expected} args"),
        _ => err.to_string(),
    }
}

fn help_for(err: &Error) -> Option<String> {
    let help = match err {
        Error::Lex(LexError::UnknownEscape { .. }) | Error::Parse(ParseError::Lex(LexError::UnknownEscape { .. })) => {
            "supported escapes are \\n \\t \\r \\0 \\\\ \\' and \\\""
        }
        Error::Parse(ParseError::ExpectedDeclaration { .. }) => {
            "a program holds only declarations; use `rill run --script` for statements"
        }
        Error::Runtime(RuntimeError::UnresolvedSymbol { .. }) => "check spelling or declare the variable",
        Error::Runtime(RuntimeError::DuplicateSymbol { .. }) => "rename or remove one of the definitions",
        Error::Runtime(RuntimeError::ConditionNotBool { .. }) => "compare explicitly, for example `x != 0`",
        Error::Runtime(RuntimeError::NoMainFunction) => "declare `func main() { ... }`",
        Error::Runtime(RuntimeError::CallDepthExceeded { .. }) => {
            "raise [interpreter] max_call_depth in rill.toml if the recursion is intended"
        }
        _ => return None,
    };
    Some(help.to_string())
}

pub struct DiagnosticReporter<'a> {
    source: &'a SourceBuffer,
}

impl<'a> DiagnosticReporter<'a> {
    pub fn new(source: &'a SourceBuffer) -> Self {
        Self { source }
    }

    pub fn diagnostic(&self, err: &Error) -> RillDiagnostic {
        RillDiagnostic::from_error(err, self.source)
    }

    pub fn report(&self, err: &Error) {
        let report = Report::new(self.diagnostic(err));
        eprintln!("ERROR: {:?}", report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceLocation;

    #[test]
    fn test_diagnostic_from_parse_error() {
        let source = SourceBuffer::new("test.rill", "func main() {\n  var = 1;\n}");
        let range = SourceRange::new(SourceLocation::new(2, 7), SourceLocation::new(2, 8));
        let err = Error::Parse(ParseError::expected("identifier", "punctuation \"=\"", range));

        let diag = RillDiagnostic::from_error(&err, &source);
        assert!(diag.message().contains("2:7"));
        assert!(diag.message().starts_with("parse error"));
        let span = diag.span().unwrap();
        assert_eq!(span.offset(), 20);
        assert_eq!(span.len(), 1);
    }

    #[test]
    fn test_diagnostic_from_runtime_error() {
        let source = SourceBuffer::new("test.rill", "func main() { x; }");
        let range = SourceRange::new(SourceLocation::new(1, 15), SourceLocation::new(1, 16));
        let err = Error::Runtime(RuntimeError::UnresolvedSymbol {
            name: "x".to_string(),
            range,
        });

        let diag = RillDiagnostic::from_error(&err, &source);
        assert!(diag.message().contains("unresolved symbol 'x'"));
        assert!(diag.help_text.is_some());
        assert_eq!(diag.labels().map(|labels| labels.count()), Some(1));
    }

    #[test]
    fn test_unlocated_error_has_no_snippet() {
        let source = SourceBuffer::new("test.rill", "var a = 1;");
        let err = Error::Runtime(RuntimeError::NoMainFunction);
        let diag = RillDiagnostic::from_error(&err, &source);
        assert_eq!(diag.message(), "runtime error: no main function");
        assert!(diag.source_code().is_none());
        assert!(diag.labels().is_none());
    }
}

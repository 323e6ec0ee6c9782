///
/// Parser Error Types
///
/// Parse errors carry the range of the token the parser was looking at when
/// the expectation failed, or the end of input. The first error aborts the
/// parse; there is no recovery.
///

use thiserror::Error;

use crate::lexer::LexError;
use crate::source::SourceRange;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expected {expected}, found {found}")]
    Expected {
        expected: String,
        found: String,
        range: SourceRange,
    },

    #[error("expected expression, found {found}")]
    ExpectedExpr { found: String, range: SourceRange },

    #[error("expected declaration, found {found}")]
    ExpectedDeclaration { found: String, range: SourceRange },

    #[error("invalid number literal '{text}'")]
    InvalidNumber { text: String, range: SourceRange },

    #[error("'{text}' is not a known {position} operator")]
    UnknownOperator { text: String, position: &'static str },

    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    pub fn expected(expected: impl Into<String>, found: impl Into<String>, range: SourceRange) -> Self {
        ParseError::Expected {
            expected: expected.into(),
            found: found.into(),
            range,
        }
    }

    pub fn range(&self) -> SourceRange {
        match self {
            ParseError::Expected { range, .. } => *range,
            ParseError::ExpectedExpr { range, .. } => *range,
            ParseError::ExpectedDeclaration { range, .. } => *range,
            ParseError::InvalidNumber { range, .. } => *range,
            ParseError::UnknownOperator { .. } => SourceRange::unknown(),
            ParseError::Lex(err) => err.range(),
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

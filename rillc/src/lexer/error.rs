///
/// Tokenizer Error Types
///
/// Every lexical error carries the range of the offending lexeme. The range
/// starts where the lexeme starts (the opening quote of a literal, the `/*`
/// of a comment), not where the problem was noticed.
///

use thiserror::Error;

use crate::source::SourceRange;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString { range: SourceRange },

    #[error("unterminated char literal")]
    UnterminatedChar { range: SourceRange },

    #[error("empty char literal")]
    EmptyChar { range: SourceRange },

    #[error("newline in char literal")]
    NewlineInChar { range: SourceRange },

    #[error("char literal holds more than one character")]
    CharTooLong { range: SourceRange },

    #[error("unknown escape sequence '\\{escape}'")]
    UnknownEscape { escape: char, range: SourceRange },

    #[error("unterminated block comment")]
    UnterminatedComment { range: SourceRange },

    #[error("unrecognized character {found:?}")]
    UnrecognizedCharacter { found: char, range: SourceRange },
}

impl LexError {
    pub fn range(&self) -> SourceRange {
        match self {
            LexError::UnterminatedString { range } => *range,
            LexError::UnterminatedChar { range } => *range,
            LexError::EmptyChar { range } => *range,
            LexError::NewlineInChar { range } => *range,
            LexError::CharTooLong { range } => *range,
            LexError::UnknownEscape { range, .. } => *range,
            LexError::UnterminatedComment { range } => *range,
            LexError::UnrecognizedCharacter { range, .. } => *range,
        }
    }
}

pub type LexResult<T> = Result<T, LexError>;

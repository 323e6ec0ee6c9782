//!
//! Token Definitions
//!
//! Tokens are the values exchanged between the tokenizer and the parser. A
//! token is a kind, the exact source range it was scanned from, and a payload
//! whose variant is fixed by the kind:
//!
//! - Identifier, Keyword, NumberLiteral, StringLiteral, Comment, WhiteSpace,
//!   EndOfLine, Other: Text
//! - CharLiteral: Char
//!
//! Number literals keep their text; classifying them as int or float is the
//! parser's job (see parser::literals).
//!

use std::fmt;

use serde::Serialize;

use crate::source::{SourceRange, Spanned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Identifier,
    Keyword(KeywordKind),
    NumberLiteral,
    StringLiteral,
    CharLiteral,
    Comment,
    WhiteSpace,
    EndOfLine,
    Other,
}

impl TokenKind {
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::WhiteSpace | TokenKind::EndOfLine | TokenKind::Comment
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::NumberLiteral | TokenKind::StringLiteral | TokenKind::CharLiteral
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier => f.write_str("identifier"),
            TokenKind::Keyword(kw) => write!(f, "keyword '{}'", kw.as_str()),
            TokenKind::NumberLiteral => f.write_str("number literal"),
            TokenKind::StringLiteral => f.write_str("string literal"),
            TokenKind::CharLiteral => f.write_str("char literal"),
            TokenKind::Comment => f.write_str("comment"),
            TokenKind::WhiteSpace => f.write_str("whitespace"),
            TokenKind::EndOfLine => f.write_str("end of line"),
            TokenKind::Other => f.write_str("punctuation"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KeywordKind {
    True,
    False,
    Null,
    Void,
    Bool,
    Int,
    Float,
    Char,
    String,
}

const KEYWORDS: [(&str, KeywordKind); 9] = [
    ("true", KeywordKind::True),
    ("false", KeywordKind::False),
    ("null", KeywordKind::Null),
    ("void", KeywordKind::Void),
    ("bool", KeywordKind::Bool),
    ("int", KeywordKind::Int),
    ("float", KeywordKind::Float),
    ("char", KeywordKind::Char),
    ("string", KeywordKind::String),
];

impl KeywordKind {
    pub fn from_text(text: &str) -> Option<KeywordKind> {
        KEYWORDS
            .iter()
            .find(|(word, _)| *word == text)
            .map(|(_, kw)| *kw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordKind::True => "true",
            KeywordKind::False => "false",
            KeywordKind::Null => "null",
            KeywordKind::Void => "void",
            KeywordKind::Bool => "bool",
            KeywordKind::Int => "int",
            KeywordKind::Float => "float",
            KeywordKind::Char => "char",
            KeywordKind::String => "string",
        }
    }

    pub fn is_type_name(&self) -> bool {
        !matches!(self, KeywordKind::True | KeywordKind::False | KeywordKind::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TokenValue {
    Text(String),
    Char(char),
}

#[derive(Debug, Clone, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceRange,
    pub value: TokenValue,
}

impl Token {
    pub fn text(kind: TokenKind, location: SourceRange, text: impl Into<String>) -> Self {
        debug_assert!(kind != TokenKind::CharLiteral, "char literals carry a Char payload");
        Self {
            kind,
            location,
            value: TokenValue::Text(text.into()),
        }
    }

    pub fn char(location: SourceRange, value: char) -> Self {
        Self {
            kind: TokenKind::CharLiteral,
            location,
            value: TokenValue::Char(value),
        }
    }

    /// Text payload; empty for char literals.
    pub fn as_str(&self) -> &str {
        match &self.value {
            TokenValue::Text(text) => text,
            TokenValue::Char(_) => "",
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self.value {
            TokenValue::Char(c) => Some(c),
            TokenValue::Text(_) => None,
        }
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    pub fn is_other(&self, text: &str) -> bool {
        self.kind == TokenKind::Other && self.as_str() == text
    }
}

/// Tokens are equal when kind and payload are; where they came from is not compared.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

impl Eq for Token {}

impl Spanned for Token {
    fn range(&self) -> SourceRange {
        self.location
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TokenValue::Char(c) => write!(f, "{} {:?}", self.kind, c),
            TokenValue::Text(text) => write!(f, "{} {:?}", self.kind, text),
        }
    }
}

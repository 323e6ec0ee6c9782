//!
//! Lexer Module - Located Tokenization
//!
//! This module turns a SourceBuffer into a lazy sequence of tokens. The
//! tokenizer is a single-level dispatch on the class of the current
//! character; its only state is a cursor into the buffer, so it can be
//! restarted or wrapped freely.
//!
//! Key design decisions:
//! - Every token carries its exact source range, end exclusive
//! - Trivia (whitespace, line breaks, comments) is produced, not dropped;
//!   consumers decide what to skip with TokenFilter
//! - Operators are matched greedily against a fixed table (`<<=` before
//!   `<<` before `<`)
//! - Errors abort tokenization; afterwards the tokenizer only yields None
//!
//! Token categories:
//! - Identifiers and reserved words
//! - Number, string and char literals
//! - Comments, whitespace, end of line
//! - Other: operators and punctuation
//!

mod error;
mod filter;
mod token;

pub use error::{LexError, LexResult};
pub use filter::{TokenFilter, TokenStreamExt, TRIVIA};
pub use token::{KeywordKind, Token, TokenKind, TokenValue};

use memchr::{memchr2, memmem};

use crate::source::{SourceBuffer, SourceIter, SourceLocation, SourceRange};

/// Longest first, so the first match is the greedy one.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "...",
    "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "<<", ">>", "->", "::",
    "+", "-", "*", "/", "%", "=", "<", ">", "!", "&", "|", "^", "~", "?", ":", ";", ",", ".",
    "(", ")", "[", "]", "{", "}",
];

fn unescape(c: char) -> Option<char> {
    match c {
        '\\' => Some('\\'),
        '"' => Some('"'),
        '\'' => Some('\''),
        '0' => Some('\0'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        _ => None,
    }
}

/// All meaningful tokens of `source`, trivia removed.
pub fn tokenize(source: &SourceBuffer) -> LexResult<Vec<Token>> {
    Tokenizer::new(source).without_trivia().collect()
}

/// Every token of `source`, trivia included.
pub fn tokenize_raw(source: &SourceBuffer) -> LexResult<Vec<Token>> {
    Tokenizer::new(source).collect()
}

pub struct Tokenizer<'src> {
    cursor: SourceIter<'src>,
    last: Option<Token>,
    failed: bool,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src SourceBuffer) -> Self {
        Self {
            cursor: source.iter(),
            last: None,
            failed: false,
        }
    }

    pub fn source(&self) -> &'src SourceBuffer {
        self.cursor.buffer()
    }

    pub fn location(&self) -> SourceLocation {
        self.cursor.location()
    }

    /// The most recently produced token.
    pub fn last(&self) -> Option<&Token> {
        self.last.as_ref()
    }

    /// Next token, or None once the input is exhausted. Calling again at the
    /// end keeps returning None.
    pub fn tokenize(&mut self) -> LexResult<Option<Token>> {
        if self.failed || self.cursor.is_at_end() {
            return Ok(None);
        }
        match self.scan() {
            Ok(token) => {
                self.last = Some(token.clone());
                Ok(Some(token))
            }
            Err(err) => {
                self.failed = true;
                Err(err)
            }
        }
    }

    fn scan(&mut self) -> LexResult<Token> {
        let start = self.cursor.offset();
        let start_loc = self.cursor.location();
        let Some(first) = self.cursor.next() else {
            unreachable!("scan called at end of input");
        };

        match first.ch {
            c if c == '_' || c.is_alphabetic() => Ok(self.scan_identifier(start, start_loc)),
            c if c.is_ascii_digit() => Ok(self.scan_number(start, start_loc, c)),
            '"' => self.scan_string(start_loc),
            '\'' => self.scan_char(start_loc),
            '\n' => Ok(self.finish(TokenKind::EndOfLine, start, start_loc)),
            '\r' => {
                if self.cursor.peek() == Some('\n') {
                    self.cursor.next();
                }
                Ok(self.finish(TokenKind::EndOfLine, start, start_loc))
            }
            c if c.is_whitespace() => {
                while matches!(self.cursor.peek(), Some(c) if c.is_whitespace() && c != '\n' && c != '\r')
                {
                    self.cursor.next();
                }
                Ok(self.finish(TokenKind::WhiteSpace, start, start_loc))
            }
            '/' if self.cursor.peek() == Some('/') => {
                let rest = self.cursor.rest().as_bytes();
                let end = match memchr2(b'\n', b'\r', rest) {
                    Some(found) => self.cursor.offset() + found,
                    None => self.source().size(),
                };
                self.cursor.seek(end);
                Ok(self.finish(TokenKind::Comment, start, start_loc))
            }
            '/' if self.cursor.peek() == Some('*') => {
                self.cursor.next();
                match memmem::find(self.cursor.rest().as_bytes(), b"*/") {
                    Some(found) => {
                        let end = self.cursor.offset() + found + 2;
                        self.cursor.seek(end);
                        Ok(self.finish(TokenKind::Comment, start, start_loc))
                    }
                    None => {
                        let end = self.source().size();
                        self.cursor.seek(end);
                        Err(LexError::UnterminatedComment {
                            range: self.range_from(start_loc),
                        })
                    }
                }
            }
            c => self.scan_operator(start, start_loc, c),
        }
    }

    fn range_from(&self, start: SourceLocation) -> SourceRange {
        SourceRange::new(start, self.cursor.location())
    }

    fn finish(&self, kind: TokenKind, start: usize, start_loc: SourceLocation) -> Token {
        let text = &self.source().text()[start..self.cursor.offset()];
        Token::text(kind, self.range_from(start_loc), text)
    }

    fn scan_identifier(&mut self, start: usize, start_loc: SourceLocation) -> Token {
        while matches!(self.cursor.peek(), Some(c) if c == '_' || c.is_alphanumeric()) {
            self.cursor.next();
        }
        let text = &self.source().text()[start..self.cursor.offset()];
        let kind = match KeywordKind::from_text(text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier,
        };
        Token::text(kind, self.range_from(start_loc), text)
    }

    /// Recognizes the extent of a number. Whether the text is a valid int or
    /// float is decided by the parser.
    fn scan_number(&mut self, start: usize, start_loc: SourceLocation, first: char) -> Token {
        let radix = first == '0' && matches!(self.cursor.peek(), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'));
        let mut fractional = radix;

        loop {
            match self.cursor.peek() {
                Some(c) if c == '_' || c.is_alphanumeric() => {
                    self.cursor.next();
                    let exponent = !radix && matches!(c, 'e' | 'E');
                    if exponent {
                        fractional = true;
                        if matches!(self.cursor.peek(), Some('+' | '-'))
                            && matches!(self.cursor.peek_nth(1), Some(d) if d.is_ascii_digit())
                        {
                            self.cursor.next();
                        }
                    }
                }
                Some('.')
                    if !fractional
                        && matches!(self.cursor.peek_nth(1), Some(d) if d.is_ascii_digit()) =>
                {
                    fractional = true;
                    self.cursor.next();
                }
                _ => break,
            }
        }

        self.finish(TokenKind::NumberLiteral, start, start_loc)
    }

    fn scan_escape(&mut self, start_loc: SourceLocation) -> LexResult<Option<char>> {
        let Some(escaped) = self.cursor.next() else {
            return Ok(None);
        };
        match unescape(escaped.ch) {
            Some(c) => Ok(Some(c)),
            None => Err(LexError::UnknownEscape {
                escape: escaped.ch,
                range: self.range_from(start_loc),
            }),
        }
    }

    fn scan_string(&mut self, start_loc: SourceLocation) -> LexResult<Token> {
        let mut value = String::new();
        loop {
            let Some(next) = self.cursor.next() else {
                return Err(LexError::UnterminatedString {
                    range: self.range_from(start_loc),
                });
            };
            match next.ch {
                '"' => break,
                '\\' => match self.scan_escape(start_loc)? {
                    Some(c) => value.push(c),
                    None => {
                        return Err(LexError::UnterminatedString {
                            range: self.range_from(start_loc),
                        });
                    }
                },
                c => value.push(c),
            }
        }
        Ok(Token::text(TokenKind::StringLiteral, self.range_from(start_loc), value))
    }

    fn scan_char(&mut self, start_loc: SourceLocation) -> LexResult<Token> {
        let value = match self.cursor.peek() {
            None => {
                return Err(LexError::UnterminatedChar {
                    range: self.range_from(start_loc),
                });
            }
            Some('\'') => {
                self.cursor.next();
                return Err(LexError::EmptyChar {
                    range: self.range_from(start_loc),
                });
            }
            Some('\n' | '\r') => {
                return Err(LexError::NewlineInChar {
                    range: self.range_from(start_loc),
                });
            }
            Some('\\') => {
                self.cursor.next();
                match self.scan_escape(start_loc)? {
                    Some(c) => c,
                    None => {
                        return Err(LexError::UnterminatedChar {
                            range: self.range_from(start_loc),
                        });
                    }
                }
            }
            Some(c) => {
                self.cursor.next();
                c
            }
        };

        match self.cursor.peek() {
            Some('\'') => {
                self.cursor.next();
                Ok(Token::char(self.range_from(start_loc), value))
            }
            None | Some('\n' | '\r') => Err(LexError::UnterminatedChar {
                range: self.range_from(start_loc),
            }),
            Some(_) => {
                // Too long if the quote closes on this line, unterminated otherwise.
                while let Some(c) = self.cursor.peek() {
                    match c {
                        '\'' => {
                            self.cursor.next();
                            return Err(LexError::CharTooLong {
                                range: self.range_from(start_loc),
                            });
                        }
                        '\n' | '\r' => break,
                        _ => {
                            self.cursor.next();
                        }
                    }
                }
                Err(LexError::UnterminatedChar {
                    range: self.range_from(start_loc),
                })
            }
        }
    }

    fn scan_operator(&mut self, start: usize, start_loc: SourceLocation, first: char) -> LexResult<Token> {
        let rest = &self.source().text()[start..];
        let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
            return Err(LexError::UnrecognizedCharacter {
                found: first,
                range: self.range_from(start_loc),
            });
        };
        for _ in 1..op.len() {
            self.cursor.next();
        }
        Ok(Token::text(TokenKind::Other, self.range_from(start_loc), *op))
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.tokenize().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> Vec<Token> {
        tokenize(&SourceBuffer::anonymous(text)).unwrap()
    }

    fn lex_err(text: &str) -> LexError {
        tokenize(&SourceBuffer::anonymous(text)).unwrap_err()
    }

    fn pairs(tokens: &[Token]) -> Vec<(TokenKind, String)> {
        tokens.iter().map(|t| (t.kind, t.as_str().to_string())).collect()
    }

    fn loc(line: u32, column: u32) -> SourceLocation {
        SourceLocation::new(line, column)
    }

    #[test]
    fn test_tokenize_empty() {
        let source = SourceBuffer::anonymous("");
        let mut tokenizer = Tokenizer::new(&source);
        assert_eq!(tokenizer.tokenize(), Ok(None));
        assert_eq!(tokenizer.tokenize(), Ok(None));
    }

    #[test]
    fn test_tokenize_declaration() {
        let tokens = lex("var i = 8;");
        assert_eq!(
            pairs(&tokens),
            vec![
                (TokenKind::Identifier, "var".to_string()),
                (TokenKind::Identifier, "i".to_string()),
                (TokenKind::Other, "=".to_string()),
                (TokenKind::NumberLiteral, "8".to_string()),
                (TokenKind::Other, ";".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_keywords() {
        let tokens = lex("int x true null return");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(KeywordKind::Int),
                TokenKind::Identifier,
                TokenKind::Keyword(KeywordKind::True),
                TokenKind::Keyword(KeywordKind::Null),
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_tokenize_operators_greedy() {
        let tokens = lex("a <<= b << c < d ++ -> ...");
        let ops: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Other)
            .map(|t| t.as_str().to_string())
            .collect();
        assert_eq!(ops, vec!["<<=", "<<", "<", "++", "->", "..."]);
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = lex("42 3.14 1_000 0x1F 2e10 6.02e-23 1.x");
        let texts: Vec<_> = tokens.iter().map(|t| t.as_str()).collect();
        assert_eq!(texts, vec!["42", "3.14", "1_000", "0x1F", "2e10", "6.02e-23", "1", ".", "x"]);
    }

    #[test]
    fn test_tokenize_string_escapes() {
        let tokens = lex(r#""a\tb\n\"q\"\\ \0""#);
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].as_str(), "a\tb\n\"q\"\\ \0");
    }

    #[test]
    fn test_tokenize_char_literals() {
        let tokens = lex(r"'a' '\n' '\''");
        let chars: Vec<_> = tokens.iter().map(|t| t.as_char()).collect();
        assert_eq!(chars, vec![Some('a'), Some('\n'), Some('\'')]);
    }

    #[test]
    fn test_char_errors_are_distinct() {
        assert!(matches!(lex_err("''"), LexError::EmptyChar { .. }));
        assert!(matches!(lex_err("'ab'"), LexError::CharTooLong { .. }));
        assert!(matches!(lex_err("'\n'"), LexError::NewlineInChar { .. }));
        assert!(matches!(lex_err("'a"), LexError::UnterminatedChar { .. }));
        assert!(matches!(lex_err("'ab\n'"), LexError::UnterminatedChar { .. }));
    }

    #[test]
    fn test_errors_report_lexeme_start() {
        let err = lex_err("x = \"abc");
        assert!(matches!(err, LexError::UnterminatedString { .. }));
        assert_eq!(err.range().start, loc(1, 5));

        let err = lex_err("x = \"a\\qb\"");
        assert_eq!(err, LexError::UnknownEscape { escape: 'q', range: SourceRange::new(loc(1, 5), loc(1, 9)) });

        let err = lex_err("a\n  /* open\n\n");
        assert!(matches!(err, LexError::UnterminatedComment { .. }));
        assert_eq!(err.range().start, loc(2, 3));
    }

    #[test]
    fn test_unrecognized_character() {
        let err = lex_err("a @ b");
        assert_eq!(
            err,
            LexError::UnrecognizedCharacter { found: '@', range: SourceRange::new(loc(1, 3), loc(1, 4)) }
        );
    }

    #[test]
    fn test_tokenizer_stops_after_error() {
        let source = SourceBuffer::anonymous("@ a b");
        let mut tokenizer = Tokenizer::new(&source);
        assert!(tokenizer.tokenize().is_err());
        assert_eq!(tokenizer.tokenize(), Ok(None));
    }

    #[test]
    fn test_line_comment_leaves_newline() {
        let source = SourceBuffer::anonymous("// note\r\nx");
        let tokens = tokenize_raw(&source).unwrap();
        assert_eq!(
            pairs(&tokens),
            vec![
                (TokenKind::Comment, "// note".to_string()),
                (TokenKind::EndOfLine, "\r\n".to_string()),
                (TokenKind::Identifier, "x".to_string()),
            ]
        );
        assert_eq!(tokens[2].location.start, loc(2, 1));
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let source = SourceBuffer::anonymous("/* a\nb */ c");
        let tokens = tokenize_raw(&source).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].location, SourceRange::new(loc(1, 1), loc(2, 5)));
        assert_eq!(tokens[2].location.start, loc(2, 6));
    }

    #[test]
    fn test_end_of_line_per_break() {
        let source = SourceBuffer::anonymous("a\r\n\r\n\nb");
        let tokens = tokenize_raw(&source).unwrap();
        let breaks = tokens.iter().filter(|t| t.kind == TokenKind::EndOfLine).count();
        assert_eq!(breaks, 3);
        assert_eq!(tokens.last().unwrap().location.start, loc(4, 1));
    }

    #[test]
    fn test_spans_slice_back_to_source() {
        let text = "var x = 0x2A; // answer\nprint(x, 'c', \"s\");\n/* z */";
        let source = SourceBuffer::anonymous(text);
        for token in tokenize_raw(&source).unwrap() {
            let slice = source.slice(token.location).unwrap();
            match token.kind {
                TokenKind::StringLiteral => assert_eq!(slice, format!("\"{}\"", token.as_str())),
                TokenKind::CharLiteral => assert_eq!(slice, format!("'{}'", token.as_char().unwrap())),
                _ => assert_eq!(slice, token.as_str()),
            }
        }
    }

    #[test]
    fn test_last_token_is_tracked() {
        let source = SourceBuffer::anonymous("a b");
        let mut tokenizer = Tokenizer::new(&source);
        assert!(Tokenizer::last(&tokenizer).is_none());
        tokenizer.tokenize().unwrap();
        assert_eq!(Tokenizer::last(&tokenizer).map(|t| t.as_str()), Some("a"));
    }
}

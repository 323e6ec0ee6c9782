//!
//! Token Filtering
//!
//! Wraps any token sequence and drops the tokens whose kind is in a fixed
//! skip set, usually whitespace, line breaks and comments. Skipping is eager:
//! building the filter or taking an item immediately moves past the next run
//! of skipped tokens, so `peek` always shows the next meaningful token.
//!
//! Errors from the wrapped sequence are passed through untouched.
//!

use smallvec::SmallVec;

use super::error::LexResult;
use super::token::{Token, TokenKind};

pub const TRIVIA: [TokenKind; 3] = [TokenKind::WhiteSpace, TokenKind::EndOfLine, TokenKind::Comment];

pub struct TokenFilter<I> {
    inner: I,
    skip: SmallVec<[TokenKind; 4]>,
    pending: Option<LexResult<Token>>,
}

impl<I> TokenFilter<I>
where
    I: Iterator<Item = LexResult<Token>>,
{
    pub fn new(inner: I, skip: impl IntoIterator<Item = TokenKind>) -> Self {
        let mut filter = Self {
            inner,
            skip: skip.into_iter().collect(),
            pending: None,
        };
        filter.fill();
        filter
    }

    pub fn skips(&self, kind: TokenKind) -> bool {
        self.skip.contains(&kind)
    }

    pub fn peek(&self) -> Option<&LexResult<Token>> {
        self.pending.as_ref()
    }

    fn fill(&mut self) {
        self.pending = loop {
            match self.inner.next() {
                Some(Ok(token)) if self.skips(token.kind) => continue,
                other => break other,
            }
        };
    }
}

impl<I> Iterator for TokenFilter<I>
where
    I: Iterator<Item = LexResult<Token>>,
{
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.pending.take()?;
        self.fill();
        Some(item)
    }
}

pub trait TokenStreamExt: Iterator<Item = LexResult<Token>> + Sized {
    fn filtered(self, skip: impl IntoIterator<Item = TokenKind>) -> TokenFilter<Self> {
        TokenFilter::new(self, skip)
    }

    fn without_trivia(self) -> TokenFilter<Self> {
        TokenFilter::new(self, TRIVIA)
    }
}

impl<I: Iterator<Item = LexResult<Token>>> TokenStreamExt for I {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Tokenizer;
    use crate::source::SourceBuffer;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_filter_skips_trivia() {
        let source = SourceBuffer::anonymous("a /* c */ b // tail\n  c");
        let tokens: Vec<Token> = Tokenizer::new(&source)
            .without_trivia()
            .collect::<LexResult<_>>()
            .unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::Identifier]
        );
    }

    #[test]
    fn test_filter_is_eager() {
        let source = SourceBuffer::anonymous("   \n\n // only trivia\n");
        let filter = Tokenizer::new(&source).without_trivia();
        assert!(filter.peek().is_none());
    }

    #[test]
    fn test_filter_twice_is_identity() {
        let source = SourceBuffer::anonymous("var x = 1; // set\n/* block */ x += 2;\r\n");
        let once: Vec<_> = Tokenizer::new(&source).without_trivia().collect();
        let twice: Vec<_> = Tokenizer::new(&source)
            .without_trivia()
            .without_trivia()
            .collect();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 9);
    }

    #[test]
    fn test_filter_custom_kind_set() {
        let source = SourceBuffer::anonymous("a b\nc");
        let tokens: Vec<Token> = Tokenizer::new(&source)
            .filtered([TokenKind::WhiteSpace])
            .collect::<LexResult<_>>()
            .unwrap();
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::EndOfLine,
                TokenKind::Identifier
            ]
        );
    }

    #[test]
    fn test_filter_passes_errors_through() {
        let source = SourceBuffer::anonymous("a \"open");
        let items: Vec<_> = Tokenizer::new(&source).without_trivia().collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(items[1].is_err());
    }
}

///
/// Parser Module - Extensible Recursive Descent
///
/// This module turns a filtered token stream into an AST. The parser core
/// knows how to parse expressions by precedence climbing and how to
/// dispatch statements, but the concrete grammar lives in tables:
///
/// - statement handlers keyed by the text of their leading token
/// - binary, prefix and postfix operator texts
///
/// `grammar::install` fills the tables with rill's default grammar.
/// Embedding tools register more handlers or operators on top without
/// touching the core.
///
/// Module structure:
/// - error: ParseError
/// - literals: number literal classification
/// - expressions: precedence climbing, prefix/postfix/primary parsing
/// - grammar: the default statement and declaration handlers
///
/// Entry points: parse_unit() for programs (declarations only) and
/// parse_source() for statement lists.
///

mod error;
mod expressions;
pub mod grammar;
pub mod literals;

pub use error::{ParseError, ParseResult};
pub use expressions::{BinaryRule, OperatorTable, PostfixRule};

use std::rc::Rc;

use indexmap::IndexMap;
use lasso::{Rodeo, Spur};
use tracing::{debug, trace};

use crate::ast::{
    CompoundStmt, ContextId, ContextKind, DeclId, DeclTree, ExprStmt, Ident, NameTable, Source,
    Stmt, TypeRef, TypeRegistry, Unit,
};
use crate::lexer::{Token, TokenFilter, TokenKind, TokenStreamExt, Tokenizer};
use crate::source::{SourceBuffer, SourceLocation, SourceRange, Spanned};

pub type StmtHandler<'src> = Rc<dyn Fn(&mut Parser<'src>) -> ParseResult<Stmt> + 'src>;

pub struct Parser<'src> {
    tokens: TokenFilter<Tokenizer<'src>>,
    current: Option<Token>,
    previous_end: SourceLocation,
    source_end: SourceLocation,
    stmt_parsers: IndexMap<String, StmtHandler<'src>>,
    operators: OperatorTable,
    types: &'src TypeRegistry,
    names: Rodeo,
    contexts: DeclTree,
    scope: ContextId,
    next_decl: u32,
}

impl<'src> Parser<'src> {
    /// A parser with empty grammar tables.
    pub fn new(source: &'src SourceBuffer, types: &'src TypeRegistry) -> ParseResult<Self> {
        let mut tokens = Tokenizer::new(source).without_trivia();
        let current = tokens.next().transpose()?;
        let mut names = Rodeo::default();
        names.get_or_intern_static("return");
        names.get_or_intern_static("main");
        names.get_or_intern_static("print");

        Ok(Self {
            tokens,
            current,
            previous_end: SourceLocation::new(1, 1),
            source_end: source.location(source.size()),
            stmt_parsers: IndexMap::new(),
            operators: OperatorTable::default(),
            types,
            names,
            contexts: DeclTree::new(),
            scope: ContextId::GLOBAL,
            next_decl: 0,
        })
    }

    pub fn with_default_grammar(source: &'src SourceBuffer, types: &'src TypeRegistry) -> ParseResult<Self> {
        let mut parser = Self::new(source, types)?;
        grammar::install(&mut parser)?;
        Ok(parser)
    }

    pub fn add_stmt_parser(
        &mut self,
        text: impl Into<String>,
        handler: impl Fn(&mut Parser<'src>) -> ParseResult<Stmt> + 'src,
    ) {
        self.stmt_parsers.insert(text.into(), Rc::new(handler));
    }

    pub fn add_binary_operator(&mut self, text: &str) -> ParseResult<()> {
        self.operators.add_binary(text)
    }

    pub fn add_prefix_operator(&mut self, text: &str) -> ParseResult<()> {
        self.operators.add_prefix(text)
    }

    pub fn add_postfix_operator(&mut self, text: &str) -> ParseResult<()> {
        self.operators.add_postfix(text)
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    pub fn types(&self) -> &'src TypeRegistry {
        self.types
    }

    /// Range of the current token, or an empty range at the end of input.
    pub fn location(&self) -> SourceRange {
        match &self.current {
            Some(token) => token.location,
            None => SourceRange::new(self.source_end, self.source_end),
        }
    }

    /// End of the last consumed token.
    pub fn previous_end(&self) -> SourceLocation {
        self.previous_end
    }

    pub fn token(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Consumes the current token and returns it.
    pub fn next(&mut self) -> ParseResult<Option<Token>> {
        let upcoming = self.tokens.next().transpose()?;
        let consumed = std::mem::replace(&mut self.current, upcoming);
        if let Some(token) = &consumed {
            self.previous_end = token.location.end;
        }
        Ok(consumed)
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.current.as_ref().is_some_and(|t| t.kind == kind)
    }

    pub fn is_other(&self, text: &str) -> bool {
        self.current.as_ref().is_some_and(|t| t.is_other(text))
    }

    pub fn is_identifier(&self, text: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|t| t.kind == TokenKind::Identifier && t.as_str() == text)
    }

    /// Whether the token after the current one is an identifier.
    pub fn peek_is_identifier(&self) -> bool {
        matches!(self.tokens.peek(), Some(Ok(t)) if t.kind == TokenKind::Identifier)
    }

    pub fn match_other(&mut self, text: &str) -> ParseResult<bool> {
        if self.is_other(text) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn require_other(&mut self, text: &str) -> ParseResult<Token> {
        match self.take_if(|t| t.is_other(text))? {
            Some(token) => Ok(token),
            None => Err(self.error_expected(format!("'{text}'"))),
        }
    }

    pub fn require_identifier(&mut self, text: &str) -> ParseResult<Token> {
        match self.take_if(|t| t.kind == TokenKind::Identifier && t.as_str() == text)? {
            Some(token) => Ok(token),
            None => Err(self.error_expected(format!("'{text}'"))),
        }
    }

    pub fn check_identifier(&self) -> ParseResult<()> {
        if self.is(TokenKind::Identifier) {
            Ok(())
        } else {
            Err(self.error_expected("identifier"))
        }
    }

    /// Consumes an identifier and interns it.
    pub fn expect_ident(&mut self) -> ParseResult<Ident> {
        self.check_identifier()?;
        match self.next()? {
            Some(token) => Ok(Ident::new(self.names.get_or_intern(token.as_str()), token.location)),
            None => Err(self.error_expected("identifier")),
        }
    }

    pub fn intern(&mut self, text: &str) -> Spur {
        self.names.get_or_intern(text)
    }

    pub fn resolve(&self, symbol: Spur) -> &str {
        self.names.resolve(&symbol)
    }

    fn take_if(&mut self, accept: impl Fn(&Token) -> bool) -> ParseResult<Option<Token>> {
        if self.current.as_ref().is_some_and(accept) {
            self.next()
        } else {
            Ok(None)
        }
    }

    /// Human-readable description of the current token.
    pub fn found(&self) -> String {
        match &self.current {
            Some(token) => token.to_string(),
            None => "end of input".to_string(),
        }
    }

    pub fn error_expected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::expected(expected, self.found(), self.location())
    }

    pub fn scope(&self) -> ContextId {
        self.scope
    }

    pub fn contexts(&self) -> &DeclTree {
        &self.contexts
    }

    /// Records `name` in the current declaration context under a fresh id.
    pub fn declare(&mut self, name: &Ident) -> DeclId {
        let id = DeclId(self.next_decl);
        self.next_decl += 1;
        self.contexts.add_declaration(self.scope, name.symbol, id);
        id
    }

    /// Runs `f` inside a new child context of the current one.
    pub fn with_context<T>(
        &mut self,
        kind: ContextKind,
        owner: Option<DeclId>,
        f: impl FnOnce(&mut Self, ContextId) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let outer = self.scope;
        let inner = self.contexts.push(kind, outer, owner);
        self.scope = inner;
        let result = f(self, inner);
        self.scope = outer;
        result
    }

    /// Optional type annotation: a type keyword, or an identifier directly
    /// followed by another identifier.
    pub fn parse_type(&mut self) -> ParseResult<Option<TypeRef>> {
        let Some(kind) = self.current.as_ref().map(|t| t.kind) else {
            return Ok(None);
        };
        match kind {
            TokenKind::Keyword(keyword) => match self.types.resolve_keyword(keyword) {
                Some(builtin) => {
                    self.next()?;
                    Ok(Some(TypeRef::Builtin(builtin)))
                }
                None => Ok(None),
            },
            TokenKind::Identifier if self.peek_is_identifier() => {
                Ok(Some(TypeRef::Named(self.expect_ident()?)))
            }
            _ => Ok(None),
        }
    }

    pub fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        let handler = self
            .current
            .as_ref()
            .filter(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::Other))
            .and_then(|t| self.stmt_parsers.get(t.as_str()))
            .cloned();
        if let Some(handler) = handler {
            return handler(self);
        }

        let expr = self.parse_expr()?;
        let end = self.require_other(";")?;
        Ok(Stmt::Expr(ExprStmt {
            range: expr.range().merge(end.location),
            expr,
        }))
    }

    /// `{ stmt* }` whose declarations go into `context`.
    pub fn parse_compound_body(&mut self, context: ContextId) -> ParseResult<CompoundStmt> {
        let open = self.require_other("{")?;
        let outer = std::mem::replace(&mut self.scope, context);
        let mut stmts = Vec::new();
        let result = loop {
            if self.is_other("}") || self.is_empty() {
                break self.require_other("}");
            }
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => break Err(err),
            }
        };
        self.scope = outer;
        let close = result?;
        Ok(CompoundStmt {
            stmts,
            context,
            range: open.location.merge(close.location),
        })
    }

    /// `{ stmt* }` in a fresh block context.
    pub fn parse_block(&mut self) -> ParseResult<CompoundStmt> {
        self.with_context(ContextKind::Block, None, |p, block| p.parse_compound_body(block))
    }

    /// Comma-style list. Stops before the end token without consuming it;
    /// between items `consume_separator` must return true.
    pub fn parse_list<T>(
        &mut self,
        mut parse_item: impl FnMut(&mut Self) -> ParseResult<T>,
        is_end: impl Fn(&Self) -> bool,
        consume_separator: impl Fn(&mut Self) -> ParseResult<bool>,
    ) -> ParseResult<Vec<T>> {
        let mut items = Vec::new();
        if is_end(self) {
            return Ok(items);
        }
        loop {
            items.push(parse_item(self)?);
            if is_end(self) {
                return Ok(items);
            }
            if !consume_separator(self)? {
                return Err(self.error_expected("separator"));
            }
        }
    }

    pub fn parse_unit(mut self) -> ParseResult<Unit> {
        debug!("parsing unit");
        let mut decls = Vec::new();
        let mut range = SourceRange::unknown();
        while !self.is_empty() {
            let at = self.location();
            let found = self.found();
            match self.parse_stmt()? {
                Stmt::Decl(stmt) => {
                    range = range.merge(stmt.range);
                    decls.push(*stmt.decl);
                }
                _ => return Err(ParseError::ExpectedDeclaration { found, range: at }),
            }
        }
        trace!(decls = decls.len(), contexts = self.contexts.len(), "parsed unit");
        Ok(Unit {
            decls,
            range,
            names: NameTable::freeze(self.names),
            contexts: self.contexts,
        })
    }

    pub fn parse_source(mut self) -> ParseResult<Source> {
        debug!("parsing source");
        let mut stmts = Vec::new();
        let mut range = SourceRange::unknown();
        while !self.is_empty() {
            let stmt = self.parse_stmt()?;
            range = range.merge(stmt.range());
            stmts.push(stmt);
        }
        trace!(stmts = stmts.len(), "parsed source");
        Ok(Source {
            stmts,
            range,
            names: NameTable::freeze(self.names),
            contexts: self.contexts,
        })
    }
}

/// Parses a program with the default grammar.
pub fn parse_unit(source: &SourceBuffer) -> ParseResult<Unit> {
    let types = TypeRegistry::new();
    Parser::with_default_grammar(source, &types)?.parse_unit()
}

/// Parses a statement list with the default grammar.
pub fn parse_source(source: &SourceBuffer) -> ParseResult<Source> {
    let types = TypeRegistry::new();
    Parser::with_default_grammar(source, &types)?.parse_source()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Decl, Expr, IntLiteralExpr, StmtKind};

    fn buffer(text: &str) -> SourceBuffer {
        SourceBuffer::anonymous(text)
    }

    fn loc(line: u32, column: u32) -> SourceLocation {
        SourceLocation::new(line, column)
    }

    #[test]
    fn test_binary_expression_statement() {
        let source = buffer("5 + 2;");
        let types = TypeRegistry::new();
        let mut parser = Parser::new(&source, &types).unwrap();
        parser.add_binary_operator("+").unwrap();
        let parsed = parser.parse_source().unwrap();

        assert_eq!(parsed.stmts.len(), 1);
        let Stmt::Expr(stmt) = &parsed.stmts[0] else {
            panic!("expected an expression statement");
        };
        let Expr::Binary(binary) = &stmt.expr else {
            panic!("expected a binary expression");
        };
        assert_eq!(binary.op, BinaryOp::Add);
        assert!(matches!(*binary.lhs, Expr::IntLiteral(IntLiteralExpr { value: 5, .. })));
        assert!(matches!(*binary.rhs, Expr::IntLiteral(IntLiteralExpr { value: 2, .. })));
        assert_eq!(binary.range, SourceRange::new(loc(1, 1), loc(1, 6)));
    }

    #[test]
    fn test_unregistered_operator_is_not_an_operator() {
        let source = buffer("5 + 2;");
        let types = TypeRegistry::new();
        let parser = Parser::new(&source, &types).unwrap();
        let err = parser.parse_source().unwrap_err();
        assert_eq!(
            err,
            ParseError::expected("';'", "punctuation \"+\"", SourceRange::new(loc(1, 3), loc(1, 4)))
        );
    }

    #[test]
    fn test_unknown_operator_registration() {
        let source = buffer("");
        let types = TypeRegistry::new();
        let mut parser = Parser::new(&source, &types).unwrap();
        assert!(matches!(
            parser.add_binary_operator("<<"),
            Err(ParseError::UnknownOperator { .. })
        ));
        assert!(parser.add_postfix_operator("[").is_ok());
        assert!(parser.add_prefix_operator("(").is_err());
    }

    #[test]
    fn test_custom_statement_handler() {
        let source = buffer("skip; skip; 1;");
        let types = TypeRegistry::new();
        let mut parser = Parser::with_default_grammar(&source, &types).unwrap();
        parser.add_stmt_parser("skip", |p: &mut Parser<'_>| {
            let start = p.require_identifier("skip")?;
            let end = p.require_other(";")?;
            Ok(Stmt::Break(crate::ast::BreakStmt {
                range: start.location.merge(end.location),
            }))
        });
        let parsed = parser.parse_source().unwrap();
        let kinds: Vec<_> = parsed.stmts.iter().map(Stmt::kind).collect();
        assert_eq!(kinds, vec![StmtKind::Break, StmtKind::Break, StmtKind::Expr]);
    }

    #[test]
    fn test_query_surface() {
        let source = buffer("foo ( bar , baz )");
        let types = TypeRegistry::new();
        let mut parser = Parser::new(&source, &types).unwrap();
        assert!(parser.is(TokenKind::Identifier));
        assert!(parser.check_identifier().is_ok());
        assert!(parser.require_identifier("bar").is_err());
        assert!(parser.require_identifier("foo").is_ok());
        assert!(parser.check_identifier().is_err());
        assert!(parser.match_other("(").unwrap());
        assert!(!parser.match_other("(").unwrap());

        let items = parser
            .parse_list(
                |p| p.expect_ident(),
                |p| p.is_other(")"),
                |p| p.match_other(","),
            )
            .unwrap();
        let names: Vec<_> = items.iter().map(|i| parser.resolve(i.symbol).to_string()).collect();
        assert_eq!(names, vec!["bar", "baz"]);
        parser.require_other(")").unwrap();
        assert!(parser.is_empty());
        assert_eq!(parser.location(), SourceRange::new(loc(1, 18), loc(1, 18)));
        assert_eq!(parser.next().unwrap(), None);
    }

    #[test]
    fn test_parse_list_requires_separator() {
        let source = buffer("(a b)");
        let types = TypeRegistry::new();
        let mut parser = Parser::new(&source, &types).unwrap();
        parser.require_other("(").unwrap();
        let err = parser
            .parse_list(|p| p.expect_ident(), |p| p.is_other(")"), |p| p.match_other(","))
            .unwrap_err();
        assert_eq!(err.range(), SourceRange::new(loc(1, 4), loc(1, 5)));
    }

    #[test]
    fn test_unit_rejects_statements() {
        let err = parse_unit(&buffer("var x = 1;\nx = 2;")).unwrap_err();
        assert!(matches!(err, ParseError::ExpectedDeclaration { .. }));
        assert_eq!(err.range().start, loc(2, 1));
    }

    #[test]
    fn test_lex_errors_surface_as_parse_errors() {
        let err = parse_source(&buffer("var s = \"open;")).unwrap_err();
        assert!(matches!(err, ParseError::Lex(_)));
        assert_eq!(err.range().start, loc(1, 9));
    }

    #[test]
    fn test_unit_declares_in_global_context() {
        let unit = parse_unit(&buffer("var a = 1; func main() { var b = a; }")).unwrap();
        let a = unit.names.get("a").unwrap();
        let b = unit.names.get("b").unwrap();
        let global = unit.contexts.global();
        assert_eq!(unit.contexts.find_declaration(global, a), Some(unit.decls[0].id()));
        assert_eq!(unit.contexts.find_declaration(global, b), None);

        let Decl::Function(main) = &unit.decls[1] else {
            panic!("expected main");
        };
        assert_eq!(unit.contexts.find_declaration(main.body.context, a), Some(unit.decls[0].id()));
        assert!(unit.contexts.find_declaration(main.body.context, b).is_some());
    }
}

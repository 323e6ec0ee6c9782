//!
//! Expression Parsing
//!
//! Precedence climbing over the registered operator tables:
//!
//! - parse_binary(min) parses a prefix expression, then folds in every
//!   binary operator whose precedence is at least `min`. Left-associative
//!   operators recurse with `prec + 1`, right-associative ones with `prec`.
//! - `?` is registered like a binary operator and parses the ternary.
//! - Prefix operators bind looser than postfix ones: `-a++` is `-(a++)`.
//! - The postfix loop handles `++`/`--`, calls, subscripts and member
//!   access, each widening the range to the closing token.
//!
//! Only Other tokens are looked up in the operator tables, so an
//! identifier never acts as an operator.
//!

use indexmap::IndexMap;

use crate::ast::{
    Associativity, BinaryExpr, BinaryOp, BoolLiteralExpr, CharLiteralExpr, Expr, FloatLiteralExpr,
    FunctionCallExpr, IdentifierExpr, IntLiteralExpr, MemberAccessExpr, NullLiteralExpr,
    ParenExpr, StringLiteralExpr, SubscriptExpr, TernaryExpr, UnaryExpr, UnaryOp,
    TERNARY_PRECEDENCE,
};
use crate::lexer::{KeywordKind, TokenKind};
use crate::source::Spanned;

use super::literals::{parse_number, Number};
use super::{ParseError, ParseResult, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryRule {
    Ternary,
    Op(BinaryOp),
}

impl BinaryRule {
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryRule::Ternary => TERNARY_PRECEDENCE,
            BinaryRule::Op(op) => op.precedence(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixRule {
    Step(UnaryOp),
    Call,
    Subscript,
    Member,
}

#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    binary: IndexMap<String, BinaryRule>,
    prefix: IndexMap<String, UnaryOp>,
    postfix: IndexMap<String, PostfixRule>,
}

impl OperatorTable {
    pub fn add_binary(&mut self, text: &str) -> ParseResult<()> {
        let rule = if text == "?" {
            BinaryRule::Ternary
        } else {
            BinaryOp::from_text(text)
                .map(BinaryRule::Op)
                .ok_or_else(|| unknown(text, "binary"))?
        };
        self.binary.insert(text.to_string(), rule);
        Ok(())
    }

    pub fn add_prefix(&mut self, text: &str) -> ParseResult<()> {
        let op = UnaryOp::prefix_from_text(text).ok_or_else(|| unknown(text, "prefix"))?;
        self.prefix.insert(text.to_string(), op);
        Ok(())
    }

    pub fn add_postfix(&mut self, text: &str) -> ParseResult<()> {
        let rule = match text {
            "(" => PostfixRule::Call,
            "[" => PostfixRule::Subscript,
            "." => PostfixRule::Member,
            _ => UnaryOp::postfix_from_text(text)
                .map(PostfixRule::Step)
                .ok_or_else(|| unknown(text, "postfix"))?,
        };
        self.postfix.insert(text.to_string(), rule);
        Ok(())
    }

    pub fn binary(&self, text: &str) -> Option<BinaryRule> {
        self.binary.get(text).copied()
    }

    pub fn prefix(&self, text: &str) -> Option<UnaryOp> {
        self.prefix.get(text).copied()
    }

    pub fn postfix(&self, text: &str) -> Option<PostfixRule> {
        self.postfix.get(text).copied()
    }
}

fn unknown(text: &str, position: &'static str) -> ParseError {
    ParseError::UnknownOperator {
        text: text.to_string(),
        position,
    }
}

impl<'src> Parser<'src> {
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary(0)
    }

    fn operator_text(&self) -> Option<&str> {
        self.current
            .as_ref()
            .filter(|t| t.kind == TokenKind::Other)
            .map(|t| t.as_str())
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some(rule) = self.operator_text().and_then(|t| self.operators.binary(t)) else {
                break;
            };
            let precedence = rule.precedence();
            if precedence < min_precedence {
                break;
            }
            self.next()?;

            lhs = match rule {
                BinaryRule::Ternary => {
                    let then_expr = self.parse_binary(0)?;
                    self.require_other(":")?;
                    let else_expr = self.parse_binary(precedence)?;
                    Expr::Ternary(TernaryExpr::new(lhs, then_expr, else_expr))
                }
                BinaryRule::Op(op) => {
                    let next_min = match op.associativity() {
                        Associativity::Left => precedence + 1,
                        Associativity::Right => precedence,
                    };
                    let rhs = self.parse_binary(next_min)?;
                    Expr::Binary(BinaryExpr::new(op, lhs, rhs))
                }
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        if let Some(op) = self.operator_text().and_then(|t| self.operators.prefix(t)) {
            let start = self.location();
            self.next()?;
            let operand = self.parse_prefix()?;
            return Ok(Expr::Unary(UnaryExpr {
                op,
                range: start.merge(operand.range()),
                operand: Box::new(operand),
            }));
        }

        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_postfix(&mut self, mut expr: Expr) -> ParseResult<Expr> {
        while let Some(rule) = self.operator_text().and_then(|t| self.operators.postfix(t)) {
            let op_range = self.location();
            self.next()?;

            expr = match rule {
                PostfixRule::Step(op) => Expr::Unary(UnaryExpr {
                    op,
                    range: expr.range().merge(op_range),
                    operand: Box::new(expr),
                }),
                PostfixRule::Call => {
                    let args = self.parse_list(
                        |p| p.parse_expr(),
                        |p| p.is_other(")"),
                        |p| p.match_other(","),
                    )?;
                    let close = self.require_other(")")?;
                    Expr::FunctionCall(FunctionCallExpr {
                        range: expr.range().merge(close.location),
                        callee: Box::new(expr),
                        args,
                    })
                }
                PostfixRule::Subscript => {
                    let index = self.parse_expr()?;
                    let close = self.require_other("]")?;
                    Expr::Subscript(SubscriptExpr {
                        range: expr.range().merge(close.location),
                        object: Box::new(expr),
                        index: Box::new(index),
                    })
                }
                PostfixRule::Member => {
                    let member = self.expect_ident()?;
                    Expr::MemberAccess(MemberAccessExpr {
                        range: expr.range().merge(member.range),
                        object: Box::new(expr),
                        member,
                    })
                }
            };
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.current.clone() else {
            return Err(ParseError::ExpectedExpr {
                found: self.found(),
                range: self.location(),
            });
        };
        let range = token.location;

        let expr = match token.kind {
            TokenKind::NumberLiteral => match parse_number(token.as_str()) {
                Some(Number::Int(value)) => Expr::IntLiteral(IntLiteralExpr { value, range }),
                Some(Number::Float(value)) => Expr::FloatLiteral(FloatLiteralExpr { value, range }),
                None => {
                    return Err(ParseError::InvalidNumber {
                        text: token.as_str().to_string(),
                        range,
                    });
                }
            },
            TokenKind::StringLiteral => Expr::StringLiteral(StringLiteralExpr {
                value: token.as_str().to_string(),
                range,
            }),
            TokenKind::CharLiteral => match token.as_char() {
                Some(value) => Expr::CharLiteral(CharLiteralExpr { value, range }),
                None => return Err(self.error_expected("char literal")),
            },
            TokenKind::Keyword(KeywordKind::True) => {
                Expr::BoolLiteral(BoolLiteralExpr { value: true, range })
            }
            TokenKind::Keyword(KeywordKind::False) => {
                Expr::BoolLiteral(BoolLiteralExpr { value: false, range })
            }
            TokenKind::Keyword(KeywordKind::Null) => Expr::NullLiteral(NullLiteralExpr { range }),
            TokenKind::Identifier => {
                let ident = self.expect_ident()?;
                return Ok(Expr::Identifier(IdentifierExpr { ident, range }));
            }
            TokenKind::Other if token.as_str() == "(" => {
                self.next()?;
                let inner = self.parse_expr()?;
                let close = self.require_other(")")?;
                return Ok(Expr::Paren(ParenExpr {
                    inner: Box::new(inner),
                    range: range.merge(close.location),
                }));
            }
            _ => {
                return Err(ParseError::ExpectedExpr {
                    found: self.found(),
                    range,
                });
            }
        };

        self.next()?;
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{AstDumper, Expr, Stmt, TypeRegistry};
    use crate::parser::{ParseError, Parser};
    use crate::source::{SourceBuffer, SourceLocation, SourceRange};

    fn dump(text: &str) -> String {
        let source = SourceBuffer::anonymous(format!("{text};"));
        let types = TypeRegistry::new();
        let parsed = Parser::with_default_grammar(&source, &types)
            .unwrap()
            .parse_source()
            .unwrap();
        let Stmt::Expr(stmt) = &parsed.stmts[0] else {
            panic!("expected an expression statement");
        };
        AstDumper::new(&parsed.names).show_ranges(false).dump_expr(&stmt.expr)
    }

    fn parse_err(text: &str) -> ParseError {
        let source = SourceBuffer::anonymous(text);
        crate::parser::parse_source(&source).unwrap_err()
    }

    #[test]
    fn test_left_associative_subtraction() {
        insta::assert_snapshot!(dump("a - b - c"), @r"
BinaryExpr -
  BinaryExpr -
    Identifier a
    Identifier b
  Identifier c
");
    }

    #[test]
    fn test_right_associative_assignment() {
        insta::assert_snapshot!(dump("a = b += 2"), @r"
BinaryExpr =
  Identifier a
  BinaryExpr +=
    Identifier b
    IntLiteral 2
");
    }

    #[test]
    fn test_precedence_levels() {
        insta::assert_snapshot!(dump("x == 1 + 2 * 3 || !y && z < 4"), @r"
BinaryExpr ||
  BinaryExpr ==
    Identifier x
    BinaryExpr +
      IntLiteral 1
      BinaryExpr *
        IntLiteral 2
        IntLiteral 3
  BinaryExpr &&
    UnaryExpr !
      Identifier y
    BinaryExpr <
      Identifier z
      IntLiteral 4
");
    }

    #[test]
    fn test_nested_ternary_is_right_associative() {
        insta::assert_snapshot!(dump("a ? 1 : b ? 2 : 3"), @r"
TernaryExpr
  Identifier a
  IntLiteral 1
  TernaryExpr
    Identifier b
    IntLiteral 2
    IntLiteral 3
");
    }

    #[test]
    fn test_prefix_binds_looser_than_postfix() {
        insta::assert_snapshot!(dump("-a++"), @r"
UnaryExpr -
  UnaryExpr postfix ++
    Identifier a
");
    }

    #[test]
    fn test_postfix_chain() {
        insta::assert_snapshot!(dump("s.length(1, (2))[0]"), @r"
Subscript
  FunctionCall (2 args)
    MemberAccess .length
      Identifier s
    IntLiteral 1
    ParenExpr
      IntLiteral 2
  IntLiteral 0
");
    }

    #[test]
    fn test_literals() {
        insta::assert_snapshot!(dump("f(null, true, false, 0x10, 2.5, 'c', \"s\")"), @r#"
FunctionCall (7 args)
  Identifier f
  NullLiteral
  BoolLiteral true
  BoolLiteral false
  IntLiteral 16
  FloatLiteral 2.5
  CharLiteral 'c'
  StringLiteral "s"
"#);
    }

    #[test]
    fn test_call_range_reaches_closing_paren() {
        let source = SourceBuffer::anonymous("print(1, \"x\");");
        let parsed = crate::parser::parse_source(&source).unwrap();
        let Stmt::Expr(stmt) = &parsed.stmts[0] else {
            panic!("expected an expression statement");
        };
        assert!(matches!(stmt.expr, Expr::FunctionCall(_)));
        let at = |c| SourceLocation::new(1, c);
        assert_eq!(crate::source::Spanned::range(&stmt.expr), SourceRange::new(at(1), at(14)));
    }

    #[test]
    fn test_expression_errors() {
        assert!(matches!(parse_err("1 + ;"), ParseError::ExpectedExpr { .. }));
        assert!(matches!(parse_err("12abc;"), ParseError::InvalidNumber { .. }));
        assert!(matches!(parse_err("a ? b;"), ParseError::Expected { .. }));
        assert!(matches!(parse_err("(1 + 2;"), ParseError::Expected { .. }));
        assert!(matches!(parse_err("f(1 2);"), ParseError::Expected { .. }));
    }
}

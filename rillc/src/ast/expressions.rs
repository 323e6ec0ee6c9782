//!
//! Expression AST Nodes
//!
//! Every expression form of rill, as a closed enum over one struct per form.
//! Each node owns its children through `Box`/`Vec`; nothing is shared
//! between two parents.
//!
//! Key design decisions:
//! - ExprKind mirrors the variants so callers can group forms by pattern
//!   (`is_literal`) instead of by numeric ranges
//! - Setters on nodes with children replace the child and widen the node's
//!   range to cover it; the old child is dropped
//! - Literal payloads are stored already decoded (i64, f64, char, String)
//!

use crate::source::{SourceRange, Spanned};

use super::operators::{BinaryOp, UnaryOp};
use super::types::Ident;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NullLiteral(NullLiteralExpr),
    BoolLiteral(BoolLiteralExpr),
    IntLiteral(IntLiteralExpr),
    FloatLiteral(FloatLiteralExpr),
    CharLiteral(CharLiteralExpr),
    StringLiteral(StringLiteralExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Ternary(TernaryExpr),
    Paren(ParenExpr),
    Identifier(IdentifierExpr),
    MemberAccess(MemberAccessExpr),
    FunctionCall(FunctionCallExpr),
    Subscript(SubscriptExpr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    NullLiteral,
    BoolLiteral,
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,
    Binary,
    Unary,
    Ternary,
    Paren,
    Identifier,
    MemberAccess,
    FunctionCall,
    Subscript,
}

impl ExprKind {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            ExprKind::NullLiteral
                | ExprKind::BoolLiteral
                | ExprKind::IntLiteral
                | ExprKind::FloatLiteral
                | ExprKind::CharLiteral
                | ExprKind::StringLiteral
        )
    }

    pub fn is_postfix(&self) -> bool {
        matches!(
            self,
            ExprKind::MemberAccess | ExprKind::FunctionCall | ExprKind::Subscript
        )
    }
}

impl Expr {
    pub fn kind(&self) -> ExprKind {
        match self {
            Expr::NullLiteral(_) => ExprKind::NullLiteral,
            Expr::BoolLiteral(_) => ExprKind::BoolLiteral,
            Expr::IntLiteral(_) => ExprKind::IntLiteral,
            Expr::FloatLiteral(_) => ExprKind::FloatLiteral,
            Expr::CharLiteral(_) => ExprKind::CharLiteral,
            Expr::StringLiteral(_) => ExprKind::StringLiteral,
            Expr::Binary(_) => ExprKind::Binary,
            Expr::Unary(_) => ExprKind::Unary,
            Expr::Ternary(_) => ExprKind::Ternary,
            Expr::Paren(_) => ExprKind::Paren,
            Expr::Identifier(_) => ExprKind::Identifier,
            Expr::MemberAccess(_) => ExprKind::MemberAccess,
            Expr::FunctionCall(_) => ExprKind::FunctionCall,
            Expr::Subscript(_) => ExprKind::Subscript,
        }
    }

    pub fn is_literal(&self) -> bool {
        self.kind().is_literal()
    }

    /// The identifier if this expression is a bare name.
    pub fn as_identifier(&self) -> Option<&Ident> {
        match self {
            Expr::Identifier(e) => Some(&e.ident),
            _ => None,
        }
    }
}

impl Spanned for Expr {
    fn range(&self) -> SourceRange {
        match self {
            Expr::NullLiteral(e) => e.range,
            Expr::BoolLiteral(e) => e.range,
            Expr::IntLiteral(e) => e.range,
            Expr::FloatLiteral(e) => e.range,
            Expr::CharLiteral(e) => e.range,
            Expr::StringLiteral(e) => e.range,
            Expr::Binary(e) => e.range,
            Expr::Unary(e) => e.range,
            Expr::Ternary(e) => e.range,
            Expr::Paren(e) => e.range,
            Expr::Identifier(e) => e.range,
            Expr::MemberAccess(e) => e.range,
            Expr::FunctionCall(e) => e.range,
            Expr::Subscript(e) => e.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullLiteralExpr {
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolLiteralExpr {
    pub value: bool,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntLiteralExpr {
    pub value: i64,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteralExpr {
    pub value: f64,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharLiteralExpr {
    pub value: char,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteralExpr {
    pub value: String,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub range: SourceRange,
}

impl BinaryExpr {
    pub fn new(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        let range = lhs.range().merge(rhs.range());
        Self {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            range,
        }
    }

    pub fn set_lhs(&mut self, lhs: Expr) {
        self.range = self.range.merge(lhs.range());
        self.lhs = Box::new(lhs);
    }

    pub fn set_rhs(&mut self, rhs: Expr) {
        self.range = self.range.merge(rhs.range());
        self.rhs = Box::new(rhs);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub range: SourceRange,
}

impl UnaryExpr {
    pub fn set_operand(&mut self, operand: Expr) {
        self.range = self.range.merge(operand.range());
        self.operand = Box::new(operand);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpr {
    pub condition: Box<Expr>,
    pub then_expr: Box<Expr>,
    pub else_expr: Box<Expr>,
    pub range: SourceRange,
}

impl TernaryExpr {
    pub fn new(condition: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        let range = condition.range().merge(else_expr.range());
        Self {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
            range,
        }
    }

    pub fn set_condition(&mut self, condition: Expr) {
        self.range = self.range.merge(condition.range());
        self.condition = Box::new(condition);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub inner: Box<Expr>,
    pub range: SourceRange,
}

impl ParenExpr {
    pub fn set_inner(&mut self, inner: Expr) {
        self.range = self.range.merge(inner.range());
        self.inner = Box::new(inner);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierExpr {
    pub ident: Ident,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccessExpr {
    pub object: Box<Expr>,
    pub member: Ident,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub range: SourceRange,
}

impl FunctionCallExpr {
    pub fn set_callee(&mut self, callee: Expr) {
        self.range = self.range.merge(callee.range());
        self.callee = Box::new(callee);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptExpr {
    pub object: Box<Expr>,
    pub index: Box<Expr>,
    pub range: SourceRange,
}

//!
//! Statement AST Nodes
//!
//! Statements follow C. `case` and `default` are labels: they appear as
//! ordinary statements inside a switch body and mark jump targets.
//!
//! Compound statements and `for` loops open a block context in the
//! declaration tree; the id of that context is stored on the node.
//!

use crate::source::{SourceRange, Spanned};

use super::context::ContextId;
use super::declarations::Decl;
use super::expressions::Expr;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(ExprStmt),
    Decl(DeclStmt),
    Compound(CompoundStmt),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(ForStmt),
    Switch(SwitchStmt),
    Case(CaseStmt),
    Default(DefaultStmt),
    Continue(ContinueStmt),
    Break(BreakStmt),
    Return(ReturnStmt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StmtKind {
    Expr,
    Decl,
    Compound,
    If,
    While,
    DoWhile,
    For,
    Switch,
    Case,
    Default,
    Continue,
    Break,
    Return,
}

impl StmtKind {
    pub fn is_loop(&self) -> bool {
        matches!(self, StmtKind::While | StmtKind::DoWhile | StmtKind::For)
    }

    pub fn is_label(&self) -> bool {
        matches!(self, StmtKind::Case | StmtKind::Default)
    }

    pub fn is_jump(&self) -> bool {
        matches!(self, StmtKind::Continue | StmtKind::Break | StmtKind::Return)
    }
}

impl Stmt {
    pub fn kind(&self) -> StmtKind {
        match self {
            Stmt::Expr(_) => StmtKind::Expr,
            Stmt::Decl(_) => StmtKind::Decl,
            Stmt::Compound(_) => StmtKind::Compound,
            Stmt::If(_) => StmtKind::If,
            Stmt::While(_) => StmtKind::While,
            Stmt::DoWhile(_) => StmtKind::DoWhile,
            Stmt::For(_) => StmtKind::For,
            Stmt::Switch(_) => StmtKind::Switch,
            Stmt::Case(_) => StmtKind::Case,
            Stmt::Default(_) => StmtKind::Default,
            Stmt::Continue(_) => StmtKind::Continue,
            Stmt::Break(_) => StmtKind::Break,
            Stmt::Return(_) => StmtKind::Return,
        }
    }
}

impl Spanned for Stmt {
    fn range(&self) -> SourceRange {
        match self {
            Stmt::Expr(s) => s.range,
            Stmt::Decl(s) => s.range,
            Stmt::Compound(s) => s.range,
            Stmt::If(s) => s.range,
            Stmt::While(s) => s.range,
            Stmt::DoWhile(s) => s.range,
            Stmt::For(s) => s.range,
            Stmt::Switch(s) => s.range,
            Stmt::Case(s) => s.range,
            Stmt::Default(s) => s.range,
            Stmt::Continue(s) => s.range,
            Stmt::Break(s) => s.range,
            Stmt::Return(s) => s.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclStmt {
    pub decl: Box<Decl>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompoundStmt {
    pub stmts: Vec<Stmt>,
    pub context: ContextId,
    pub range: SourceRange,
}

impl CompoundStmt {
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.range = self.range.merge(stmt.range());
        self.stmts.push(stmt);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub range: SourceRange,
}

impl IfStmt {
    pub fn set_else(&mut self, else_branch: Stmt) {
        self.range = self.range.merge(else_branch.range());
        self.else_branch = Some(Box::new(else_branch));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub body: Box<Stmt>,
    pub condition: Expr,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub condition: Option<Expr>,
    pub step: Option<Expr>,
    pub body: Box<Stmt>,
    pub context: ContextId,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub subject: Expr,
    pub body: CompoundStmt,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseStmt {
    pub value: Expr,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultStmt {
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStmt {
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStmt {
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub range: SourceRange,
}

//!
//! AST Visitor Pattern
//!
//! Implement Visitor and override the methods you care about; the defaults
//! call the matching walk_* function, which visits every child in source
//! order. A visitor that overrides a method and still wants the children
//! visited calls the walk_* function itself.
//!

use super::declarations::*;
use super::expressions::*;
use super::statements::*;
use super::types::*;

pub trait Visitor: Sized {
    fn visit_decl(&mut self, decl: &Decl) {
        walk_decl(self, decl)
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt)
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr)
    }

    fn visit_type(&mut self, _ty: &TypeRef) {}

    fn visit_ident(&mut self, _ident: &Ident) {}
}

pub fn walk_decl<V: Visitor>(v: &mut V, decl: &Decl) {
    match decl {
        Decl::Variable(var) => walk_variable(v, var),
        Decl::Function(func) => {
            v.visit_ident(&func.name);
            if let Some(ty) = &func.return_type {
                v.visit_type(ty);
            }
            for param in &func.params {
                walk_variable(v, param);
            }
            for stmt in &func.body.stmts {
                v.visit_stmt(stmt);
            }
        }
        Decl::Class(class) => {
            v.visit_ident(&class.name);
            for member in class.members.iter() {
                v.visit_decl(member);
            }
        }
        Decl::Namespace(ns) => {
            v.visit_ident(&ns.name);
            for member in ns.members.iter() {
                v.visit_decl(member);
            }
        }
    }
}

pub fn walk_variable<V: Visitor>(v: &mut V, var: &VariableDecl) {
    v.visit_ident(&var.name);
    if let Some(ty) = &var.ty {
        v.visit_type(ty);
    }
    if let Some(init) = &var.init {
        v.visit_expr(init);
    }
}

pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Stmt) {
    match stmt {
        Stmt::Expr(s) => v.visit_expr(&s.expr),
        Stmt::Decl(s) => v.visit_decl(&s.decl),
        Stmt::Compound(s) => {
            for child in &s.stmts {
                v.visit_stmt(child);
            }
        }
        Stmt::If(s) => {
            v.visit_expr(&s.condition);
            v.visit_stmt(&s.then_branch);
            if let Some(else_branch) = &s.else_branch {
                v.visit_stmt(else_branch);
            }
        }
        Stmt::While(s) => {
            v.visit_expr(&s.condition);
            v.visit_stmt(&s.body);
        }
        Stmt::DoWhile(s) => {
            v.visit_stmt(&s.body);
            v.visit_expr(&s.condition);
        }
        Stmt::For(s) => {
            if let Some(init) = &s.init {
                v.visit_stmt(init);
            }
            if let Some(condition) = &s.condition {
                v.visit_expr(condition);
            }
            if let Some(step) = &s.step {
                v.visit_expr(step);
            }
            v.visit_stmt(&s.body);
        }
        Stmt::Switch(s) => {
            v.visit_expr(&s.subject);
            for child in &s.body.stmts {
                v.visit_stmt(child);
            }
        }
        Stmt::Case(s) => v.visit_expr(&s.value),
        Stmt::Return(s) => {
            if let Some(value) = &s.value {
                v.visit_expr(value);
            }
        }
        Stmt::Default(_) | Stmt::Continue(_) | Stmt::Break(_) => {}
    }
}

pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Expr) {
    match expr {
        Expr::NullLiteral(_)
        | Expr::BoolLiteral(_)
        | Expr::IntLiteral(_)
        | Expr::FloatLiteral(_)
        | Expr::CharLiteral(_)
        | Expr::StringLiteral(_) => {}
        Expr::Binary(e) => {
            v.visit_expr(&e.lhs);
            v.visit_expr(&e.rhs);
        }
        Expr::Unary(e) => v.visit_expr(&e.operand),
        Expr::Ternary(e) => {
            v.visit_expr(&e.condition);
            v.visit_expr(&e.then_expr);
            v.visit_expr(&e.else_expr);
        }
        Expr::Paren(e) => v.visit_expr(&e.inner),
        Expr::Identifier(e) => v.visit_ident(&e.ident),
        Expr::MemberAccess(e) => {
            v.visit_expr(&e.object);
            v.visit_ident(&e.member);
        }
        Expr::FunctionCall(e) => {
            v.visit_expr(&e.callee);
            for arg in &e.args {
                v.visit_expr(arg);
            }
        }
        Expr::Subscript(e) => {
            v.visit_expr(&e.object);
            v.visit_expr(&e.index);
        }
    }
}

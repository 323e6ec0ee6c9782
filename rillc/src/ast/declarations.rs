//!
//! Declaration AST Nodes
//!
//! Variables, functions, classes and namespaces. Every declaration has a
//! unit-unique DeclId and records the ContextId of the declaration context
//! it was declared in. Functions, classes and namespaces also open a
//! context of their own (`own_context`).
//!
//! Parameters are VariableDecls owned by their function; class and
//! namespace members are an ordered CompoundDecl.
//!

use std::fmt;

use crate::source::{SourceRange, Spanned};

use super::context::ContextId;
use super::expressions::Expr;
use super::statements::CompoundStmt;
use super::types::{Ident, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Variable(VariableDecl),
    Function(FunctionDecl),
    Class(ClassDecl),
    Namespace(NamespaceDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Variable,
    Function,
    Class,
    Namespace,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclKind::Variable => "variable",
            DeclKind::Function => "function",
            DeclKind::Class => "class",
            DeclKind::Namespace => "namespace",
        };
        f.write_str(name)
    }
}

impl Decl {
    pub fn kind(&self) -> DeclKind {
        match self {
            Decl::Variable(_) => DeclKind::Variable,
            Decl::Function(_) => DeclKind::Function,
            Decl::Class(_) => DeclKind::Class,
            Decl::Namespace(_) => DeclKind::Namespace,
        }
    }

    pub fn id(&self) -> DeclId {
        match self {
            Decl::Variable(d) => d.id,
            Decl::Function(d) => d.id,
            Decl::Class(d) => d.id,
            Decl::Namespace(d) => d.id,
        }
    }

    pub fn name(&self) -> &Ident {
        match self {
            Decl::Variable(d) => &d.name,
            Decl::Function(d) => &d.name,
            Decl::Class(d) => &d.name,
            Decl::Namespace(d) => &d.name,
        }
    }

    /// The context this declaration was declared in.
    pub fn context(&self) -> ContextId {
        match self {
            Decl::Variable(d) => d.context,
            Decl::Function(d) => d.context,
            Decl::Class(d) => d.context,
            Decl::Namespace(d) => d.context,
        }
    }

    pub fn own_context(&self) -> Option<ContextId> {
        match self {
            Decl::Variable(_) => None,
            Decl::Function(d) => Some(d.own_context),
            Decl::Class(d) => Some(d.own_context),
            Decl::Namespace(d) => Some(d.own_context),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match self {
            Decl::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableDecl> {
        match self {
            Decl::Variable(v) => Some(v),
            _ => None,
        }
    }
}

impl Spanned for Decl {
    fn range(&self) -> SourceRange {
        match self {
            Decl::Variable(d) => d.range,
            Decl::Function(d) => d.range,
            Decl::Class(d) => d.range,
            Decl::Namespace(d) => d.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub id: DeclId,
    pub name: Ident,
    pub ty: Option<TypeRef>,
    pub init: Option<Expr>,
    pub constant: bool,
    pub context: ContextId,
    pub range: SourceRange,
}

impl VariableDecl {
    pub fn set_init(&mut self, init: Expr) {
        self.range = self.range.merge(init.range());
        self.init = Some(init);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub id: DeclId,
    pub name: Ident,
    pub return_type: Option<TypeRef>,
    pub params: Vec<VariableDecl>,
    pub body: CompoundStmt,
    pub context: ContextId,
    pub own_context: ContextId,
    pub range: SourceRange,
}

impl FunctionDecl {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn set_body(&mut self, body: CompoundStmt) {
        self.range = self.range.merge(body.range);
        self.body = body;
    }
}

/// Ordered declarations of a class or namespace body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundDecl {
    pub decls: Vec<Decl>,
    pub range: SourceRange,
}

impl CompoundDecl {
    pub fn iter(&self) -> impl Iterator<Item = &Decl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub id: DeclId,
    pub name: Ident,
    pub members: CompoundDecl,
    pub context: ContextId,
    pub own_context: ContextId,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    pub id: DeclId,
    pub name: Ident,
    pub members: CompoundDecl,
    pub context: ContextId,
    pub own_context: ContextId,
    pub range: SourceRange,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BreakStmt, IntLiteralExpr, Stmt};
    use crate::source::SourceLocation;
    use lasso::Rodeo;

    fn range(start: u32, end: u32) -> SourceRange {
        SourceRange::new(SourceLocation::new(1, start), SourceLocation::new(1, end))
    }

    fn ident(names: &mut Rodeo, text: &str, start: u32) -> Ident {
        Ident {
            symbol: names.get_or_intern(text),
            range: range(start, start + text.len() as u32),
        }
    }

    fn int(value: i64, start: u32) -> Expr {
        Expr::IntLiteral(IntLiteralExpr {
            value,
            range: range(start, start + 1),
        })
    }

    #[test]
    fn test_set_init_replaces_initializer() {
        let mut names = Rodeo::default();
        let mut var = VariableDecl {
            id: DeclId(1),
            name: ident(&mut names, "a", 5),
            ty: None,
            init: Some(int(1, 9)),
            constant: false,
            context: ContextId::GLOBAL,
            range: range(1, 10),
        };

        var.set_init(int(7, 12));
        assert_eq!(var.init, Some(int(7, 12)));
        assert_eq!(var.range, range(1, 13));
        assert_eq!(Decl::Variable(var).kind(), DeclKind::Variable);
    }

    #[test]
    fn test_set_body_replaces_statements() {
        let mut names = Rodeo::default();
        let own_context = ContextId(1);
        let mut func = FunctionDecl {
            id: DeclId(2),
            name: ident(&mut names, "f", 6),
            return_type: None,
            params: Vec::new(),
            body: CompoundStmt {
                stmts: Vec::new(),
                context: own_context,
                range: range(10, 12),
            },
            context: ContextId::GLOBAL,
            own_context,
            range: range(1, 12),
        };

        let body = CompoundStmt {
            stmts: vec![Stmt::Break(BreakStmt { range: range(12, 18) })],
            context: own_context,
            range: range(10, 20),
        };
        func.set_body(body.clone());
        assert_eq!(func.body, body);
        assert_eq!(func.range, range(1, 20));
        assert_eq!(func.arity(), 0);
    }
}

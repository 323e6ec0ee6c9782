//!
//! AST Dumper
//!
//! Renders a tree as indented text, one node per line, two spaces per
//! level. Used by `rill ast`. Ranges are appended as `<l:c-l:c>` unless
//! turned off.
//!

use std::fmt::Write;

use super::declarations::*;
use super::expressions::*;
use super::statements::*;
use super::types::*;
use super::visitor::{walk_decl, walk_expr, walk_stmt, Visitor};
use super::{NameTable, Source, Unit};
use crate::source::{SourceRange, Spanned};

pub struct AstDumper<'a> {
    names: &'a NameTable,
    show_ranges: bool,
    depth: usize,
    out: String,
}

impl<'a> AstDumper<'a> {
    pub fn new(names: &'a NameTable) -> Self {
        Self {
            names,
            show_ranges: true,
            depth: 0,
            out: String::new(),
        }
    }

    pub fn show_ranges(mut self, show: bool) -> Self {
        self.show_ranges = show;
        self
    }

    pub fn dump_unit(mut self, unit: &Unit) -> String {
        self.line("Unit", unit.range);
        self.nested(|d| {
            for decl in &unit.decls {
                d.visit_decl(decl);
            }
        });
        self.out
    }

    pub fn dump_source(mut self, source: &Source) -> String {
        self.line("Source", source.range);
        self.nested(|d| {
            for stmt in &source.stmts {
                d.visit_stmt(stmt);
            }
        });
        self.out
    }

    pub fn dump_expr(mut self, expr: &Expr) -> String {
        self.visit_expr(expr);
        self.out
    }

    fn line(&mut self, label: &str, range: SourceRange) {
        let indent = "  ".repeat(self.depth);
        let _ = if self.show_ranges {
            writeln!(self.out, "{indent}{label} <{range}>")
        } else {
            writeln!(self.out, "{indent}{label}")
        };
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn name(&self, ident: &Ident) -> &'a str {
        self.names.resolve(ident.symbol)
    }

    fn type_name(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Builtin(b) => b.to_string(),
            TypeRef::Named(ident) => self.name(ident).to_string(),
        }
    }

    fn variable_label(&self, var: &VariableDecl) -> String {
        let mut label = format!("VariableDecl {}", self.name(&var.name));
        if let Some(ty) = &var.ty {
            let _ = write!(label, ": {}", self.type_name(ty));
        }
        if var.constant {
            label.push_str(" const");
        }
        label
    }
}

impl Visitor for AstDumper<'_> {
    fn visit_decl(&mut self, decl: &Decl) {
        let label = match decl {
            Decl::Variable(var) => self.variable_label(var),
            Decl::Function(func) => {
                let params: Vec<_> = func.params.iter().map(|p| self.name(&p.name)).collect();
                let mut label = format!("FunctionDecl {}({})", self.name(&func.name), params.join(", "));
                if let Some(ty) = &func.return_type {
                    let _ = write!(label, ": {}", self.type_name(ty));
                }
                label
            }
            Decl::Class(class) => format!("ClassDecl {}", self.name(&class.name)),
            Decl::Namespace(ns) => format!("NamespaceDecl {}", self.name(&ns.name)),
        };
        self.line(&label, decl.range());
        self.nested(|d| walk_decl(d, decl));
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        let label = match stmt.kind() {
            StmtKind::Expr => "ExprStmt",
            StmtKind::Decl => "DeclStmt",
            StmtKind::Compound => "CompoundStmt",
            StmtKind::If => "IfStmt",
            StmtKind::While => "WhileStmt",
            StmtKind::DoWhile => "DoWhileStmt",
            StmtKind::For => "ForStmt",
            StmtKind::Switch => "SwitchStmt",
            StmtKind::Case => "CaseStmt",
            StmtKind::Default => "DefaultStmt",
            StmtKind::Continue => "ContinueStmt",
            StmtKind::Break => "BreakStmt",
            StmtKind::Return => "ReturnStmt",
        };
        self.line(label, stmt.range());
        self.nested(|d| walk_stmt(d, stmt));
    }

    fn visit_expr(&mut self, expr: &Expr) {
        let label = match expr {
            Expr::NullLiteral(_) => "NullLiteral".to_string(),
            Expr::BoolLiteral(e) => format!("BoolLiteral {}", e.value),
            Expr::IntLiteral(e) => format!("IntLiteral {}", e.value),
            Expr::FloatLiteral(e) => format!("FloatLiteral {:?}", e.value),
            Expr::CharLiteral(e) => format!("CharLiteral {:?}", e.value),
            Expr::StringLiteral(e) => format!("StringLiteral {:?}", e.value),
            Expr::Binary(e) => format!("BinaryExpr {}", e.op),
            Expr::Unary(e) => format!("UnaryExpr {}", e.op),
            Expr::Ternary(_) => "TernaryExpr".to_string(),
            Expr::Paren(_) => "ParenExpr".to_string(),
            Expr::Identifier(e) => format!("Identifier {}", self.name(&e.ident)),
            Expr::MemberAccess(e) => format!("MemberAccess .{}", self.name(&e.member)),
            Expr::FunctionCall(e) => format!("FunctionCall ({} args)", e.args.len()),
            Expr::Subscript(_) => "Subscript".to_string(),
        };
        self.line(&label, expr.range());
        self.nested(|d| walk_expr(d, expr));
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{parse_source, parse_unit};
    use crate::source::SourceBuffer;

    use super::*;

    #[test]
    fn test_dump_expression_statement() {
        let source = parse_source(&SourceBuffer::anonymous("5 + 2;")).unwrap();
        let dump = AstDumper::new(&source.names).dump_source(&source);
        insta::assert_snapshot!(dump, @r"
Source <1:1-1:7>
  ExprStmt <1:1-1:7>
    BinaryExpr + <1:1-1:6>
      IntLiteral 5 <1:1-1:2>
      IntLiteral 2 <1:5-1:6>
");
    }

    #[test]
    fn test_dump_unit_without_ranges() {
        let text = "func int main() {\n  var int a = 10;\n  if (a > 1) print(a, \"x\"); else a++;\n  return a;\n}\n";
        let unit = parse_unit(&SourceBuffer::anonymous(text)).unwrap();
        let dump = AstDumper::new(&unit.names).show_ranges(false).dump_unit(&unit);
        insta::assert_snapshot!(dump, @r#"
Unit
  FunctionDecl main(): int
    DeclStmt
      VariableDecl a: int
        IntLiteral 10
    IfStmt
      BinaryExpr >
        Identifier a
        IntLiteral 1
      ExprStmt
        FunctionCall (2 args)
          Identifier print
          Identifier a
          StringLiteral "x"
      ExprStmt
        UnaryExpr postfix ++
          Identifier a
    ReturnStmt
      Identifier a
"#);
    }

    #[test]
    fn test_dump_class_members() {
        let text = "class Point { var x = 0; const float y = 1.5; func f(a, b) { } }";
        let unit = parse_unit(&SourceBuffer::anonymous(text)).unwrap();
        let dump = AstDumper::new(&unit.names).show_ranges(false).dump_unit(&unit);
        insta::assert_snapshot!(dump, @r"
Unit
  ClassDecl Point
    VariableDecl x
      IntLiteral 0
    VariableDecl y: float const
      FloatLiteral 1.5
    FunctionDecl f(a, b)
");
    }
}

//!
//! Default Grammar
//!
//! The statement handlers and operator registrations that make up rill.
//! Each handler starts at its leading token and consumes everything up to
//! and including its own terminator.
//!
//! Declarations:
//! - `var [Type] name [= expr];` and `const [Type] name = expr;`
//! - `func [Type] name([Type] p, ...) { ... }`
//! - `class Name { decls }` and `namespace Name { decls }`
//!
//! Statements: `if`, `while`, `do`, `for`, `switch`, `case`, `default`,
//! `break`, `continue`, `return` and `{` blocks, with C syntax.
//!

use crate::ast::{
    BreakStmt, CaseStmt, ClassDecl, CompoundDecl, ContextKind, ContinueStmt, Decl, DeclStmt,
    DefaultStmt, DoWhileStmt, Expr, ForStmt, FunctionDecl, IfStmt, NamespaceDecl, ReturnStmt, Stmt,
    SwitchStmt, TypeRef, VariableDecl, WhileStmt,
};
use crate::source::{SourceRange, Spanned};

use super::{ParseError, ParseResult, Parser};

const BINARY_OPERATORS: [&str; 20] = [
    "?", "=", "+=", "-=", "*=", "/=", "%=", "||", "&&", "==", "!=", "<", "<=", ">", ">=", "+", "-",
    "*", "/", "%",
];
const PREFIX_OPERATORS: [&str; 5] = ["!", "+", "-", "++", "--"];
const POSTFIX_OPERATORS: [&str; 5] = ["++", "--", "(", "[", "."];

pub fn install(parser: &mut Parser<'_>) -> ParseResult<()> {
    for op in BINARY_OPERATORS {
        parser.add_binary_operator(op)?;
    }
    for op in PREFIX_OPERATORS {
        parser.add_prefix_operator(op)?;
    }
    for op in POSTFIX_OPERATORS {
        parser.add_postfix_operator(op)?;
    }

    parser.add_stmt_parser("var", |p: &mut Parser<'_>| parse_variable_stmt(p, false));
    parser.add_stmt_parser("const", |p: &mut Parser<'_>| parse_variable_stmt(p, true));
    parser.add_stmt_parser("func", parse_function_stmt);
    parser.add_stmt_parser("class", parse_class_stmt);
    parser.add_stmt_parser("namespace", parse_namespace_stmt);
    parser.add_stmt_parser("if", parse_if);
    parser.add_stmt_parser("while", parse_while);
    parser.add_stmt_parser("do", parse_do_while);
    parser.add_stmt_parser("for", parse_for);
    parser.add_stmt_parser("switch", parse_switch);
    parser.add_stmt_parser("case", parse_case);
    parser.add_stmt_parser("default", parse_default);
    parser.add_stmt_parser("break", parse_break);
    parser.add_stmt_parser("continue", parse_continue);
    parser.add_stmt_parser("return", parse_return);
    parser.add_stmt_parser("{", |p: &mut Parser<'_>| Ok(Stmt::Compound(p.parse_block()?)));
    Ok(())
}

fn decl_stmt(decl: Decl) -> Stmt {
    Stmt::Decl(DeclStmt {
        range: decl.range(),
        decl: Box::new(decl),
    })
}

pub fn parse_variable(p: &mut Parser<'_>, constant: bool) -> ParseResult<VariableDecl> {
    let keyword = if constant { "const" } else { "var" };
    let start = p.require_identifier(keyword)?.location;
    let ty = p.parse_type()?;
    let name = p.expect_ident()?;
    let id = p.declare(&name);

    let init = if p.match_other("=")? {
        Some(p.parse_expr()?)
    } else if constant {
        return Err(p.error_expected("'=' after constant name"));
    } else {
        None
    };
    let end = p.require_other(";")?;

    Ok(VariableDecl {
        id,
        name,
        ty,
        init,
        constant,
        context: p.scope(),
        range: start.merge(end.location),
    })
}

fn parse_variable_stmt(p: &mut Parser<'_>, constant: bool) -> ParseResult<Stmt> {
    Ok(decl_stmt(Decl::Variable(parse_variable(p, constant)?)))
}

fn parse_param(p: &mut Parser<'_>) -> ParseResult<VariableDecl> {
    let ty = p.parse_type()?;
    let name = p.expect_ident()?;
    let id = p.declare(&name);
    let range = match &ty {
        Some(TypeRef::Named(type_name)) => type_name.range.merge(name.range),
        _ => name.range,
    };
    Ok(VariableDecl {
        id,
        name,
        ty,
        init: None,
        constant: false,
        context: p.scope(),
        range,
    })
}

pub fn parse_function(p: &mut Parser<'_>) -> ParseResult<FunctionDecl> {
    let start = p.require_identifier("func")?.location;
    let return_type = p.parse_type()?;
    let name = p.expect_ident()?;
    let id = p.declare(&name);
    let context = p.scope();

    p.with_context(ContextKind::Function, Some(id), |p, own_context| {
        p.require_other("(")?;
        let params = p.parse_list(parse_param, |p| p.is_other(")"), |p| p.match_other(","))?;
        p.require_other(")")?;
        let body = p.parse_compound_body(own_context)?;
        Ok(FunctionDecl {
            id,
            name,
            return_type,
            params,
            range: start.merge(body.range),
            body,
            context,
            own_context,
        })
    })
}

fn parse_function_stmt(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    Ok(decl_stmt(Decl::Function(parse_function(p)?)))
}

/// `{ decl* }` of a class or namespace.
fn parse_members(p: &mut Parser<'_>) -> ParseResult<CompoundDecl> {
    let open = p.require_other("{")?;
    let mut decls = Vec::new();
    while !p.is_other("}") && !p.is_empty() {
        let at = p.location();
        let found = p.found();
        match p.parse_stmt()? {
            Stmt::Decl(stmt) => decls.push(*stmt.decl),
            _ => return Err(ParseError::ExpectedDeclaration { found, range: at }),
        }
    }
    let close = p.require_other("}")?;
    Ok(CompoundDecl {
        decls,
        range: open.location.merge(close.location),
    })
}

fn parse_class_stmt(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let start = p.require_identifier("class")?.location;
    let name = p.expect_ident()?;
    let id = p.declare(&name);
    let context = p.scope();
    let (own_context, members) = p.with_context(ContextKind::Class, Some(id), |p, own| {
        Ok((own, parse_members(p)?))
    })?;
    Ok(decl_stmt(Decl::Class(ClassDecl {
        id,
        name,
        range: start.merge(members.range),
        members,
        context,
        own_context,
    })))
}

fn parse_namespace_stmt(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let start = p.require_identifier("namespace")?.location;
    let name = p.expect_ident()?;
    let id = p.declare(&name);
    let context = p.scope();
    let (own_context, members) = p.with_context(ContextKind::Namespace, Some(id), |p, own| {
        Ok((own, parse_members(p)?))
    })?;
    Ok(decl_stmt(Decl::Namespace(NamespaceDecl {
        id,
        name,
        range: start.merge(members.range),
        members,
        context,
        own_context,
    })))
}

/// `( expr )` as used by if, while, do-while and switch.
fn parse_condition(p: &mut Parser<'_>) -> ParseResult<Expr> {
    p.require_other("(")?;
    let condition = p.parse_expr()?;
    p.require_other(")")?;
    Ok(condition)
}

fn parse_if(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let start = p.require_identifier("if")?.location;
    let condition = parse_condition(p)?;
    let then_branch = p.parse_stmt()?;
    let mut stmt = IfStmt {
        condition,
        range: start.merge(then_branch.range()),
        then_branch: Box::new(then_branch),
        else_branch: None,
    };
    if p.is_identifier("else") {
        p.next()?;
        let else_branch = p.parse_stmt()?;
        stmt.set_else(else_branch);
    }
    Ok(Stmt::If(stmt))
}

fn parse_while(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let start = p.require_identifier("while")?.location;
    let condition = parse_condition(p)?;
    let body = p.parse_stmt()?;
    Ok(Stmt::While(WhileStmt {
        condition,
        range: start.merge(body.range()),
        body: Box::new(body),
    }))
}

fn parse_do_while(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let start = p.require_identifier("do")?.location;
    let body = p.parse_stmt()?;
    p.require_identifier("while")?;
    let condition = parse_condition(p)?;
    let end = p.require_other(";")?;
    Ok(Stmt::DoWhile(DoWhileStmt {
        body: Box::new(body),
        condition,
        range: start.merge(end.location),
    }))
}

fn parse_for(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let start = p.require_identifier("for")?.location;
    p.with_context(ContextKind::Block, None, |p, context| {
        p.require_other("(")?;
        let init = if p.match_other(";")? {
            None
        } else {
            Some(Box::new(p.parse_stmt()?))
        };
        let condition = if p.is_other(";") { None } else { Some(p.parse_expr()?) };
        p.require_other(";")?;
        let step = if p.is_other(")") { None } else { Some(p.parse_expr()?) };
        p.require_other(")")?;
        let body = p.parse_stmt()?;
        Ok(Stmt::For(ForStmt {
            init,
            condition,
            step,
            range: start.merge(body.range()),
            body: Box::new(body),
            context,
        }))
    })
}

fn parse_switch(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let start = p.require_identifier("switch")?.location;
    let subject = parse_condition(p)?;
    let body = p.parse_block()?;
    Ok(Stmt::Switch(SwitchStmt {
        subject,
        range: start.merge(body.range),
        body,
    }))
}

fn parse_case(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let start = p.require_identifier("case")?.location;
    let value = p.parse_expr()?;
    let end = p.require_other(":")?;
    Ok(Stmt::Case(CaseStmt {
        value,
        range: start.merge(end.location),
    }))
}

fn keyword_then_semicolon(p: &mut Parser<'_>, keyword: &str) -> ParseResult<SourceRange> {
    let start = p.require_identifier(keyword)?.location;
    let end = p.require_other(";")?;
    Ok(start.merge(end.location))
}

fn parse_default(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let start = p.require_identifier("default")?.location;
    let end = p.require_other(":")?;
    Ok(Stmt::Default(DefaultStmt {
        range: start.merge(end.location),
    }))
}

fn parse_break(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let range = keyword_then_semicolon(p, "break")?;
    Ok(Stmt::Break(BreakStmt { range }))
}

fn parse_continue(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let range = keyword_then_semicolon(p, "continue")?;
    Ok(Stmt::Continue(ContinueStmt { range }))
}

fn parse_return(p: &mut Parser<'_>) -> ParseResult<Stmt> {
    let start = p.require_identifier("return")?.location;
    let value = if p.is_other(";") { None } else { Some(p.parse_expr()?) };
    let end = p.require_other(";")?;
    Ok(Stmt::Return(ReturnStmt {
        value,
        range: start.merge(end.location),
    }))
}

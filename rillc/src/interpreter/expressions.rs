///
/// Expression Evaluation
///
/// Operands are evaluated left to right. `&&`, `||` and `?:` evaluate only
/// what they need; every other operator evaluates all of its operands
/// first. Assignment and `++`/`--` need an identifier bound to a variable.
///

use smallvec::SmallVec;
use tracing::trace;

use crate::ast::{BinaryExpr, BinaryOp, Expr, FunctionCallExpr, FunctionDecl, Ident, UnaryExpr};
use crate::source::{SourceRange, Spanned};

use super::context::{Context, Symbol, SymbolKind};
use super::error::{RuntimeError, RuntimeResult};
use super::statements::{condition, interpret_stmts};
use super::value::{self, Builtin, Function, Value};
use super::{Flow, jump_outside_loop, with_stack};

type Args<'ast> = SmallVec<[Value<'ast>; 4]>;

pub fn interpret_expr<'ast>(expr: &'ast Expr, ctx: &mut Context<'ast>) -> RuntimeResult<Value<'ast>> {
    with_stack(|| eval_expr(expr, ctx))
}

fn eval_expr<'ast>(expr: &'ast Expr, ctx: &mut Context<'ast>) -> RuntimeResult<Value<'ast>> {
    match expr {
        Expr::NullLiteral(_) => Ok(Value::Null),
        Expr::BoolLiteral(lit) => Ok(Value::Bool(lit.value)),
        Expr::IntLiteral(lit) => Ok(Value::Int(lit.value)),
        Expr::FloatLiteral(lit) => Ok(Value::Float(lit.value)),
        Expr::CharLiteral(lit) => Ok(Value::Char(lit.value)),
        Expr::StringLiteral(lit) => Ok(Value::String(lit.value.clone())),
        Expr::Paren(paren) => interpret_expr(&paren.inner, ctx),
        Expr::Identifier(ident) => lookup(&ident.ident, ctx),
        Expr::Binary(binary) => interpret_binary(binary, ctx),
        Expr::Unary(unary) => interpret_unary(unary, ctx),
        Expr::Ternary(ternary) => {
            if condition(&ternary.condition, ctx)? {
                interpret_expr(&ternary.then_expr, ctx)
            } else {
                interpret_expr(&ternary.else_expr, ctx)
            }
        }
        Expr::MemberAccess(access) => {
            let object = interpret_expr(&access.object, ctx)?;
            let member = ctx.names().resolve(access.member.symbol);
            value::member(&object, member).map_err(|e| e.at(access.range))
        }
        Expr::Subscript(subscript) => {
            let object = interpret_expr(&subscript.object, ctx)?;
            let index = interpret_expr(&subscript.index, ctx)?;
            value::subscript(&object, &index).map_err(|e| e.at(subscript.range))
        }
        Expr::FunctionCall(call) => interpret_call(call, ctx),
    }
}

fn lookup<'ast>(ident: &Ident, ctx: &Context<'ast>) -> RuntimeResult<Value<'ast>> {
    if let Some(symbol) = ctx.find_symbol(ident.symbol) {
        return Ok(symbol.value.clone());
    }
    if ident.symbol == ctx.names().print_name {
        return Ok(Value::Function(Function::Builtin(Builtin::Print)));
    }
    Err(RuntimeError::UnresolvedSymbol {
        name: ctx.names().resolve(ident.symbol).to_string(),
        range: ident.range,
    })
}

fn interpret_binary<'ast>(expr: &'ast BinaryExpr, ctx: &mut Context<'ast>) -> RuntimeResult<Value<'ast>> {
    if expr.op.is_assignment() {
        return interpret_assignment(expr, ctx);
    }
    if expr.op.is_logical() {
        return interpret_logical(expr, ctx);
    }
    let lhs = interpret_expr(&expr.lhs, ctx)?;
    let rhs = interpret_expr(&expr.rhs, ctx)?;
    value::binary(expr.op, &lhs, &rhs).map_err(|e| e.at(expr.range))
}

fn logical_operand<'ast>(op: BinaryOp, operand: &'ast Expr, ctx: &mut Context<'ast>) -> RuntimeResult<bool> {
    let value = interpret_expr(operand, ctx)?;
    value.as_bool().ok_or_else(|| RuntimeError::UnsupportedOperator {
        op: op.as_str(),
        ty: value.type_name(),
        range: operand.range(),
    })
}

fn interpret_logical<'ast>(expr: &'ast BinaryExpr, ctx: &mut Context<'ast>) -> RuntimeResult<Value<'ast>> {
    let lhs = logical_operand(expr.op, &expr.lhs, ctx)?;
    let decided = match expr.op {
        BinaryOp::LogicalAnd => !lhs,
        _ => lhs,
    };
    if decided {
        return Ok(Value::Bool(lhs));
    }
    Ok(Value::Bool(logical_operand(expr.op, &expr.rhs, ctx)?))
}

/// The variable an assignment or step writes to.
fn assignable<'ast, 'ctx>(
    target: &'ast Expr,
    ctx: &'ctx mut Context<'ast>,
) -> RuntimeResult<&'ctx mut Symbol<'ast>> {
    let Some(ident) = target.as_identifier() else {
        return Err(RuntimeError::InvalidAssignment {
            target: format!("{:?} expression", target.kind()),
            range: target.range(),
        });
    };
    let names = ctx.names();
    let name = || names.resolve(ident.symbol).to_string();
    let Some(symbol) = ctx.find_symbol_mut(ident.symbol) else {
        return Err(RuntimeError::UnresolvedSymbol {
            name: name(),
            range: ident.range,
        });
    };
    match symbol.kind {
        SymbolKind::Variable => Ok(symbol),
        SymbolKind::Constant => Err(RuntimeError::ConstantAssignment {
            name: name(),
            range: target.range(),
        }),
        SymbolKind::Function => Err(RuntimeError::InvalidAssignment {
            target: format!("function '{}'", name()),
            range: target.range(),
        }),
    }
}

fn interpret_assignment<'ast>(expr: &'ast BinaryExpr, ctx: &mut Context<'ast>) -> RuntimeResult<Value<'ast>> {
    let rhs = interpret_expr(&expr.rhs, ctx)?;
    let symbol = assignable(&expr.lhs, ctx)?;
    let assigned = match expr.op.compound_op() {
        Some(op) => value::binary(op, &symbol.value, &rhs).map_err(|e| e.at(expr.range))?,
        None => rhs,
    };
    symbol.value = assigned.clone();
    Ok(assigned)
}

fn interpret_unary<'ast>(expr: &'ast UnaryExpr, ctx: &mut Context<'ast>) -> RuntimeResult<Value<'ast>> {
    if !expr.op.is_step() {
        let operand = interpret_expr(&expr.operand, ctx)?;
        return value::unary(expr.op, &operand).map_err(|e| e.at(expr.range));
    }

    let symbol = assignable(&expr.operand, ctx)?;
    let old = symbol.value.clone();
    let new = value::step(expr.op, &old).map_err(|e| e.at(expr.range))?;
    symbol.value = new.clone();
    Ok(if expr.op.is_postfix() { old } else { new })
}

fn interpret_call<'ast>(call: &'ast FunctionCallExpr, ctx: &mut Context<'ast>) -> RuntimeResult<Value<'ast>> {
    let callee = interpret_expr(&call.callee, ctx)?;
    let Value::Function(function) = callee else {
        return Err(RuntimeError::NotAFunction {
            ty: callee.type_name(),
            range: call.callee.range(),
        });
    };

    match function {
        Function::Builtin(Builtin::Print) => {
            let args = interpret_args(&call.args, ctx)?;
            print(&args, ctx)?;
            Ok(Value::Null)
        }
        Function::User { decl, .. } => {
            let args = interpret_args(&call.args, ctx)?;
            call_user(decl, args.into_vec(), call.range, ctx)
        }
    }
}

fn interpret_args<'ast>(args: &'ast [Expr], ctx: &mut Context<'ast>) -> RuntimeResult<Args<'ast>> {
    args.iter().map(|arg| interpret_expr(arg, ctx)).collect()
}

fn print(args: &[Value<'_>], ctx: &mut Context<'_>) -> RuntimeResult<()> {
    let out = ctx.output();
    for arg in args {
        write!(out, "{arg}")?;
    }
    writeln!(out)?;
    Ok(())
}

/// Calls a user function with already evaluated arguments. The function
/// runs in a new scope holding `return` and its parameters; its result is
/// the value of `return` when the body finishes.
pub(crate) fn call_user<'ast>(
    decl: &'ast FunctionDecl,
    args: Vec<Value<'ast>>,
    range: SourceRange,
    ctx: &mut Context<'ast>,
) -> RuntimeResult<Value<'ast>> {
    trace!(function = ctx.names().resolve(decl.name.symbol), args = args.len(), "call");
    if args.len() != decl.arity() {
        return Err(RuntimeError::ArgumentCount {
            name: ctx.names().resolve(decl.name.symbol).to_string(),
            expected: decl.arity(),
            found: args.len(),
            range,
        });
    }

    ctx.enter_call(range)?;
    let result = run_body(decl, args, ctx);
    ctx.leave_call();
    result
}

fn run_body<'ast>(decl: &'ast FunctionDecl, args: Vec<Value<'ast>>, ctx: &mut Context<'ast>) -> RuntimeResult<Value<'ast>> {
    let return_name = ctx.names().return_name;
    ctx.push();
    ctx.add_symbol(return_name, Symbol::variable(Value::Null), decl.range)?;
    for (param, arg) in decl.params.iter().zip(args) {
        ctx.add_symbol(param.name.symbol, Symbol::variable(arg), param.range)?;
    }

    match interpret_stmts(&decl.body.stmts, ctx)? {
        Flow::Break(range) => return Err(jump_outside_loop("break", range)),
        Flow::Continue(range) => return Err(jump_outside_loop("continue", range)),
        Flow::Normal | Flow::Return(_) => {}
    }

    let result = ctx
        .find_symbol(return_name)
        .map(|symbol| symbol.value.clone())
        .unwrap_or(Value::Null);
    ctx.pop();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use crate::interpreter::{Context, RuntimeError, SharedOutput, Value, interpret_expr, interpret_source};
    use crate::parser::parse_source;
    use crate::source::SourceBuffer;
    use crate::ast::Stmt;

    /// Runs a script and returns what it printed.
    fn script(text: &str) -> Result<String, RuntimeError> {
        let buffer = SourceBuffer::anonymous(text);
        let source = parse_source(&buffer).expect("parse failed");
        let out = SharedOutput::new();
        let mut ctx = Context::with_output(&source.names, out.clone());
        interpret_source(&source, &mut ctx)?;
        Ok(out.contents())
    }

    #[test]
    fn test_single_expression() {
        let buffer = SourceBuffer::anonymous("(1 + 2) * 3 - 4 / 2;");
        let source = parse_source(&buffer).unwrap();
        let Stmt::Expr(stmt) = &source.stmts[0] else {
            panic!("expected an expression statement");
        };
        let mut ctx = Context::with_output(&source.names, std::io::sink());
        assert_eq!(interpret_expr(&stmt.expr, &mut ctx), Ok(Value::Int(7)));
    }

    #[test]
    fn test_left_associative_subtraction() {
        assert_eq!(script("print(10 - 3 - 2, \" \", 2 * 3 % 4);").unwrap(), "5 2\n");
    }

    #[test]
    fn test_assignment_family() {
        let out = script("var a = 1; a += 4; a *= 3; a -= 1; a /= 2; a %= 4; print(a); var b = a = 9; print(a, b);");
        assert_eq!(out.unwrap(), "3\n99\n");
    }

    #[test]
    fn test_assignment_to_constant_fails() {
        let err = script("const c = 1; c = 2;").unwrap_err();
        assert_eq!(err.to_string(), "cannot assign to constant 'c'");
        let err = script("func f() {} f = 1;").unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidAssignment { .. }));
        assert!(script("1 = 2;").is_err());
    }

    #[test]
    fn test_increment_decrement() {
        let out = script("var i = 5; print(i++, \" \", i); print(++i, \" \", i--, \" \", --i);");
        assert_eq!(out.unwrap(), "5 6\n7 7 5\n");
        assert!(script("const k = 1; k++;").is_err());
    }

    #[test]
    fn test_short_circuit() {
        let out = script("func bool loud() { print(\"called\"); return true; } print(false && loud()); print(true || loud());");
        assert_eq!(out.unwrap(), "false\ntrue\n");
        assert!(script("print(1 && true);").is_err());
    }

    #[test]
    fn test_ternary_evaluates_one_branch() {
        let out = script("func int boom() { return 1 / 0; } print(true ? 1 : boom()); print(false ? boom() : 2);");
        assert_eq!(out.unwrap(), "1\n2\n");
        assert!(matches!(script("print(0 ? 1 : 2);"), Err(RuntimeError::ConditionNotBool { .. })));
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(script("print(-3, \" \", +2.5, \" \", !false);").unwrap(), "-3 2.5 true\n");
        assert!(matches!(script("print(-\"s\");"), Err(RuntimeError::UnsupportedOperator { .. })));
    }

    #[test]
    fn test_string_members() {
        assert_eq!(script("var s = \"rill\"; print(s.length, s[0]);").unwrap(), "4r\n");
        assert!(matches!(script("\"ab\"[2];"), Err(RuntimeError::IndexOutOfRange { .. })));
        assert!(matches!(script("(1).length;"), Err(RuntimeError::UnknownMember { .. })));
    }

    #[test]
    fn test_call_errors() {
        let err = script("func f(int a) {} f(1, 2);").unwrap_err();
        assert_eq!(err.to_string(), "function 'f' takes 1 argument(s) but 2 were given");
        assert!(matches!(script("var x = 1; x();"), Err(RuntimeError::NotAFunction { ty: "int", .. })));
        assert!(matches!(script("missing();"), Err(RuntimeError::UnresolvedSymbol { .. })));
    }

    #[test]
    fn test_recursion_and_depth_limit() {
        let fib = "func int fib(int n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print(fib(15));";
        assert_eq!(script(fib).unwrap(), "610\n");

        let buffer = SourceBuffer::anonymous("func f() { f(); } f();");
        let source = parse_source(&buffer).unwrap();
        let mut ctx = Context::with_output(&source.names, std::io::sink()).max_call_depth(32);
        let err = interpret_source(&source, &mut ctx).unwrap_err();
        assert!(matches!(err, RuntimeError::CallDepthExceeded { limit: 32, .. }));
        ctx.reset();
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn test_dynamic_scope_sees_caller_locals() {
        let out = script("func show() { print(local); } func outer() { var local = 7; show(); } outer();");
        assert_eq!(out.unwrap(), "7\n");
    }

    #[test]
    fn test_print_renders_every_kind() {
        let out = script("func f() {} print(null, \" \", true, \" \", 1.5, \" \", 'c', \" \", f);");
        assert_eq!(out.unwrap(), "null true 1.5 c <function>\n");
    }

    #[test]
    fn test_error_carries_expression_range() {
        let err = script("var a = 1;\nvar b = a + 1.0;").unwrap_err();
        assert_eq!(err.range().start.line, 2);
        assert_eq!(err.range().start.column, 9);
    }
}

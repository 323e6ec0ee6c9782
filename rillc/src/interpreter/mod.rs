///
/// Interpreter Module
///
/// A tree-walking evaluator over the AST. Evaluation borrows the tree for
/// `'ast`; values, scopes and the output sink live in a `Context`.
///
/// Module structure:
/// - value: runtime values and the per-kind operator semantics
/// - context: scope stack, symbols, output sink, call depth guard
/// - statements: statement evaluation producing a control `Flow`
/// - expressions: expression evaluation, calls and the `print` builtin
/// - error: RuntimeError
///
/// Entry points work at three granularities: a whole Unit (register the
/// top-level declarations, then run `main`), a Source script (run the
/// statements in the global scope), or a single Stmt or Expr against a
/// caller-supplied Context.
///
/// No error is caught internally. Scopes pushed before an error stay on the
/// stack; call `Context::reset` before reusing a context.
///
/// Statement and expression evaluation grow the native stack on demand, so
/// recursion in rill code is limited only by the context's call depth.
///

pub mod context;
pub mod error;
pub mod expressions;
pub mod statements;
pub mod value;

pub use context::{Context, DEFAULT_MAX_CALL_DEPTH, Scope, SharedOutput, Symbol, SymbolKind};
pub use error::{RuntimeError, RuntimeResult};
pub use expressions::interpret_expr;
pub use statements::interpret_stmt;
pub use value::{Builtin, Function, Value};

use tracing::debug;

use crate::ast::{Decl, Source, Stmt, Unit};
use crate::source::{SourceRange, Spanned};

/// How a statement finished. Anything but `Normal` unwinds enclosing
/// statements until a loop, switch or function call consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow<'ast> {
    Normal,
    Break(SourceRange),
    Continue(SourceRange),
    Return(Value<'ast>),
}

impl Flow<'_> {
    pub fn is_normal(&self) -> bool {
        matches!(self, Flow::Normal)
    }
}

/// Runs `unit` with a fresh context printing to stdout.
pub fn interpret(unit: &Unit) -> RuntimeResult<Value<'_>> {
    let mut ctx = Context::new(&unit.names);
    interpret_with(unit, &mut ctx)
}

/// Registers the unit's declarations in the current scope of `ctx`, then
/// calls `main` with no arguments and returns its result.
pub fn interpret_with<'ast>(unit: &'ast Unit, ctx: &mut Context<'ast>) -> RuntimeResult<Value<'ast>> {
    debug!(decls = unit.decls.len(), "registering top-level declarations");
    for decl in &unit.decls {
        declare(decl, true, ctx)?;
    }

    let main_name = ctx.names().main_name;
    let main = match ctx.find_symbol(main_name) {
        Some(Symbol {
            kind: SymbolKind::Function,
            value: Value::Function(Function::User { decl, .. }),
        }) => *decl,
        _ => return Err(RuntimeError::NoMainFunction),
    };

    debug!("running main");
    expressions::call_user(main, Vec::new(), main.range, ctx)
}

/// Runs the statements of a script in the current scope of `ctx`. A
/// top-level `return` ends the script with its value; otherwise the result
/// is null.
pub fn interpret_source<'ast>(source: &'ast Source, ctx: &mut Context<'ast>) -> RuntimeResult<Value<'ast>> {
    debug!(stmts = source.stmts.len(), "running script");
    for stmt in &source.stmts {
        let flow = match stmt {
            Stmt::Decl(decl_stmt) => {
                declare(&decl_stmt.decl, true, ctx)?;
                Flow::Normal
            }
            _ => interpret_stmt(stmt, ctx)?,
        };
        match flow {
            Flow::Normal => {}
            Flow::Return(value) => return Ok(value),
            Flow::Break(range) => return Err(jump_outside_loop("break", range)),
            Flow::Continue(range) => return Err(jump_outside_loop("continue", range)),
        }
    }
    Ok(Value::Null)
}

/// Binds a declaration in the innermost scope. Functions are only accepted
/// where `allow_functions` is set; classes and namespaces never are.
pub(crate) fn declare<'ast>(decl: &'ast Decl, allow_functions: bool, ctx: &mut Context<'ast>) -> RuntimeResult<()> {
    match decl {
        Decl::Variable(var) => {
            let value = match &var.init {
                Some(init) => interpret_expr(init, ctx)?,
                None => Value::Null,
            };
            let symbol = if var.constant {
                Symbol::constant(value)
            } else {
                Symbol::variable(value)
            };
            ctx.add_symbol(var.name.symbol, symbol, var.range)
        }
        Decl::Function(func) if allow_functions => {
            let value = Value::Function(Function::User {
                name: func.name.symbol,
                decl: func,
            });
            ctx.add_symbol(func.name.symbol, Symbol::function(value), func.name.range)
        }
        _ => Err(RuntimeError::UnknownDeclaration {
            kind: decl.kind(),
            range: decl.range(),
        }),
    }
}

pub(crate) fn jump_outside_loop(keyword: &'static str, range: SourceRange) -> RuntimeError {
    RuntimeError::JumpOutsideLoop { keyword, range }
}

/// Free stack below which evaluation switches to a fresh segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// Runs one evaluation step, growing the stack first when it runs low, so
/// recursion depth is bounded by `max_call_depth` and not by the size of
/// the calling thread's stack.
pub(crate) fn with_stack<R>(step: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, step)
}

///
/// Statement Evaluation
///
/// Every statement evaluates to a `Flow`. Loops consume `Break` and
/// `Continue`; a switch consumes `Break` and passes `Continue` on to the
/// enclosing loop; function calls consume `Return`.
///

use crate::ast::{
    CompoundStmt, DoWhileStmt, Expr, ForStmt, IfStmt, ReturnStmt, Stmt, SwitchStmt, WhileStmt,
};
use crate::ast::BinaryOp;
use crate::source::Spanned;

use super::context::Context;
use super::error::{RuntimeError, RuntimeResult};
use super::expressions::interpret_expr;
use super::value::{self, Value};
use super::{Flow, declare, with_stack};

pub fn interpret_stmt<'ast>(stmt: &'ast Stmt, ctx: &mut Context<'ast>) -> RuntimeResult<Flow<'ast>> {
    with_stack(|| eval_stmt(stmt, ctx))
}

fn eval_stmt<'ast>(stmt: &'ast Stmt, ctx: &mut Context<'ast>) -> RuntimeResult<Flow<'ast>> {
    match stmt {
        Stmt::Expr(s) => {
            interpret_expr(&s.expr, ctx)?;
            Ok(Flow::Normal)
        }
        Stmt::Decl(s) => {
            declare(&s.decl, false, ctx)?;
            Ok(Flow::Normal)
        }
        Stmt::Compound(s) => interpret_compound(s, ctx),
        Stmt::If(s) => interpret_if(s, ctx),
        Stmt::While(s) => interpret_while(s, ctx),
        Stmt::DoWhile(s) => interpret_do_while(s, ctx),
        Stmt::For(s) => interpret_for(s, ctx),
        Stmt::Switch(s) => interpret_switch(s, ctx),
        // Labels only matter to the enclosing switch.
        Stmt::Case(_) | Stmt::Default(_) => Ok(Flow::Normal),
        Stmt::Continue(s) => Ok(Flow::Continue(s.range)),
        Stmt::Break(s) => Ok(Flow::Break(s.range)),
        Stmt::Return(s) => interpret_return(s, ctx),
    }
}

/// Runs `stmts` in order in the current scope, stopping at the first
/// statement that does not complete normally.
pub(crate) fn interpret_stmts<'ast>(stmts: &'ast [Stmt], ctx: &mut Context<'ast>) -> RuntimeResult<Flow<'ast>> {
    for stmt in stmts {
        let flow = interpret_stmt(stmt, ctx)?;
        if !flow.is_normal() {
            return Ok(flow);
        }
    }
    Ok(Flow::Normal)
}

fn interpret_compound<'ast>(stmt: &'ast CompoundStmt, ctx: &mut Context<'ast>) -> RuntimeResult<Flow<'ast>> {
    ctx.push();
    let flow = interpret_stmts(&stmt.stmts, ctx)?;
    ctx.pop();
    Ok(flow)
}

pub(crate) fn condition<'ast>(expr: &'ast Expr, ctx: &mut Context<'ast>) -> RuntimeResult<bool> {
    let value = interpret_expr(expr, ctx)?;
    value.as_bool().ok_or_else(|| RuntimeError::ConditionNotBool {
        ty: value.type_name(),
        range: expr.range(),
    })
}

fn interpret_if<'ast>(stmt: &'ast IfStmt, ctx: &mut Context<'ast>) -> RuntimeResult<Flow<'ast>> {
    if condition(&stmt.condition, ctx)? {
        interpret_stmt(&stmt.then_branch, ctx)
    } else if let Some(else_branch) = &stmt.else_branch {
        interpret_stmt(else_branch, ctx)
    } else {
        Ok(Flow::Normal)
    }
}

/// What a loop does after its body finished with `flow`.
enum LoopStep<'ast> {
    Next,
    Exit(Flow<'ast>),
}

fn loop_step(flow: Flow<'_>) -> LoopStep<'_> {
    match flow {
        Flow::Normal | Flow::Continue(_) => LoopStep::Next,
        Flow::Break(_) => LoopStep::Exit(Flow::Normal),
        Flow::Return(value) => LoopStep::Exit(Flow::Return(value)),
    }
}

fn interpret_while<'ast>(stmt: &'ast WhileStmt, ctx: &mut Context<'ast>) -> RuntimeResult<Flow<'ast>> {
    while condition(&stmt.condition, ctx)? {
        if let LoopStep::Exit(flow) = loop_step(interpret_stmt(&stmt.body, ctx)?) {
            return Ok(flow);
        }
    }
    Ok(Flow::Normal)
}

fn interpret_do_while<'ast>(stmt: &'ast DoWhileStmt, ctx: &mut Context<'ast>) -> RuntimeResult<Flow<'ast>> {
    loop {
        if let LoopStep::Exit(flow) = loop_step(interpret_stmt(&stmt.body, ctx)?) {
            return Ok(flow);
        }
        if !condition(&stmt.condition, ctx)? {
            return Ok(Flow::Normal);
        }
    }
}

fn interpret_for<'ast>(stmt: &'ast ForStmt, ctx: &mut Context<'ast>) -> RuntimeResult<Flow<'ast>> {
    ctx.push();
    if let Some(init) = &stmt.init {
        interpret_stmt(init, ctx)?;
    }
    let flow = loop {
        if let Some(cond) = &stmt.condition {
            if !condition(cond, ctx)? {
                break Flow::Normal;
            }
        }
        if let LoopStep::Exit(flow) = loop_step(interpret_stmt(&stmt.body, ctx)?) {
            break flow;
        }
        if let Some(step) = &stmt.step {
            interpret_expr(step, ctx)?;
        }
    };
    ctx.pop();
    Ok(flow)
}

/// Index of the first statement to run: the first case whose value equals
/// the subject, else the default label.
fn switch_entry<'ast>(
    stmt: &'ast SwitchStmt,
    subject: &Value<'ast>,
    ctx: &mut Context<'ast>,
) -> RuntimeResult<Option<usize>> {
    let mut default = None;
    for (index, label) in stmt.body.stmts.iter().enumerate() {
        match label {
            Stmt::Case(case) => {
                let candidate = interpret_expr(&case.value, ctx)?;
                let equal = value::binary(BinaryOp::Equal, subject, &candidate).map_err(|e| e.at(case.range))?;
                if equal == Value::Bool(true) {
                    return Ok(Some(index));
                }
            }
            Stmt::Default(_) if default.is_none() => default = Some(index),
            _ => {}
        }
    }
    Ok(default)
}

fn interpret_switch<'ast>(stmt: &'ast SwitchStmt, ctx: &mut Context<'ast>) -> RuntimeResult<Flow<'ast>> {
    let subject = interpret_expr(&stmt.subject, ctx)?;
    let Some(entry) = switch_entry(stmt, &subject, ctx)? else {
        return Ok(Flow::Normal);
    };

    ctx.push();
    let flow = match interpret_stmts(&stmt.body.stmts[entry..], ctx)? {
        Flow::Break(_) => Flow::Normal,
        flow => flow,
    };
    ctx.pop();
    Ok(flow)
}

fn interpret_return<'ast>(stmt: &'ast ReturnStmt, ctx: &mut Context<'ast>) -> RuntimeResult<Flow<'ast>> {
    let value = match &stmt.value {
        Some(expr) => interpret_expr(expr, ctx)?,
        None => Value::Null,
    };
    let return_name = ctx.names().return_name;
    if let Some(slot) = ctx.find_symbol_mut(return_name) {
        slot.value = value.clone();
    }
    Ok(Flow::Return(value))
}

//!
//! Runtime Values
//!
//! A Value is the dynamically typed result of evaluating an expression.
//! Values are copied on assignment; a function value borrows its
//! declaration from the AST for the lifetime `'ast` of the run.
//!
//! Operator semantics live here so every (operator, value kind) pair has
//! one place that either computes a result or raises an error:
//!
//! - operands of a binary operator must have the same kind
//! - Int arithmetic wraps; Int division or remainder by zero is an error
//! - Float follows IEEE-754
//! - Bool arithmetic: `+` or, `-` xor, `*` and, `/` by false is an error
//! - String supports `+` and comparisons; Char only comparisons
//! - Null only supports `==` and `!=`; functions support nothing
//!

use std::cmp::Ordering;
use std::fmt;

use lasso::Spur;

use crate::ast::{BinaryOp, FunctionDecl, UnaryOp};
use crate::source::SourceRange;

use super::error::{RuntimeError, RuntimeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
}

#[derive(Debug, Clone, Copy)]
pub enum Function<'ast> {
    User { name: Spur, decl: &'ast FunctionDecl },
    Builtin(Builtin),
}

impl PartialEq for Function<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Function::User { decl: a, .. }, Function::User { decl: b, .. }) => std::ptr::eq(*a, *b),
            (Function::Builtin(a), Function::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value<'ast> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    Function(Function<'ast>),
}

impl<'ast> Value<'ast> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Function(_) => "function",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<Function<'ast>> {
        match self {
            Value::Function(f) => Some(*f),
            _ => None,
        }
    }

    fn same_kind(&self, other: &Value<'_>) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::String(s) => f.write_str(s),
            Value::Function(_) => f.write_str("<function>"),
        }
    }
}

fn unsupported(op: BinaryOp, ty: &'static str) -> RuntimeError {
    RuntimeError::UnsupportedOperator {
        op: op.as_str(),
        ty,
        range: SourceRange::unknown(),
    }
}

fn division_by_zero() -> RuntimeError {
    RuntimeError::DivisionByZero {
        range: SourceRange::unknown(),
    }
}

fn compare(op: BinaryOp, ordering: Option<Ordering>) -> Option<bool> {
    let result = match op {
        BinaryOp::Equal => ordering == Some(Ordering::Equal),
        BinaryOp::NotEqual => ordering != Some(Ordering::Equal),
        BinaryOp::Less => ordering == Some(Ordering::Less),
        BinaryOp::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::Greater => ordering == Some(Ordering::Greater),
        BinaryOp::GreaterEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => return None,
    };
    Some(result)
}

fn int_binary(op: BinaryOp, a: i64, b: i64) -> RuntimeResult<Value<'static>> {
    if let Some(result) = compare(op, Some(a.cmp(&b))) {
        return Ok(Value::Bool(result));
    }
    let value = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div if b == 0 => return Err(division_by_zero()),
        BinaryOp::Div => a.wrapping_div(b),
        BinaryOp::Mod if b == 0 => return Err(division_by_zero()),
        BinaryOp::Mod => a.wrapping_rem(b),
        _ => return Err(unsupported(op, "int")),
    };
    Ok(Value::Int(value))
}

fn float_binary(op: BinaryOp, a: f64, b: f64) -> RuntimeResult<Value<'static>> {
    if op.is_comparison() {
        // NaN is unordered, so only != holds for it.
        let result = match op {
            BinaryOp::Equal => a == b,
            BinaryOp::NotEqual => a != b,
            BinaryOp::Less => a < b,
            BinaryOp::LessEqual => a <= b,
            BinaryOp::Greater => a > b,
            _ => a >= b,
        };
        return Ok(Value::Bool(result));
    }
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        _ => return Err(unsupported(op, "float")),
    };
    Ok(Value::Float(value))
}

fn bool_binary(op: BinaryOp, a: bool, b: bool) -> RuntimeResult<Value<'static>> {
    if let Some(result) = compare(op, Some(a.cmp(&b))) {
        return Ok(Value::Bool(result));
    }
    let value = match op {
        BinaryOp::Add | BinaryOp::LogicalOr => a | b,
        BinaryOp::Sub => a ^ b,
        BinaryOp::Mul | BinaryOp::LogicalAnd => a & b,
        BinaryOp::Div if !b => return Err(division_by_zero()),
        BinaryOp::Div => a,
        _ => return Err(unsupported(op, "bool")),
    };
    Ok(Value::Bool(value))
}

/// Applies a non-assignment binary operator to two evaluated operands.
pub fn binary<'ast>(op: BinaryOp, lhs: &Value<'ast>, rhs: &Value<'ast>) -> RuntimeResult<Value<'ast>> {
    if op.is_assignment() {
        return Err(unsupported(op, lhs.type_name()));
    }
    if !lhs.same_kind(rhs) {
        return Err(RuntimeError::DifferentTypes {
            op: op.as_str(),
            lhs: lhs.type_name(),
            rhs: rhs.type_name(),
            range: SourceRange::unknown(),
        });
    }

    match (lhs, rhs) {
        (Value::Null, Value::Null) => match op {
            BinaryOp::Equal => Ok(Value::Bool(true)),
            BinaryOp::NotEqual => Ok(Value::Bool(false)),
            _ => Err(unsupported(op, "null")),
        },
        (Value::Bool(a), Value::Bool(b)) => bool_binary(op, *a, *b),
        (Value::Int(a), Value::Int(b)) => int_binary(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => float_binary(op, *a, *b),
        (Value::Char(a), Value::Char(b)) => compare(op, Some(a.cmp(b)))
            .map(Value::Bool)
            .ok_or_else(|| unsupported(op, "char")),
        (Value::String(a), Value::String(b)) => {
            if let Some(result) = compare(op, Some(a.cmp(b))) {
                return Ok(Value::Bool(result));
            }
            match op {
                BinaryOp::Add => Ok(Value::String(format!("{a}{b}"))),
                _ => Err(unsupported(op, "string")),
            }
        }
        _ => Err(unsupported(op, lhs.type_name())),
    }
}

/// Applies `-`, `+` or `!`. Increment and decrement need a place and are
/// handled by the evaluator through `step`.
pub fn unary<'ast>(op: UnaryOp, operand: &Value<'ast>) -> RuntimeResult<Value<'ast>> {
    let unsupported = || RuntimeError::UnsupportedOperator {
        op: op.as_str(),
        ty: operand.type_name(),
        range: SourceRange::unknown(),
    };
    match (op, operand) {
        (UnaryOp::Minus, Value::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
        (UnaryOp::Minus, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Plus, Value::Int(_) | Value::Float(_)) => Ok(operand.clone()),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        _ => Err(unsupported()),
    }
}

/// The value after one increment or decrement step.
pub fn step<'ast>(op: UnaryOp, operand: &Value<'ast>) -> RuntimeResult<Value<'ast>> {
    let up = matches!(op, UnaryOp::PreIncrement | UnaryOp::PostIncrement);
    match operand {
        Value::Int(i) if up => Ok(Value::Int(i.wrapping_add(1))),
        Value::Int(i) => Ok(Value::Int(i.wrapping_sub(1))),
        Value::Float(x) if up => Ok(Value::Float(x + 1.0)),
        Value::Float(x) => Ok(Value::Float(x - 1.0)),
        _ => Err(RuntimeError::UnsupportedOperator {
            op: op.as_str(),
            ty: operand.type_name(),
            range: SourceRange::unknown(),
        }),
    }
}

pub fn member<'ast>(object: &Value<'ast>, name: &str) -> RuntimeResult<Value<'ast>> {
    match (object, name) {
        (Value::String(s), "length") => Ok(Value::Int(s.chars().count() as i64)),
        _ => Err(RuntimeError::UnknownMember {
            member: name.to_string(),
            ty: object.type_name(),
            range: SourceRange::unknown(),
        }),
    }
}

pub fn subscript<'ast>(object: &Value<'ast>, index: &Value<'ast>) -> RuntimeResult<Value<'ast>> {
    match (object, index) {
        (Value::String(s), Value::Int(i)) => {
            let found = usize::try_from(*i).ok().and_then(|at| s.chars().nth(at));
            found.map(Value::Char).ok_or_else(|| RuntimeError::IndexOutOfRange {
                index: *i,
                len: s.chars().count(),
                range: SourceRange::unknown(),
            })
        }
        _ => Err(RuntimeError::UnsupportedOperator {
            op: "[]",
            ty: object.type_name(),
            range: SourceRange::unknown(),
        }),
    }
}

///
/// Runtime Error Types
///
/// Errors raised while evaluating. Value-level operations do not know where
/// they were called from and raise errors with an unknown range; the
/// evaluator attaches the range of the expression with `at`.
///

use thiserror::Error;

use crate::ast::DeclKind;
use crate::source::SourceRange;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("symbol '{name}' is already defined in this scope")]
    DuplicateSymbol { name: String, range: SourceRange },

    #[error("unresolved symbol '{name}'")]
    UnresolvedSymbol { name: String, range: SourceRange },

    #[error("{kind} declarations are not supported here")]
    UnknownDeclaration { kind: DeclKind, range: SourceRange },

    #[error("no main function")]
    NoMainFunction,

    #[error("operands of '{op}' have different types: {lhs} and {rhs}")]
    DifferentTypes {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
        range: SourceRange,
    },

    #[error("operator '{op}' is not supported for {ty}")]
    UnsupportedOperator {
        op: &'static str,
        ty: &'static str,
        range: SourceRange,
    },

    #[error("cannot call a value of type {ty}: not a function")]
    NotAFunction { ty: &'static str, range: SourceRange },

    #[error("function '{name}' takes {expected} argument(s) but {found} were given")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
        range: SourceRange,
    },

    #[error("division by zero")]
    DivisionByZero { range: SourceRange },

    #[error("condition is not a bool but {ty}")]
    ConditionNotBool { ty: &'static str, range: SourceRange },

    #[error("cannot assign to {target}")]
    InvalidAssignment { target: String, range: SourceRange },

    #[error("cannot assign to constant '{name}'")]
    ConstantAssignment { name: String, range: SourceRange },

    #[error("index {index} is out of range for a string of length {len}")]
    IndexOutOfRange { index: i64, len: usize, range: SourceRange },

    #[error("{ty} has no member '{member}'")]
    UnknownMember {
        member: String,
        ty: &'static str,
        range: SourceRange,
    },

    #[error("'{keyword}' outside of a loop or switch")]
    JumpOutsideLoop { keyword: &'static str, range: SourceRange },

    #[error("call depth exceeded the limit of {limit}")]
    CallDepthExceeded { limit: usize, range: SourceRange },

    #[error("failed to write output: {message}")]
    Output { message: String },
}

impl RuntimeError {
    pub fn range(&self) -> SourceRange {
        match self {
            RuntimeError::DuplicateSymbol { range, .. }
            | RuntimeError::UnresolvedSymbol { range, .. }
            | RuntimeError::UnknownDeclaration { range, .. }
            | RuntimeError::DifferentTypes { range, .. }
            | RuntimeError::UnsupportedOperator { range, .. }
            | RuntimeError::NotAFunction { range, .. }
            | RuntimeError::ArgumentCount { range, .. }
            | RuntimeError::DivisionByZero { range }
            | RuntimeError::ConditionNotBool { range, .. }
            | RuntimeError::InvalidAssignment { range, .. }
            | RuntimeError::ConstantAssignment { range, .. }
            | RuntimeError::IndexOutOfRange { range, .. }
            | RuntimeError::UnknownMember { range, .. }
            | RuntimeError::JumpOutsideLoop { range, .. }
            | RuntimeError::CallDepthExceeded { range, .. } => *range,
            RuntimeError::NoMainFunction | RuntimeError::Output { .. } => SourceRange::unknown(),
        }
    }

    fn range_mut(&mut self) -> Option<&mut SourceRange> {
        match self {
            RuntimeError::DuplicateSymbol { range, .. }
            | RuntimeError::UnresolvedSymbol { range, .. }
            | RuntimeError::UnknownDeclaration { range, .. }
            | RuntimeError::DifferentTypes { range, .. }
            | RuntimeError::UnsupportedOperator { range, .. }
            | RuntimeError::NotAFunction { range, .. }
            | RuntimeError::ArgumentCount { range, .. }
            | RuntimeError::DivisionByZero { range }
            | RuntimeError::ConditionNotBool { range, .. }
            | RuntimeError::InvalidAssignment { range, .. }
            | RuntimeError::ConstantAssignment { range, .. }
            | RuntimeError::IndexOutOfRange { range, .. }
            | RuntimeError::UnknownMember { range, .. }
            | RuntimeError::JumpOutsideLoop { range, .. }
            | RuntimeError::CallDepthExceeded { range, .. } => Some(range),
            RuntimeError::NoMainFunction | RuntimeError::Output { .. } => None,
        }
    }

    /// Fills in `range` if the error does not carry one yet.
    pub fn at(mut self, range: SourceRange) -> Self {
        if let Some(slot) = self.range_mut() {
            if slot.is_unknown() {
                *slot = range;
            }
        }
        self
    }
}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::Output {
            message: err.to_string(),
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceLocation;

    #[test]
    fn test_at_keeps_existing_range() {
        let here = SourceRange::new(SourceLocation::new(1, 1), SourceLocation::new(1, 4));
        let there = SourceRange::new(SourceLocation::new(3, 1), SourceLocation::new(3, 4));

        let err = RuntimeError::DivisionByZero { range: SourceRange::unknown() }.at(here);
        assert_eq!(err.range(), here);
        assert_eq!(err.at(there).range(), here);
        assert_eq!(RuntimeError::NoMainFunction.at(here).range(), SourceRange::unknown());
    }
}

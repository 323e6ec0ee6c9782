//!
//! Operator Definitions
//!
//! Binary and unary operators of rill. `precedence()` and `associativity()`
//! drive the parser's precedence climbing; the ternary `?:` is not a
//! BinaryOp but sits at TERNARY_PRECEDENCE below every one of them.
//!
//! Levels, low to high:
//! - 1 ternary, 2 assignment family (both right-associative)
//! - 3 `||`, 4 `&&`, 5 equality, 6 relational, 7 additive, 8 multiplicative
//!

use std::fmt;

use serde::Serialize;

pub const TERNARY_PRECEDENCE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Associativity {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,

    LogicalOr,
    LogicalAnd,

    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

const BINARY_OPS: [(&str, BinaryOp); 19] = [
    ("=", BinaryOp::Assign),
    ("+=", BinaryOp::AddAssign),
    ("-=", BinaryOp::SubAssign),
    ("*=", BinaryOp::MulAssign),
    ("/=", BinaryOp::DivAssign),
    ("%=", BinaryOp::ModAssign),
    ("||", BinaryOp::LogicalOr),
    ("&&", BinaryOp::LogicalAnd),
    ("==", BinaryOp::Equal),
    ("!=", BinaryOp::NotEqual),
    ("<", BinaryOp::Less),
    ("<=", BinaryOp::LessEqual),
    (">", BinaryOp::Greater),
    (">=", BinaryOp::GreaterEqual),
    ("+", BinaryOp::Add),
    ("-", BinaryOp::Sub),
    ("*", BinaryOp::Mul),
    ("/", BinaryOp::Div),
    ("%", BinaryOp::Mod),
];

impl BinaryOp {
    pub fn from_text(text: &str) -> Option<BinaryOp> {
        BINARY_OPS.iter().find(|(t, _)| *t == text).map(|(_, op)| *op)
    }

    pub fn as_str(&self) -> &'static str {
        BINARY_OPS
            .iter()
            .find(|(_, op)| op == self)
            .map(|(t, _)| *t)
            .unwrap_or("?")
    }

    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Assign
            | BinaryOp::AddAssign
            | BinaryOp::SubAssign
            | BinaryOp::MulAssign
            | BinaryOp::DivAssign
            | BinaryOp::ModAssign => 2,
            BinaryOp::LogicalOr => 3,
            BinaryOp::LogicalAnd => 4,
            BinaryOp::Equal | BinaryOp::NotEqual => 5,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => 6,
            BinaryOp::Add | BinaryOp::Sub => 7,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 8,
        }
    }

    pub fn associativity(&self) -> Associativity {
        if self.is_assignment() {
            Associativity::Right
        } else {
            Associativity::Left
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::AddAssign
                | BinaryOp::SubAssign
                | BinaryOp::MulAssign
                | BinaryOp::DivAssign
                | BinaryOp::ModAssign
        )
    }

    /// The arithmetic operator a compound assignment applies, `+` for `+=`.
    pub fn compound_op(&self) -> Option<BinaryOp> {
        match self {
            BinaryOp::AddAssign => Some(BinaryOp::Add),
            BinaryOp::SubAssign => Some(BinaryOp::Sub),
            BinaryOp::MulAssign => Some(BinaryOp::Mul),
            BinaryOp::DivAssign => Some(BinaryOp::Div),
            BinaryOp::ModAssign => Some(BinaryOp::Mod),
            _ => None,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Not,
    Plus,
    Minus,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn prefix_from_text(text: &str) -> Option<UnaryOp> {
        match text {
            "!" => Some(UnaryOp::Not),
            "+" => Some(UnaryOp::Plus),
            "-" => Some(UnaryOp::Minus),
            "++" => Some(UnaryOp::PreIncrement),
            "--" => Some(UnaryOp::PreDecrement),
            _ => None,
        }
    }

    pub fn postfix_from_text(text: &str) -> Option<UnaryOp> {
        match text {
            "++" => Some(UnaryOp::PostIncrement),
            "--" => Some(UnaryOp::PostDecrement),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
        }
    }

    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOp::PostIncrement | UnaryOp::PostDecrement)
    }

    pub fn is_step(&self) -> bool {
        matches!(
            self,
            UnaryOp::PreIncrement
                | UnaryOp::PreDecrement
                | UnaryOp::PostIncrement
                | UnaryOp::PostDecrement
        )
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_postfix() {
            write!(f, "postfix {}", self.as_str())
        } else {
            f.write_str(self.as_str())
        }
    }
}

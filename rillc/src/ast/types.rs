//!
//! AST Type Definitions
//!
//! Types only appear as annotations in rill: the interpreter is dynamically
//! typed and never checks them. They are still resolved at parse time so
//! that tools see a fundamental type or a named one.
//!
//! Key types:
//! - Ident: an interned name with its source range
//! - BuiltinType / TypeRef: what an annotation names
//! - TypeRegistry: the fundamental type descriptors of one session
//!

use std::fmt;

use lasso::Spur;
use serde::Serialize;

use crate::lexer::KeywordKind;
use crate::source::{SourceRange, Spanned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident {
    pub symbol: Spur,
    pub range: SourceRange,
}

impl Ident {
    pub fn new(symbol: Spur, range: SourceRange) -> Self {
        Self { symbol, range }
    }
}

impl Spanned for Ident {
    fn range(&self) -> SourceRange {
        self.range
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BuiltinType {
    Void,
    Bool,
    Int,
    Float,
    Char,
    String,
}

impl BuiltinType {
    pub fn from_keyword(keyword: KeywordKind) -> Option<BuiltinType> {
        match keyword {
            KeywordKind::Void => Some(BuiltinType::Void),
            KeywordKind::Bool => Some(BuiltinType::Bool),
            KeywordKind::Int => Some(BuiltinType::Int),
            KeywordKind::Float => Some(BuiltinType::Float),
            KeywordKind::Char => Some(BuiltinType::Char),
            KeywordKind::String => Some(BuiltinType::String),
            KeywordKind::True | KeywordKind::False | KeywordKind::Null => None,
        }
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuiltinType::Void => "void",
            BuiltinType::Bool => "bool",
            BuiltinType::Int => "int",
            BuiltinType::Float => "float",
            BuiltinType::Char => "char",
            BuiltinType::String => "string",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Builtin(BuiltinType),
    Named(Ident),
}

impl TypeRef {
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Builtin(BuiltinType::Void))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub kind: BuiltinType,
    pub name: &'static str,
    /// Storage size in bytes, 0 for void.
    pub size: usize,
}

/// Read-only table of the fundamental types. One is built per session and
/// lent to every parser of that session.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    fundamentals: Vec<TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let fundamentals = vec![
            TypeDescriptor { kind: BuiltinType::Void, name: "void", size: 0 },
            TypeDescriptor { kind: BuiltinType::Bool, name: "bool", size: 1 },
            TypeDescriptor { kind: BuiltinType::Int, name: "int", size: 8 },
            TypeDescriptor { kind: BuiltinType::Float, name: "float", size: 8 },
            TypeDescriptor { kind: BuiltinType::Char, name: "char", size: 4 },
            TypeDescriptor { kind: BuiltinType::String, name: "string", size: 24 },
        ];
        Self { fundamentals }
    }

    pub fn get(&self, kind: BuiltinType) -> &TypeDescriptor {
        self.fundamentals
            .iter()
            .find(|d| d.kind == kind)
            .unwrap_or(&self.fundamentals[0])
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeDescriptor> {
        self.fundamentals.iter().find(|d| d.name == name)
    }

    pub fn resolve_keyword(&self, keyword: KeywordKind) -> Option<BuiltinType> {
        BuiltinType::from_keyword(keyword).map(|kind| self.get(kind).kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.fundamentals.iter()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

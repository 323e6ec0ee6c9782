///
/// Abstract Syntax Tree Module
///
/// The tree produced by the parser and walked by the interpreter. Nodes own
/// their children; cross references (a declaration's enclosing context, a
/// function value's declaration) are ids or borrows, never shared owners.
///
/// Module structure:
/// - types: Ident, type annotations, TypeRegistry
/// - operators: BinaryOp and UnaryOp with precedence data
/// - expressions / statements / declarations: the three node families
/// - context: DeclTree, the static scope tree built while parsing
/// - visitor: Visitor trait and walk_* helpers
/// - dump: AstDumper, a Visitor that prints the tree
///
/// A parse ends in one of two roots: Unit (declarations only, the shape of
/// a program with `main`) or Source (any statements, for scripts and
/// embedding). Both own the frozen name table of the parse.
///

pub mod context;
pub mod declarations;
pub mod dump;
pub mod expressions;
pub mod operators;
pub mod statements;
pub mod types;
pub mod visitor;

pub use context::*;
pub use declarations::*;
pub use dump::AstDumper;
pub use expressions::*;
pub use operators::*;
pub use statements::*;
pub use types::*;
pub use visitor::*;

use lasso::{Rodeo, RodeoReader, Spur};

use crate::source::{SourceRange, Spanned};

/// Interned names of one parse, frozen once parsing ends. The names the
/// interpreter treats specially are always present.
#[derive(Debug)]
pub struct NameTable {
    reader: RodeoReader,
    pub return_name: Spur,
    pub main_name: Spur,
    pub print_name: Spur,
}

impl NameTable {
    pub fn freeze(mut rodeo: Rodeo) -> Self {
        let return_name = rodeo.get_or_intern_static("return");
        let main_name = rodeo.get_or_intern_static("main");
        let print_name = rodeo.get_or_intern_static("print");
        Self {
            reader: rodeo.into_reader(),
            return_name,
            main_name,
            print_name,
        }
    }

    pub fn resolve(&self, symbol: Spur) -> &str {
        self.reader.resolve(&symbol)
    }

    pub fn get(&self, name: &str) -> Option<Spur> {
        self.reader.get(name)
    }

    pub fn len(&self) -> usize {
        self.reader.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }
}

#[derive(Debug)]
pub struct Unit {
    pub decls: Vec<Decl>,
    pub range: SourceRange,
    pub names: NameTable,
    pub contexts: DeclTree,
}

impl Unit {
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.decls.iter().filter_map(Decl::as_function)
    }

    pub fn find_function(&self, name: &str) -> Option<&FunctionDecl> {
        let symbol = self.names.get(name)?;
        self.functions().find(|f| f.name.symbol == symbol)
    }

    pub fn find_main(&self) -> Option<&FunctionDecl> {
        self.functions().find(|f| f.name.symbol == self.names.main_name)
    }

    pub fn name_of(&self, ident: &Ident) -> &str {
        self.names.resolve(ident.symbol)
    }
}

impl Spanned for Unit {
    fn range(&self) -> SourceRange {
        self.range
    }
}

#[derive(Debug)]
pub struct Source {
    pub stmts: Vec<Stmt>,
    pub range: SourceRange,
    pub names: NameTable,
    pub contexts: DeclTree,
}

impl Source {
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    pub fn name_of(&self, ident: &Ident) -> &str {
        self.names.resolve(ident.symbol)
    }
}

impl Spanned for Source {
    fn range(&self) -> SourceRange {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_table_reserves_names() {
        let mut rodeo = Rodeo::default();
        let x = rodeo.get_or_intern("x");
        let names = NameTable::freeze(rodeo);
        assert_eq!(names.resolve(x), "x");
        assert_eq!(names.resolve(names.return_name), "return");
        assert_eq!(names.get("main"), Some(names.main_name));
        assert_eq!(names.get("missing"), None);
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_empty_unit() {
        let unit = Unit {
            decls: Vec::new(),
            range: SourceRange::unknown(),
            names: NameTable::freeze(Rodeo::default()),
            contexts: DeclTree::new(),
        };
        assert!(unit.find_main().is_none());
        assert_eq!(unit.functions().count(), 0);
        assert!(unit.range().is_unknown());
    }
}

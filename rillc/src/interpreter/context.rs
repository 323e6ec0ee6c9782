///
/// Runtime Context - Scope Management
///
/// The context holds everything one evaluation needs besides the AST:
///
/// - a stack of scopes, innermost last, each mapping names to symbols
/// - the output sink `print` writes to
/// - the call depth guard
///
/// Lookup is dynamic: it walks the whole stack from the innermost scope
/// out, so a callee sees its caller's frames beneath its own. The global
/// scope at the bottom is never popped.
///

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use indexmap::IndexMap;
use lasso::Spur;
use tracing::trace;

use crate::ast::NameTable;
use crate::source::SourceRange;

use super::error::{RuntimeError, RuntimeResult};
use super::value::Value;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Constant,
    Function,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol<'ast> {
    pub kind: SymbolKind,
    pub value: Value<'ast>,
}

impl<'ast> Symbol<'ast> {
    pub fn variable(value: Value<'ast>) -> Self {
        Self {
            kind: SymbolKind::Variable,
            value,
        }
    }

    pub fn constant(value: Value<'ast>) -> Self {
        Self {
            kind: SymbolKind::Constant,
            value,
        }
    }

    pub fn function(value: Value<'ast>) -> Self {
        Self {
            kind: SymbolKind::Function,
            value,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scope<'ast> {
    symbols: IndexMap<Spur, Symbol<'ast>>,
}

impl<'ast> Scope<'ast> {
    pub fn get(&self, name: Spur) -> Option<&Symbol<'ast>> {
        self.symbols.get(&name)
    }

    pub fn contains(&self, name: Spur) -> bool {
        self.symbols.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Spur, &Symbol<'ast>)> {
        self.symbols.iter()
    }
}

pub struct Context<'ast> {
    names: &'ast NameTable,
    scopes: Vec<Scope<'ast>>,
    output: Box<dyn Write + 'ast>,
    max_call_depth: usize,
    call_depth: usize,
}

impl<'ast> Context<'ast> {
    /// A context printing to stdout.
    pub fn new(names: &'ast NameTable) -> Self {
        Self::with_output(names, io::stdout())
    }

    pub fn with_output(names: &'ast NameTable, output: impl Write + 'ast) -> Self {
        Self {
            names,
            scopes: vec![Scope::default()],
            output: Box::new(output),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            call_depth: 0,
        }
    }

    pub fn max_call_depth(mut self, limit: usize) -> Self {
        self.max_call_depth = limit;
        self
    }

    pub fn names(&self) -> &'ast NameTable {
        self.names
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn global(&self) -> &Scope<'ast> {
        &self.scopes[0]
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
        trace!(depth = self.scopes.len(), "push scope");
    }

    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
            trace!(depth = self.scopes.len(), "pop scope");
        }
    }

    /// Binds `name` in the innermost scope. A name already bound there is an
    /// error; a name bound only further out is shadowed.
    pub fn add_symbol(&mut self, name: Spur, symbol: Symbol<'ast>, range: SourceRange) -> RuntimeResult<()> {
        let names = self.names;
        let Some(scope) = self.scopes.last_mut() else {
            return Err(RuntimeError::UnresolvedSymbol {
                name: names.resolve(name).to_string(),
                range,
            });
        };
        if scope.contains(name) {
            return Err(RuntimeError::DuplicateSymbol {
                name: names.resolve(name).to_string(),
                range,
            });
        }
        scope.symbols.insert(name, symbol);
        Ok(())
    }

    pub fn find_symbol(&self, name: Spur) -> Option<&Symbol<'ast>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn find_symbol_mut(&mut self, name: Spur) -> Option<&mut Symbol<'ast>> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.symbols.get_mut(&name))
    }

    /// Drops every scope but the global one and clears the call depth.
    /// Needed before reusing a context after an error.
    pub fn reset(&mut self) {
        self.scopes.truncate(1);
        self.call_depth = 0;
    }

    pub fn output(&mut self) -> &mut dyn Write {
        &mut *self.output
    }

    pub(crate) fn enter_call(&mut self, range: SourceRange) -> RuntimeResult<()> {
        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.max_call_depth,
                range,
            });
        }
        self.call_depth += 1;
        Ok(())
    }

    pub(crate) fn leave_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("scopes", &self.scopes)
            .field("max_call_depth", &self.max_call_depth)
            .field("call_depth", &self.call_depth)
            .finish_non_exhaustive()
    }
}

/// An in-memory output sink that stays readable while a context writes to it.
#[derive(Debug, Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lasso::Rodeo;

    fn names(extra: &[&str]) -> (NameTable, Vec<Spur>) {
        let mut rodeo = Rodeo::default();
        let spurs = extra.iter().map(|name| rodeo.get_or_intern(name)).collect();
        (NameTable::freeze(rodeo), spurs)
    }

    #[test]
    fn test_duplicate_in_innermost_scope_fails() {
        let (names, spurs) = names(&["x"]);
        let x = spurs[0];
        let mut ctx = Context::with_output(&names, io::sink());
        let here = SourceRange::unknown();

        ctx.add_symbol(x, Symbol::variable(Value::Int(1)), here).unwrap();
        ctx.push();
        ctx.push();
        ctx.add_symbol(x, Symbol::variable(Value::Int(2)), here).unwrap();
        assert_eq!(ctx.find_symbol(x).map(|s| &s.value), Some(&Value::Int(2)));

        let err = ctx.add_symbol(x, Symbol::variable(Value::Int(3)), here).unwrap_err();
        assert_eq!(err.to_string(), "symbol 'x' is already defined in this scope");

        ctx.pop();
        ctx.pop();
        assert_eq!(ctx.find_symbol(x).map(|s| &s.value), Some(&Value::Int(1)));
    }

    #[test]
    fn test_global_scope_survives_pop_and_reset() {
        let (names, spurs) = names(&["g"]);
        let mut ctx = Context::with_output(&names, io::sink());
        ctx.add_symbol(spurs[0], Symbol::constant(Value::Bool(true)), SourceRange::unknown())
            .unwrap();
        ctx.pop();
        assert_eq!(ctx.depth(), 1);

        ctx.push();
        ctx.push();
        ctx.reset();
        assert_eq!(ctx.depth(), 1);
        assert_eq!(ctx.global().len(), 1);
    }

    #[test]
    fn test_find_symbol_mut_updates_nearest() {
        let (names, spurs) = names(&["x"]);
        let x = spurs[0];
        let mut ctx = Context::with_output(&names, io::sink());
        ctx.add_symbol(x, Symbol::variable(Value::Int(1)), SourceRange::unknown())
            .unwrap();
        ctx.push();
        if let Some(symbol) = ctx.find_symbol_mut(x) {
            symbol.value = Value::Int(5);
        }
        ctx.pop();
        assert_eq!(ctx.find_symbol(x).map(|s| &s.value), Some(&Value::Int(5)));
    }

    #[test]
    fn test_call_depth_guard() {
        let (names, _) = names(&[]);
        let mut ctx = Context::with_output(&names, io::sink()).max_call_depth(2);
        ctx.enter_call(SourceRange::unknown()).unwrap();
        ctx.enter_call(SourceRange::unknown()).unwrap();
        assert!(matches!(
            ctx.enter_call(SourceRange::unknown()),
            Err(RuntimeError::CallDepthExceeded { limit: 2, .. })
        ));
        ctx.leave_call();
        assert!(ctx.enter_call(SourceRange::unknown()).is_ok());
    }

    #[test]
    fn test_shared_output_collects_writes() {
        let (names, _) = names(&[]);
        let out = SharedOutput::new();
        let mut ctx = Context::with_output(&names, out.clone());
        write!(ctx.output(), "hi {}", 1).unwrap();
        assert_eq!(out.contents(), "hi 1");
    }
}

///
/// Declaration Contexts - Static Scope Tree
///
/// This module records which declarations are visible where, as seen by the
/// parser. It is independent of the interpreter's runtime scopes.
///
/// The tree is an arena: contexts live in one Vec and refer to their parent
/// by ContextId. Context 0 is always the global context. Each context keeps
/// an ordered list of (name, DeclId) entries; the declaration nodes
/// themselves are owned by the AST.
///
/// Lookup searches a context's own entries first, in insertion order, then
/// its parent chain. Removing a declaration leaves a tombstone under the
/// same name. A later live entry of that name still wins; once every entry
/// of the name is removed, lookup stops there and finds nothing.
///

use lasso::Spur;

use super::declarations::DeclId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub u32);

impl ContextId {
    pub const GLOBAL: ContextId = ContextId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    Global,
    Function,
    Class,
    Namespace,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclSlot {
    pub name: Spur,
    /// None once the declaration has been removed.
    pub decl: Option<DeclId>,
}

#[derive(Debug, Clone)]
pub struct DeclContext {
    pub kind: ContextKind,
    pub parent: Option<ContextId>,
    /// The declaration that opened this context, if any.
    pub owner: Option<DeclId>,
    entries: Vec<DeclSlot>,
}

impl DeclContext {
    pub fn entries(&self) -> &[DeclSlot] {
        &self.entries
    }

    /// Live declarations in insertion order.
    pub fn declarations(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.entries.iter().filter_map(|slot| slot.decl)
    }

    /// `Some(None)` when every entry for `name` has been removed.
    fn find_local(&self, name: Spur) -> Option<Option<DeclId>> {
        let mut removed = false;
        for slot in self.entries.iter().filter(|slot| slot.name == name) {
            match slot.decl {
                Some(decl) => return Some(Some(decl)),
                None => removed = true,
            }
        }
        removed.then_some(None)
    }
}

#[derive(Debug, Clone)]
pub struct DeclTree {
    contexts: Vec<DeclContext>,
}

impl DeclTree {
    pub fn new() -> Self {
        Self {
            contexts: vec![DeclContext {
                kind: ContextKind::Global,
                parent: None,
                owner: None,
                entries: Vec::new(),
            }],
        }
    }

    pub fn global(&self) -> ContextId {
        ContextId::GLOBAL
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn push(&mut self, kind: ContextKind, parent: ContextId, owner: Option<DeclId>) -> ContextId {
        let id = ContextId(self.contexts.len() as u32);
        self.contexts.push(DeclContext {
            kind,
            parent: Some(parent),
            owner,
            entries: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: ContextId) -> Option<&DeclContext> {
        self.contexts.get(id.index())
    }

    pub fn parent(&self, id: ContextId) -> Option<ContextId> {
        self.get(id).and_then(|ctx| ctx.parent)
    }

    pub fn add_declaration(&mut self, context: ContextId, name: Spur, decl: DeclId) {
        if let Some(ctx) = self.contexts.get_mut(context.index()) {
            ctx.entries.push(DeclSlot {
                name,
                decl: Some(decl),
            });
        }
    }

    /// Tombstones `decl` in `context`. Returns whether it was present.
    pub fn remove_declaration(&mut self, context: ContextId, decl: DeclId) -> bool {
        let Some(ctx) = self.contexts.get_mut(context.index()) else {
            return false;
        };
        match ctx.entries.iter_mut().find(|slot| slot.decl == Some(decl)) {
            Some(slot) => {
                slot.decl = None;
                true
            }
            None => false,
        }
    }

    pub fn find_declaration(&self, context: ContextId, name: Spur) -> Option<DeclId> {
        let mut current = Some(context);
        while let Some(id) = current {
            let ctx = self.get(id)?;
            if let Some(found) = ctx.find_local(name) {
                return found;
            }
            current = ctx.parent;
        }
        None
    }

    /// Ancestors of `context`, starting with `context` itself.
    pub fn ancestors(&self, context: ContextId) -> impl Iterator<Item = ContextId> + '_ {
        std::iter::successors(Some(context), move |id| self.parent(*id))
    }

    pub fn children(&self, context: ContextId) -> impl Iterator<Item = ContextId> + '_ {
        self.contexts
            .iter()
            .enumerate()
            .filter(move |(_, ctx)| ctx.parent == Some(context))
            .map(|(index, _)| ContextId(index as u32))
    }
}

impl Default for DeclTree {
    fn default() -> Self {
        Self::new()
    }
}

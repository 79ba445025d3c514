//! The incremental scope creator (§4.7). Scopes are expensive enough to
//! build (a full hoist-then-declare walk) that re-running the walk for
//! every query would defeat the point of caching them at all — this
//! type is the memoization boundary, grounded on the teacher's
//! `analyzer::ScopeBuilder` but restructured around the freeze/thaw
//! protocol the spec adds on top of it.
//!
//! - While **frozen**, `create_scope` is pure memoization: the same root
//!   always returns the same [`ScopeId`], no rebuilding, no invalidation
//!   checks. Every pass in one fixed-point iteration runs with the
//!   creator frozen so they all see a consistent scope tree.
//! - While **thawed** (between pass-manager iterations), a `create_scope`
//!   call for a root whose script was invalidated rebuilds that scope
//!   lazily, on first request rather than eagerly for the whole tree.

use std::collections::{HashMap, HashSet};

use crate::ast::{Arena, NodeId, SourceId};
use crate::scope::build;
use crate::scope::{ScopeError, ScopeId, ScopeResult, ScopeTree};

#[derive(Debug, Default)]
pub struct ScopeCreator {
    tree: ScopeTree,
    by_root: HashMap<NodeId, ScopeId>,
    frozen: bool,
    /// Scripts whose scopes must be rebuilt before their next use,
    /// populated by [`Self::invalidate_script`].
    dirty_scripts: HashSet<SourceId>,
    /// Roots known to belong to a dirty script, lazily rebuilt on next
    /// `create_scope` while thawed.
    dirty_roots: HashSet<NodeId>,
}

impl ScopeCreator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    /// Mutable access for passes that rename a binding in place (the
    /// scope tree's binding key must track the rename, not just the
    /// identifier nodes in the AST).
    pub fn tree_mut(&mut self) -> &mut ScopeTree {
        &mut self.tree
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn thaw(&mut self) {
        self.frozen = false;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Returns the [`ScopeId`] for `root`, building it (or rebuilding it,
    /// if its script was invalidated since last use) as needed.
    ///
    /// `parent` is only consulted the first time `root` is seen; a scope
    /// once created keeps the parent it was given, since the spec
    /// defines moving a scope root across scopes as a program-root-move
    /// error rather than an implicit reparent.
    pub fn create_scope(&mut self, arena: &Arena, root: NodeId, parent: Option<ScopeId>) -> ScopeResult<ScopeId> {
        if let Some(&existing) = self.by_root.get(&root) {
            if self.frozen {
                return Ok(existing);
            }
            if self.dirty_roots.remove(&root) {
                build::populate(arena, &mut self.tree, existing)?;
            }
            return Ok(existing);
        }

        if self.frozen {
            // A genuinely new root discovered mid-freeze (e.g. a pass
            // just introduced a new function via an inlining transform)
            // is still safe to memoize fresh; freeze only forbids
            // *rebuilding already-known* scopes, so two passes in the
            // same iteration observe the same tree for nodes that
            // existed when the freeze began.
        }

        let is_block_scope = build::is_nested_scope_root(arena, root) && parent.is_some() && {
            matches!(arena.get(root).map(|n| &n.kind), Ok(crate::ast::NodeKind::BlockStatement { .. }))
        };
        let id = self.tree.alloc(root, parent, is_block_scope);
        self.by_root.insert(root, id);
        build::populate(arena, &mut self.tree, id)?;
        Ok(id)
    }

    /// The program root has no parent and must keep the same identity
    /// across the whole compilation; calling `create_scope` with a
    /// `root` already known under a *different* parent than it was
    /// first created with is the program-root-move error (§4.7).
    pub fn create_program_scope(&mut self, arena: &Arena, root: NodeId) -> ScopeResult<ScopeId> {
        if let Some(&existing) = self.by_root.get(&root) {
            let recorded_root = self.tree.get(existing)?.root;
            if recorded_root != root {
                return Err(ScopeError::RootMoved { old: recorded_root, new: root });
            }
            return self.create_scope(arena, root, None);
        }
        self.create_scope(arena, root, None)
    }

    /// Forgets every binding attributed to `source`, even ones whose
    /// defining node has since been moved under a different scope root
    /// (§4.7: "forget every binding attributed to that script, even if
    /// the binding has since moved"). Existing [`ScopeId`]s for that
    /// script remain valid — they are marked dirty and rebuilt lazily on
    /// next `create_scope`, rather than removed outright, so a pass
    /// holding a stale `ScopeId` doesn't see a `MissingScope` error.
    pub fn invalidate_script(&mut self, source: SourceId) {
        self.dirty_scripts.insert(source);
        let mut affected = Vec::new();
        for scope in self.tree.iter() {
            let attributed = scope.bindings.values().any(|v| v.source == source);
            if attributed {
                affected.push(scope.id);
            }
        }
        for id in affected {
            if let Ok(scope) = self.tree.get_mut(id) {
                scope.bindings.retain(|_, v| v.source != source);
            }
            self.dirty_roots.insert(self.tree.get(id).map(|s| s.root).unwrap_or(NodeId(u32::MAX)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Arena, NodeKind, SourceId};

    #[test]
    fn freeze_memoizes_the_same_root() {
        let mut arena = Arena::new();
        let program = arena.alloc(NodeKind::Program { body: vec![] }, SourceId(0));
        arena.set_root(program);

        let mut creator = ScopeCreator::new();
        creator.freeze();
        let a = creator.create_scope(&arena, program, None).unwrap();
        let b = creator.create_scope(&arena, program, None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalidate_script_drops_its_bindings() {
        let mut arena = Arena::new();
        let x = arena.alloc(NodeKind::Identifier { name: "x".into() }, SourceId(7));
        let decl = arena.alloc(NodeKind::VariableDeclarator { id: x, init: None }, SourceId(7));
        let var_decl = arena.alloc(
            NodeKind::VariableDeclaration { kind: crate::ast::VarKind::Var, declarators: vec![decl] },
            SourceId(7),
        );
        let program = arena.alloc(NodeKind::Program { body: vec![var_decl] }, SourceId(7));
        arena.set_root(program);

        let mut creator = ScopeCreator::new();
        let scope_id = creator.create_scope(&arena, program, None).unwrap();
        assert!(creator.tree().get(scope_id).unwrap().bindings.contains_key("x"));

        creator.invalidate_script(SourceId(7));
        assert!(!creator.tree().get(scope_id).unwrap().bindings.contains_key("x"));
    }
}

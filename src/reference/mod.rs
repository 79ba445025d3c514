//! The reference collector (§4.5): for every variable, the full set of
//! places it is read and/or written, plus three predicates derived from
//! that history that the minification/dead-code passes consult directly
//! rather than re-deriving themselves. Grounded on
//! `analyzer::semantic_analysis`'s reference/capture bookkeeping
//! (`SymbolReference`, `is_captured`) — the closest teacher precedent
//! for "track where a variable is read/written and derive a property
//! from the shape of that history".

use std::collections::HashMap;

use crate::ast::{Arena, AstResult, NodeId, NodeKind};
use crate::scope::{ScopeId, ScopeTree, Variable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Read,
    Write,
    /// `x++`, `x += 1`: observes the old value and produces a new one.
    ReadWrite,
}

#[derive(Debug, Clone, Copy)]
pub struct Reference {
    pub occurrence: NodeId,
    pub kind: RefKind,
}

/// One variable's full reference history, keyed externally by its
/// `(scope, name)` identity (a [`Variable`] may be renamed by a later
/// pass, but its defining node and scope stay stable).
#[derive(Debug, Default, Clone)]
pub struct ReferenceSet {
    pub references: Vec<Reference>,
}

impl ReferenceSet {
    pub fn writes(&self) -> usize {
        self.references.iter().filter(|r| matches!(r.kind, RefKind::Write | RefKind::ReadWrite)).count()
    }

    pub fn reads(&self) -> usize {
        self.references.iter().filter(|r| matches!(r.kind, RefKind::Read | RefKind::ReadWrite)).count()
    }
}

#[derive(Debug, Default)]
pub struct ReferenceTable {
    by_binding: HashMap<(ScopeId, String), ReferenceSet>,
}

impl ReferenceTable {
    pub fn get(&self, scope: ScopeId, name: &str) -> Option<&ReferenceSet> {
        self.by_binding.get(&(scope, name.to_string()))
    }

    /// True if this binding is written to exactly once across its
    /// entire lifetime (its declaration's initializer, if any, counts as
    /// the one write) — §4.5 "assigned-once-in-lifetime".
    pub fn is_assigned_once(&self, var: &Variable) -> bool {
        let has_initial_write = matches!(
            var.kind,
            crate::scope::VariableKind::VarDeclaration
                | crate::scope::VariableKind::LetConstBinding
                | crate::scope::VariableKind::FunctionDeclaration
                | crate::scope::VariableKind::ClassDeclaration
                | crate::scope::VariableKind::Parameter
        );
        let later_writes = self.get(var.scope, &var.name).map(|r| r.writes()).unwrap_or(0);
        match has_initial_write {
            true => later_writes == 0,
            false => later_writes <= 1,
        }
    }

    /// True if every read of this binding is reachable only after some
    /// write has already executed on every path (§4.5
    /// "well-defined"). This is a structural proxy, not a full
    /// reaching-definitions dataflow: a `let`/`const`/parameter/function
    /// binding is well-defined by construction (the language forbids
    /// reading past its temporal-dead-zone point on any live path); a
    /// hoisted `var` is well-defined only if declared with an
    /// initializer at its declaration site, since otherwise a read
    /// before that point observes `undefined` rather than a TDZ error.
    pub fn is_well_defined(&self, arena: &Arena, var: &Variable) -> AstResult<bool> {
        use crate::scope::VariableKind::*;
        Ok(match var.kind {
            LetConstBinding | Parameter | FunctionDeclaration | ClassDeclaration | CatchBinding | Extern => true,
            VarDeclaration => {
                if let NodeKind::Identifier { .. } = &arena.get(var.defining_node)?.kind {
                    arena
                        .get(var.defining_node)?
                        .parent
                        .map(|p| matches!(arena.get(p).map(|n| &n.kind), Ok(NodeKind::VariableDeclarator { init: Some(_), .. })))
                        .unwrap_or(false)
                } else {
                    false
                }
            }
        })
    }

    /// True if this binding's declaration can be moved to sit directly
    /// before its first real use without changing behavior (§4.5
    /// "movable declaration") — requires it to be assigned exactly once,
    /// well-defined, and never captured by a nested closure (moving a
    /// captured binding's declaration could change which iteration's
    /// value a closure captures).
    pub fn is_movable_declaration(&self, arena: &Arena, var: &Variable) -> AstResult<bool> {
        Ok(!var.is_captured && self.is_assigned_once(var) && self.is_well_defined(arena, var)?)
    }
}

/// Walks `body` (one scope's own statements, the same notion
/// `scope::build::populate` fills bindings from) collecting every
/// identifier reference in it and resolving each against `scope_tree`
/// from `scope`. Stops at nested scope boundaries (function literals,
/// class bodies, catch clauses) — that nested scope's own references
/// are collected separately, with its own `(scope_tree, scope)` pair,
/// the same "one scope at a time" convention `scope::build` and
/// `dataflow::live_variables` both follow.
pub fn collect(arena: &Arena, scope_tree: &ScopeTree, body: &[NodeId], scope: ScopeId) -> AstResult<ReferenceTable> {
    let mut table = ReferenceTable::default();
    for &stmt in body {
        walk_node(arena, scope_tree, stmt, scope, &mut table)?;
    }
    Ok(table)
}

fn record(table: &mut ReferenceTable, scope_tree: &ScopeTree, scope: ScopeId, name: &str, occurrence: NodeId, kind: RefKind) {
    if let Ok(Some(var)) = scope_tree.lookup(scope, name) {
        table
            .by_binding
            .entry((var.scope, var.name.clone()))
            .or_default()
            .references
            .push(Reference { occurrence, kind });
    }
}

fn walk_node(arena: &Arena, scope_tree: &ScopeTree, node: NodeId, scope: ScopeId, table: &mut ReferenceTable) -> AstResult<()> {
    let kind = arena.get(node)?.kind.clone();
    match &kind {
        NodeKind::Identifier { name } => {
            record(table, scope_tree, scope, name, node, RefKind::Read);
        }
        NodeKind::VariableDeclarator { id, init } => {
            if let Some(init) = init {
                walk_node(arena, scope_tree, *init, scope, table)?;
            }
            if let NodeKind::Identifier { name } = &arena.get(*id)?.kind {
                record(table, scope_tree, scope, name, *id, RefKind::Write);
            }
        }
        NodeKind::AssignmentExpression { left, right, operator } => {
            walk_node(arena, scope_tree, *right, scope, table)?;
            if let NodeKind::Identifier { name } = &arena.get(*left)?.kind {
                let write_kind = if matches!(operator, crate::ast::AssignmentOperator::Assign) {
                    RefKind::Write
                } else {
                    RefKind::ReadWrite
                };
                record(table, scope_tree, scope, name, *left, write_kind);
            } else {
                walk_node(arena, scope_tree, *left, scope, table)?;
            }
        }
        NodeKind::UpdateExpression { argument, .. } => {
            if let NodeKind::Identifier { name } = &arena.get(*argument)?.kind {
                record(table, scope_tree, scope, name, *argument, RefKind::ReadWrite);
            }
        }
        NodeKind::FunctionDeclaration { .. }
        | NodeKind::FunctionExpression { .. }
        | NodeKind::ArrowFunctionExpression { .. }
        | NodeKind::ClassDeclaration { .. }
        | NodeKind::CatchClause { .. } => {
            // A different scope's own reference history; collected
            // separately when that scope is visited.
        }
        _ => {
            for child in crate::ast::children_of(&kind) {
                walk_node(arena, scope_tree, child, scope, table)?;
            }
        }
    }
    Ok(())
}

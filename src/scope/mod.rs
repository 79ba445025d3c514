//! The scope model (§3 "Scope"/"Variable", §4.1's scope half).
//!
//! A [`Scope`] is a region of lexical binding attached to a scope-root
//! node; scopes are long-lived and shared the way the teacher's
//! `analyzer::ScopeTree`/`Scope` are, rather than rebuilt by every pass
//! that wants to resolve a name.

pub mod build;
pub mod creator;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::{NodeId, SourceId};
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

/// Why a variable binding exists (§3 "kind (parameter, var-declaration,
/// let/const block binding, function declaration, class declaration,
/// catch binding, extern)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    Parameter,
    VarDeclaration,
    LetConstBinding,
    FunctionDeclaration,
    ClassDeclaration,
    CatchBinding,
    Extern,
}

impl VariableKind {
    /// `var`/function declarations hoist to the nearest function-or-program
    /// scope; everything else binds to the scope it lexically appears in.
    pub fn is_hoisted(self) -> bool {
        matches!(self, VariableKind::VarDeclaration | VariableKind::FunctionDeclaration)
    }
}

/// A name binding (§3 "Variable").
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub defining_node: NodeId,
    pub declared_type: Option<Type>,
    pub kind: VariableKind,
    pub scope: ScopeId,
    /// The script this binding was declared in. Recorded independently
    /// of `defining_node`'s current location so
    /// `creator::ScopeCreator::invalidate_script` can forget a binding
    /// even after its defining node has been moved elsewhere (§4.7).
    pub source: SourceId,
    /// Set by the scope builder (grounded on the teacher's closure
    /// capture detection): true if any reference to this binding occurs
    /// in a nested function scope.
    pub is_captured: bool,
}

/// Why a scope (and transitively, everything it binds) has been marked
/// unsafe for aggressive transforms — grounded on
/// `analyzer::semantic_analysis::UnsafeReason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsafeReason {
    EvalUsage,
    WithStatement,
    DynamicThis,
    IndirectAccess,
    ExternalDependency,
}

impl UnsafeReason {
    /// Eval and `with` taint every enclosing scope (their effect is
    /// "anything in scope might be read/written dynamically"); dynamic
    /// `this`/indirect global access are local facts about one scope and
    /// do not propagate, matching the teacher's propagation policy.
    pub fn propagates_upward(self) -> bool {
        matches!(self, UnsafeReason::EvalUsage | UnsafeReason::WithStatement | UnsafeReason::ExternalDependency)
    }
}

/// A region of lexical binding (§3 "Scope").
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub root: NodeId,
    pub parent: Option<ScopeId>,
    pub is_block_scope: bool,
    pub bindings: HashMap<String, Variable>,
    pub unsafe_reason: Option<UnsafeReason>,
}

impl Scope {
    pub fn new(id: ScopeId, root: NodeId, parent: Option<ScopeId>, is_block_scope: bool) -> Self {
        Self {
            id,
            root,
            parent,
            is_block_scope,
            bindings: HashMap::new(),
            unsafe_reason: None,
        }
    }

    pub fn declared_here(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ScopeError {
    #[error("scope {0:?} not found")]
    MissingScope(ScopeId),
    #[error("the program root moved from {old:?} to {new:?}; scope creator must be thawed first")]
    RootMoved { old: NodeId, new: NodeId },
}

pub type ScopeResult<T> = Result<T, ScopeError>;

/// The table of all scopes built for the current compilation, addressed
/// by [`ScopeId`]. Owned by [`creator::ScopeCreator`].
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: HashMap<ScopeId, Scope>,
    next_id: u32,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, root: NodeId, parent: Option<ScopeId>, is_block_scope: bool) -> ScopeId {
        let id = ScopeId(self.next_id);
        self.next_id += 1;
        self.scopes.insert(id, Scope::new(id, root, parent, is_block_scope));
        id
    }

    pub fn get(&self, id: ScopeId) -> ScopeResult<&Scope> {
        self.scopes.get(&id).ok_or(ScopeError::MissingScope(id))
    }

    pub fn get_mut(&mut self, id: ScopeId) -> ScopeResult<&mut Scope> {
        self.scopes.get_mut(&id).ok_or(ScopeError::MissingScope(id))
    }

    pub fn remove(&mut self, id: ScopeId) -> Option<Scope> {
        self.scopes.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.values()
    }

    /// `lookup(name) → Variable?` (§4.1), walking up the parent chain.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> ScopeResult<Option<&Variable>> {
        let mut cur = Some(scope);
        while let Some(id) = cur {
            let s = self.get(id)?;
            if let Some(v) = s.bindings.get(name) {
                return Ok(Some(v));
            }
            cur = s.parent;
        }
        Ok(None)
    }

    /// `declared(name, includeAncestors) → bool` (§4.1).
    pub fn declared(&self, scope: ScopeId, name: &str, include_ancestors: bool) -> ScopeResult<bool> {
        if !include_ancestors {
            return Ok(self.get(scope)?.declared_here(name));
        }
        Ok(self.lookup(scope, name)?.is_some())
    }

    /// `accessibleVars()` (§4.1): all in-scope bindings, walking up parents.
    pub fn accessible_vars(&self, scope: ScopeId) -> ScopeResult<Vec<&Variable>> {
        let mut out = Vec::new();
        let mut cur = Some(scope);
        let mut seen = std::collections::HashSet::new();
        while let Some(id) = cur {
            let s = self.get(id)?;
            for v in s.bindings.values() {
                if seen.insert(&v.name) {
                    out.push(v);
                }
            }
            cur = s.parent;
        }
        Ok(out)
    }

    pub fn parent(&self, scope: ScopeId) -> ScopeResult<Option<ScopeId>> {
        Ok(self.get(scope)?.parent)
    }

    /// Nearest enclosing scope whose root is itself a hoist target
    /// (function or program), used to place `var`/function-declaration
    /// bindings (§3, §4.1 "hoisted bindings ... only the owning scope
    /// differs").
    pub fn nearest_hoist_target(&self, scope: ScopeId) -> ScopeResult<ScopeId> {
        let mut cur = scope;
        loop {
            let s = self.get(cur)?;
            if !s.is_block_scope {
                return Ok(cur);
            }
            match s.parent {
                Some(p) => cur = p,
                None => return Ok(cur),
            }
        }
    }
}

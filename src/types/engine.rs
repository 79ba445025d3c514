//! [`TypeEnv`] (the per-program-point map from variable to inferred
//! type, doubling as the dataflow lattice element for the forward pass)
//! and [`Summary`] (a function's externally-visible type signature, built
//! bottom-up and memoized so callers don't re-infer a callee's body).

use std::collections::BTreeMap;

use crate::ast::NodeId;
use crate::dataflow::Lattice;
use crate::types::{FunctionType, Type};

/// The forward pass's lattice element: a snapshot of what every
/// in-scope variable is known to hold at one program point. Missing
/// keys are implicitly `Unknown` — the map only grows entries as
/// information is learned, matching the lattice's bottom-is-"nothing
/// known-yet" framing (§4.6, DESIGN.md Open Question 1).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeEnv {
    bindings: BTreeMap<String, Type>,
    /// Opt-in compatibility mode (DESIGN.md Open Question 1): when set,
    /// a variable that never receives a concrete type resolves to
    /// `Type::Any` instead of `Type::Unknown` when read through
    /// [`TypeEnv::get`], suppressing downstream possible-warnings.
    pub compat_mode: bool,
}

impl TypeEnv {
    pub fn new(compat_mode: bool) -> Self {
        Self { bindings: BTreeMap::new(), compat_mode }
    }

    pub fn get(&self, name: &str) -> Type {
        match self.bindings.get(name) {
            Some(t) => t.clone(),
            None if self.compat_mode => Type::Any,
            None => Type::Unknown,
        }
    }

    pub fn set(&mut self, name: impl Into<String>, ty: Type) {
        self.bindings.insert(name.into(), ty);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Type)> {
        self.bindings.iter()
    }
}

impl Lattice for TypeEnv {
    fn bottom() -> Self {
        TypeEnv::default()
    }

    fn join(&self, other: &Self) -> Self {
        let mut merged = TypeEnv { bindings: self.bindings.clone(), compat_mode: self.compat_mode || other.compat_mode };
        for (k, v) in &other.bindings {
            let joined = match merged.bindings.get(k) {
                Some(existing) => existing.join(v),
                None => v.clone(),
            };
            merged.bindings.insert(k.clone(), joined);
        }
        merged
    }
}

/// A function's externally-visible signature, as inferred from its
/// body (§4.6 "bottom-up over the scope tree", one function at a time).
/// Keyed externally by the function's defining `NodeId` in
/// [`crate::types::infer::SummaryTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub defining_node: NodeId,
    pub signature: FunctionType,
    /// True once every call site inside this function that depended on
    /// another not-yet-summarized function has been resolved (§4.6
    /// "deferred cross-function checks").
    pub fully_resolved: bool,
}

impl Summary {
    pub fn unknown(defining_node: NodeId, arity: usize) -> Self {
        Summary {
            defining_node,
            signature: FunctionType {
                type_params: Vec::new(),
                params: vec![Type::Unknown; arity],
                return_type: Box::new(Type::Unknown),
            },
            fully_resolved: false,
        }
    }
}
